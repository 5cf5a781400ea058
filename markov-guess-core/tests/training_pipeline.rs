//! Corpus-to-guesses pipeline: load, split, train, cache, enumerate.

use std::collections::HashMap;
use std::io::Write as _;

use markov_guess_core::corpus;
use markov_guess_core::model::enumerator::{Enumerator, RunConfig, RunState};
use markov_guess_core::model::intel::IntelSet;
use markov_guess_core::model::markov_model::MarkovModel;
use markov_guess_core::model::resource::FixedProbe;
use markov_guess_core::model::sink::MemorySink;
use markov_guess_core::model::threshold::ThresholdSchedule;

const ORDER: usize = 2;
const SEED: u64 = 2;
const NUMBER: usize = 60;

fn annotated_corpus() -> tempfile::NamedTempFile {
	let mut file = tempfile::NamedTempFile::new().unwrap();
	// frequency-annotated, rockyou-style
	write!(
		file,
		"50 123456\n30 password\n20 iloveyou\n10 abc123\nnot a valid line\n"
	)
	.unwrap();
	file
}

#[test]
fn corpus_to_confirmed_guesses() {
	let corpus_file = annotated_corpus();
	let cache_dir = tempfile::tempdir().unwrap();

	let passwords = corpus::load_annotated_corpus(corpus_file.path()).unwrap();
	assert_eq!(passwords.len(), 110);

	let split = corpus::split_corpus(&passwords, SEED, NUMBER).unwrap();
	assert_eq!(split.test.len(), NUMBER / 2);
	assert_eq!(split.train.len(), NUMBER - NUMBER / 2);

	// train, cache, reload: the enumeration must not care which copy it gets
	let tallied = corpus::tally_train(&split.train, ORDER);
	let trained = MarkovModel::train(&tallied, ORDER).unwrap();
	let cache = MarkovModel::cache_path(cache_dir.path(), ORDER, SEED, NUMBER);
	trained.save(&cache).unwrap();
	let model = MarkovModel::load(&cache).unwrap();
	assert_eq!(model.order(), ORDER);

	let ground_truth = corpus::tally_ground_truth(&split.test);
	let target_total: u64 = ground_truth.values().sum();

	let schedule = ThresholdSchedule::new((NUMBER / 2) as u64, 10).unwrap();
	let mut engine = Enumerator::new(
		&model,
		IntelSet::empty(),
		ground_truth,
		RunConfig::default(),
		MemorySink::new(),
		FixedProbe::idle(),
	)
	.unwrap();

	let state = engine.run(&schedule, |_, _| {}).unwrap();
	assert_eq!(state, RunState::Exhausted);

	// the model memorizes a four-password corpus, so the enumeration
	// recovers test passwords sampled from the same distribution
	assert!(engine.confirmed_hits() > 0);
	assert!(engine.confirmed_hits() <= target_total);
	assert!(engine.total_guesses() >= 1);

	// emitted bodies are unique
	let sink = engine.into_sink();
	let mut bodies: Vec<&str> = sink.records().iter().map(|(b, _)| b.as_str()).collect();
	let emitted = bodies.len();
	bodies.sort_unstable();
	bodies.dedup();
	assert_eq!(bodies.len(), emitted);
}

#[test]
fn keyword_hint_recovers_an_unreachable_target() {
	// the model knows nothing, so only the intel hint can find the target
	let model = MarkovModel::train(&corpus::tally_train(&["zzzz".to_owned()], ORDER), ORDER).unwrap();
	let intel = IntelSet::new(["hunter2"]).unwrap();
	let ground_truth = HashMap::from([("hunter2".to_owned(), 1)]);

	let schedule = ThresholdSchedule::new(10, 5).unwrap();
	let mut engine = Enumerator::new(
		&model,
		intel,
		ground_truth,
		RunConfig::default(),
		MemorySink::new(),
		FixedProbe::idle(),
	)
	.unwrap();

	engine.run(&schedule, |_, _| {}).unwrap();
	assert_eq!(engine.confirmed_hits(), 1);
	assert_eq!(engine.keyword_hits(), 1);
}
