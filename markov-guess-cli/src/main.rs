//! markov-guess - Markov-model password guessing CLI
//!
//! Trains (or reloads) an order-`k` character Markov model over a leaked
//! password corpus, then enumerates candidate passwords best-first and
//! scores them against the held-out test half of the corpus.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};

use markov_guess_core::corpus;
use markov_guess_core::model::enumerator::{Enumerator, RunConfig, RunState};
use markov_guess_core::model::intel::IntelSet;
use markov_guess_core::model::markov_model::MarkovModel;
use markov_guess_core::model::resource::ProcessProbe;
use markov_guess_core::model::sink::{FileSink, SinkMode};
use markov_guess_core::model::threshold::ThresholdSchedule;

#[derive(Parser, Debug)]
#[command(name = "markov-guess")]
#[command(author, version, about = "Markov-based password guessing for strength research")]
struct Cli {
	/// Frequency-annotated password corpus ("<count> <password>" per line)
	#[arg(long, default_value = "data/rockyou.txt")]
	path: PathBuf,

	/// Total passwords sampled from the corpus (half train, half test)
	#[arg(long, default_value_t = 2_000_000)]
	number: usize,

	/// Random seed for the train/test split
	#[arg(long, default_value_t = 2)]
	seed: u64,

	/// Context order of the Markov model
	#[arg(long, default_value_t = 3)]
	order: usize,

	/// Keyword (intelligence) file, one hint per line; optional
	#[arg(long, default_value = "data/keywords.txt")]
	intel_path: PathBuf,

	/// Working directory for split wordlists, model cache and progress
	#[arg(long, default_value = "data")]
	work_dir: PathBuf,

	/// Guess output file (password<TAB>probability per line)
	#[arg(long, default_value = "guess.txt")]
	output: PathBuf,

	/// Rewrite the output on every guess instead of appending (debug only)
	#[arg(long)]
	truncate_output: bool,

	/// Hard cap on total emitted guesses
	#[arg(long, default_value_t = 1_000_000)]
	guess_cap: u64,

	/// Wall-clock budget in seconds
	#[arg(long, default_value_t = 3600)]
	wall_clock_secs: u64,

	/// Resident-memory budget in MiB
	#[arg(long, default_value_t = 4096)]
	memory_cap_mb: u64,

	/// Maximum number of pending candidates in the frontier
	#[arg(long, default_value_t = 2_000_000)]
	frontier_cap: usize,

	/// Injected candidates a single keyword may spawn
	#[arg(long, default_value_t = 8)]
	keyword_variant_cap: u32,

	/// Keyword-hit ratio beyond which keyword injection is throttled
	#[arg(long, default_value_t = 0.5)]
	keyword_saturation: f64,

	/// Confirmed-hit batch size driving the threshold schedule
	#[arg(long, default_value_t = 100_000)]
	batch_size: u64,
}

fn main() -> Result<()> {
	env_logger::init();
	let cli = Cli::parse();

	let cache = MarkovModel::cache_path(&cli.work_dir, cli.order, cli.seed, cli.number);
	let train_path = cli.work_dir.join("trainword.txt");
	let test_path = cli.work_dir.join("testword.txt");

	let model = if cache.exists() {
		info!("loading cached model {}", cache.display());
		MarkovModel::load(&cache)?
	} else {
		info!("loading password corpus {}", cli.path.display());
		let passwords = corpus::load_annotated_corpus(&cli.path)?;

		let split = corpus::split_corpus(&passwords, cli.seed, cli.number)?;
		fs::create_dir_all(&cli.work_dir)?;
		corpus::write_wordlist(&train_path, &split.train)?;
		corpus::write_wordlist(&test_path, &split.test)?;

		info!("training order-{} model over {} passwords", cli.order, split.train.len());
		let tallied = corpus::tally_train(&split.train, cli.order);
		let model = MarkovModel::train(&tallied, cli.order)?;
		model.save(&cache)?;
		info!("model cached to {}", cache.display());
		model
	};

	let test_words = corpus::read_wordlist(&test_path)
		.with_context(|| format!("test wordlist {} (delete the model cache to regenerate it)", test_path.display()))?;
	let ground_truth = corpus::tally_ground_truth(&test_words);
	let target_total: u64 = ground_truth.values().sum();

	let intel = if cli.intel_path.exists() {
		let intel = IntelSet::load(&cli.intel_path)?;
		info!("loaded {} intel keywords", intel.len());
		intel
	} else {
		warn!("no intel file at {}, keyword features disabled", cli.intel_path.display());
		IntelSet::empty()
	};

	let mode = if cli.truncate_output { SinkMode::Truncate } else { SinkMode::Append };
	let sink = FileSink::create(&cli.output, mode)?;

	let config = RunConfig {
		guess_cap: cli.guess_cap,
		wall_clock_cap: Duration::from_secs(cli.wall_clock_secs),
		memory_cap_bytes: cli.memory_cap_mb * 1024 * 1024,
		frontier_cap: cli.frontier_cap,
		keyword_variant_cap: cli.keyword_variant_cap,
		keyword_saturation: cli.keyword_saturation,
		..RunConfig::default()
	};
	let schedule = ThresholdSchedule::new((cli.number / 2) as u64, cli.batch_size)?;

	let mut progress = BufWriter::new(File::create(cli.work_dir.join("progress.txt"))?);
	let mut engine = Enumerator::new(&model, intel, ground_truth, config, sink, ProcessProbe::start())?;

	info!("guessing against {} target occurrences", target_total);
	let state = engine.run(&schedule, |hits, guesses| {
		info!("GUESS: {hits} / {guesses}");
		let _ = writeln!(progress, "{hits} / {guesses}");
	})?;
	progress.flush()?;

	match state {
		RunState::Exhausted => info!("all reachable guesses emitted"),
		RunState::Aborted => warn!("resource budget exceeded, partial results kept"),
		RunState::Ready | RunState::Running => unreachable!("run returned a non-terminal state"),
	}
	info!(
		"confirmed {} / {} target occurrences with {} guesses ({} keyword-derived)",
		engine.confirmed_hits(),
		target_total,
		engine.total_guesses(),
		engine.keyword_hits()
	);

	Ok(())
}
