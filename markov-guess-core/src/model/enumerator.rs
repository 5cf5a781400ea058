use std::collections::{HashMap, HashSet};
use std::time::Duration;

use super::frontier::{Candidate, Frontier};
use super::intel::IntelSet;
use super::markov_model::{END_CHAR, MarkovModel};
use super::resource::ResourceProbe;
use super::sink::GuessSink;
use super::threshold::ThresholdSchedule;
use crate::error::{GuessError, Result};

/// Priority assigned to keyword-seeded candidates, divided by the keyword
/// length. For keywords of up to 8 characters the resulting score is above
/// 1.0 and outranks every probability-derived candidate; longer keywords
/// score below 1.0 and compete with ordinary candidates on priority.
pub const KEYWORD_SEED_WEIGHT: f64 = 8.0;

/// Expansion cycles between two progress callbacks in `run`.
pub const PROGRESS_INTERVAL: u64 = 1000;

/// Lifecycle of an enumeration run.
///
/// `Exhausted` and `Aborted` are terminal; no transitions lead out of
/// them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
	/// Initialized, frontier seeded, no cycle run yet.
	Ready,
	/// At least one pop/expand cycle has run.
	Running,
	/// Frontier empty or guess cap reached. Expected termination.
	Exhausted,
	/// Wall-clock or memory budget exceeded. Partial results are kept.
	Aborted,
}

/// Externally supplied run parameters, validated at startup.
#[derive(Debug, Clone)]
pub struct RunConfig {
	/// Hard cap on total emitted guesses.
	pub guess_cap: u64,
	/// Wall-clock budget for the whole run.
	pub wall_clock_cap: Duration,
	/// Resident-memory budget in bytes.
	pub memory_cap_bytes: u64,
	/// Maximum number of pending candidates in the frontier.
	pub frontier_cap: usize,
	/// How many injected candidates a single keyword may spawn.
	pub keyword_variant_cap: u32,
	/// Keyword-hit ratio beyond which keyword injection stops paying off
	/// and is throttled to nothing. In `(0, 1]`.
	pub keyword_saturation: f64,
	/// A guess is only emitted when its body is strictly longer than
	/// this, excluding degenerate short outputs.
	pub min_emit_len: usize,
	/// Candidates whose body grows strictly longer than this are
	/// discarded without expansion.
	pub max_body_len: usize,
}

impl Default for RunConfig {
	fn default() -> Self {
		Self {
			guess_cap: 1_000_000,
			wall_clock_cap: Duration::from_secs(3600),
			memory_cap_bytes: 4 * 1024 * 1024 * 1024,
			frontier_cap: 2_000_000,
			keyword_variant_cap: 8,
			keyword_saturation: 0.5,
			min_emit_len: 3,
			max_body_len: 20,
		}
	}
}

impl RunConfig {
	/// Validates the configuration.
	///
	/// # Errors
	/// Returns `InvalidConfig` naming the first offending parameter.
	pub fn validate(&self) -> Result<()> {
		if self.guess_cap == 0 {
			return Err(GuessError::InvalidConfig("guess cap must be > 0".to_owned()));
		}
		if self.wall_clock_cap.is_zero() {
			return Err(GuessError::InvalidConfig("wall-clock cap must be > 0".to_owned()));
		}
		if self.memory_cap_bytes == 0 {
			return Err(GuessError::InvalidConfig("memory cap must be > 0".to_owned()));
		}
		if self.frontier_cap == 0 {
			return Err(GuessError::InvalidConfig("frontier cap must be > 0".to_owned()));
		}
		if !(self.keyword_saturation > 0.0 && self.keyword_saturation <= 1.0) {
			return Err(GuessError::InvalidConfig(
				"keyword saturation must be in (0, 1]".to_owned(),
			));
		}
		if self.max_body_len < self.min_emit_len {
			return Err(GuessError::InvalidConfig(
				"max body length must not be below the emission minimum".to_owned(),
			));
		}
		Ok(())
	}
}

/// The guided enumeration engine.
///
/// Holds a bounded best-first frontier of partial candidates, repeatedly
/// pops the best one, expands it through the model under the active
/// threshold floor, injects keyword-derived candidates, emits completed
/// guesses into the sink, deduplicates, and credits matches against the
/// ground-truth multiset.
///
/// # Ordering guarantee (approximate)
/// Continuations are pre-sorted descending and the frontier always yields
/// the globally highest-priority pending candidate, so guesses come out
/// in probability order *among materialized candidates*. Low-probability
/// branches are pruned by the floor and only reappear as the schedule
/// relaxes; this approximation is what keeps memory bounded.
///
/// Single-threaded by design: one synchronous pop/expand loop, no
/// concurrent mutation of the frontier or the bookkeeping sets. The
/// model is shared immutably.
pub struct Enumerator<'a, S: GuessSink, P: ResourceProbe> {
	model: &'a MarkovModel,
	intel: IntelSet,
	config: RunConfig,
	frontier: Frontier,
	state: RunState,
	total_guesses: u64,
	confirmed_hits: u64,
	keyword_hits: u64,
	emitted: HashSet<String>,
	ground_truth: HashMap<String, u64>,
	processed_keywords: HashSet<usize>,
	variant_counts: Vec<u32>,
	sink: S,
	probe: P,
}

impl<'a, S: GuessSink, P: ResourceProbe> Enumerator<'a, S, P> {
	/// Creates a `Ready` enumerator with an empty frontier.
	///
	/// `ground_truth` is consumed destructively during the run: every
	/// matched occurrence is decremented, so a caller wanting post-run
	/// totals must snapshot the counts first.
	///
	/// # Errors
	/// Returns `InvalidConfig` if the configuration fails validation.
	pub fn new(
		model: &'a MarkovModel,
		intel: IntelSet,
		ground_truth: HashMap<String, u64>,
		config: RunConfig,
		sink: S,
		probe: P,
	) -> Result<Self> {
		config.validate()?;

		let frontier = Frontier::new(config.frontier_cap);
		let variant_counts = vec![0; intel.len()];
		Ok(Self {
			model,
			intel,
			config,
			frontier,
			state: RunState::Ready,
			total_guesses: 0,
			confirmed_hits: 0,
			keyword_hits: 0,
			emitted: HashSet::new(),
			ground_truth,
			processed_keywords: HashSet::new(),
			variant_counts,
			sink,
			probe,
		})
	}

	pub fn state(&self) -> RunState {
		self.state
	}

	/// Total guesses emitted so far.
	pub fn total_guesses(&self) -> u64 {
		self.total_guesses
	}

	/// Confirmed hits against the ground-truth multiset so far.
	pub fn confirmed_hits(&self) -> u64 {
		self.confirmed_hits
	}

	/// Confirmed hits whose body contains a keyword.
	pub fn keyword_hits(&self) -> u64 {
		self.keyword_hits
	}

	pub fn frontier_len(&self) -> usize {
		self.frontier.len()
	}

	/// Ground-truth occurrences not yet matched.
	pub fn remaining_ground_truth(&self) -> u64 {
		self.ground_truth.values().sum()
	}

	/// Consumes the enumerator, returning the sink with everything
	/// emitted up to termination.
	pub fn into_sink(self) -> S {
		self.sink
	}

	/// Seeds the frontier. The two seeding passes are order-independent.
	///
	/// 1. Every intel keyword becomes a candidate `start + keyword` with
	///    a fixed high priority weighted inversely by keyword length, so
	///    shorter, more specific hints are favored. Keyword seeds bypass
	///    the threshold check.
	/// 2. Every non-terminator continuation of the bare start context
	///    whose probability passes `floor` becomes a one-symbol
	///    candidate.
	pub fn seed(&mut self, floor: f64) {
		let order = self.model.order();
		let start = self.model.start_context();

		for id in 0..self.intel.len() {
			let score = self.keyword_seed_score(id);
			let sequence = format!("{start}{}", self.intel.keyword(id));
			self.frontier.push(Candidate::new(score, sequence, order));
		}

		if let Some(continuations) = self.model.continuations(&start) {
			for (symbol, probability) in continuations {
				if *symbol == END_CHAR || *probability < floor {
					continue;
				}
				let mut sequence = start.clone();
				sequence.push(*symbol);
				self.frontier.push(Candidate::new(*probability, sequence, order));
			}
		}
	}

	/// Runs pop/expand cycles until a terminal state, selecting the
	/// active floor from `schedule` by confirmed hits and reporting
	/// `(confirmed_hits, total_guesses)` every `PROGRESS_INTERVAL`
	/// cycles.
	///
	/// Seeds the frontier first if the enumerator is still `Ready`.
	pub fn run<F>(&mut self, schedule: &ThresholdSchedule, mut on_progress: F) -> Result<RunState>
	where
		F: FnMut(u64, u64),
	{
		if self.state == RunState::Ready {
			self.seed(schedule.initial_floor());
		}

		let mut cycles: u64 = 0;
		while matches!(self.state, RunState::Ready | RunState::Running) {
			let floor = schedule.floor_for(self.confirmed_hits);
			self.step(floor)?;

			cycles += 1;
			if cycles % PROGRESS_INTERVAL == 0 {
				on_progress(self.confirmed_hits, self.total_guesses);
			}
		}

		on_progress(self.confirmed_hits, self.total_guesses);
		Ok(self.state)
	}

	/// One pop-and-expand cycle under the given threshold floor.
	///
	/// # Behavior, in order
	/// 1. Resource checks: wall clock or resident memory over budget
	///    transitions to `Aborted` (hard stop, partial results kept).
	/// 2. Termination checks: empty frontier or guess cap transitions to
	///    `Exhausted`.
	/// 3. Direct keyword emission: a popped body already containing an
	///    unprocessed keyword is emitted as-is and short-circuits the
	///    cycle.
	/// 4. Length guard: over-long candidates are discarded unexpanded.
	/// 5. Keyword-continuation injection for keywords the body could
	///    still grow into, within the per-keyword variant budget.
	/// 6. Ordinary expansion through the model: terminator continuations
	///    emit (if long enough), others extend the candidate and are
	///    pushed when still above the floor. An unknown context is not an
	///    error; the candidate is simply dropped.
	///
	/// Terminal states make this a no-op.
	///
	/// # Errors
	/// Only sink I/O failures propagate; they are fatal to the run.
	pub fn step(&mut self, floor: f64) -> Result<()> {
		if matches!(self.state, RunState::Exhausted | RunState::Aborted) {
			return Ok(());
		}

		if self.probe.elapsed() > self.config.wall_clock_cap
			|| self.probe.resident_memory() > self.config.memory_cap_bytes
		{
			self.state = RunState::Aborted;
			return Ok(());
		}

		if self.total_guesses > self.config.guess_cap {
			self.state = RunState::Exhausted;
			return Ok(());
		}
		let Some(candidate) = self.frontier.pop() else {
			self.state = RunState::Exhausted;
			return Ok(());
		};
		self.state = RunState::Running;

		let order = self.model.order();
		let body: String = candidate.sequence.chars().skip(order).collect();

		if let Some(id) = self.intel.first_contained(&body, &self.processed_keywords) {
			self.emit(&body, candidate.score)?;
			self.processed_keywords.insert(id);
			return Ok(());
		}

		if body.chars().count() > self.config.max_body_len {
			return Ok(());
		}

		self.inject_keyword_continuations(&body);

		let Some(continuations) = self.model.continuations(&candidate.context) else {
			return Ok(());
		};
		for &(symbol, probability) in continuations {
			if symbol == END_CHAR {
				if body.chars().count() > self.config.min_emit_len {
					self.emit(&body, candidate.score * probability)?;
				}
				continue;
			}

			let score = candidate.score * probability;
			if score >= floor {
				self.frontier.push(candidate.extended(symbol, score, order));
			}
		}

		Ok(())
	}

	/// Emits a guess body: dedup, counters, sink append, ground-truth
	/// crediting. A body seen before is ignored entirely.
	fn emit(&mut self, body: &str, probability: f64) -> Result<()> {
		if !self.emitted.insert(body.to_owned()) {
			return Ok(());
		}

		self.sink.append(body, probability)?;
		self.total_guesses += 1;

		if let Some(count) = self.ground_truth.remove(body) {
			self.confirmed_hits += count;
			if self.intel.contains_any(body) {
				self.keyword_hits += count;
			}
		}
		Ok(())
	}

	/// Pushes `start + keyword` for every keyword the body is a strict
	/// prefix of, within the variant budget and while injection still
	/// pays off.
	fn inject_keyword_continuations(&mut self, body: &str) {
		if self.intel.is_empty() {
			return;
		}

		let order = self.model.order();
		let start = self.model.start_context();
		let ids: Vec<usize> = self.intel.prefix_matches(body).collect();
		for id in ids {
			if self.processed_keywords.contains(&id) {
				continue;
			}
			if self.variant_counts[id] >= self.config.keyword_variant_cap {
				continue;
			}
			let score = self.keyword_seed_score(id);
			if score <= 0.0 {
				continue;
			}
			self.variant_counts[id] += 1;
			let sequence = format!("{start}{}", self.intel.keyword(id));
			self.frontier.push(Candidate::new(score, sequence, order));
		}
	}

	/// Priority of a keyword-derived candidate.
	///
	/// Base priority is `KEYWORD_SEED_WEIGHT / keyword_length`; it tapers
	/// linearly to zero as the keyword-hit ratio approaches the
	/// configured saturation, so keyword seeding stops dominating the
	/// frontier once it stops paying off.
	fn keyword_seed_score(&self, id: usize) -> f64 {
		let length = self.intel.keyword(id).chars().count().max(1) as f64;
		let base = KEYWORD_SEED_WEIGHT / length;

		if self.confirmed_hits == 0 {
			return base;
		}
		let ratio = self.keyword_hits as f64 / self.confirmed_hits as f64;
		let taper = 1.0 - (ratio / self.config.keyword_saturation).min(1.0);
		base * taper
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::resource::FixedProbe;
	use crate::model::sink::MemorySink;
	use std::collections::BTreeMap;

	fn two_symbol_model() -> MarkovModel {
		let mut contexts = BTreeMap::new();
		contexts.insert("##".to_owned(), vec![('1', 0.5), ('a', 0.3), (END_CHAR, 0.2)]);
		contexts.insert("#1".to_owned(), vec![(END_CHAR, 0.9), ('2', 0.1)]);
		MarkovModel::from_distributions(2, contexts)
	}

	fn permissive_config() -> RunConfig {
		RunConfig { min_emit_len: 0, ..RunConfig::default() }
	}

	fn enumerator(model: &MarkovModel) -> Enumerator<'_, MemorySink, FixedProbe> {
		Enumerator::new(
			model,
			IntelSet::empty(),
			HashMap::new(),
			permissive_config(),
			MemorySink::new(),
			FixedProbe::idle(),
		)
		.unwrap()
	}

	#[test]
	fn config_validation_names_bad_caps() {
		assert!(RunConfig { guess_cap: 0, ..RunConfig::default() }.validate().is_err());
		assert!(RunConfig { frontier_cap: 0, ..RunConfig::default() }.validate().is_err());
		assert!(
			RunConfig { keyword_saturation: 0.0, ..RunConfig::default() }
				.validate()
				.is_err()
		);
		assert!(
			RunConfig { min_emit_len: 21, max_body_len: 20, ..RunConfig::default() }
				.validate()
				.is_err()
		);
		assert!(RunConfig::default().validate().is_ok());
	}

	#[test]
	fn seeding_skips_terminator_and_respects_floor() {
		let model = two_symbol_model();
		let mut engine = enumerator(&model);
		engine.seed(0.4);
		// only '1' (0.5) passes; 'a' (0.3) is below the floor, '\n' skipped
		assert_eq!(engine.frontier_len(), 1);
	}

	#[test]
	fn emit_deduplicates_bodies() {
		let model = two_symbol_model();
		let mut engine = enumerator(&model);
		engine.emit("123456", 0.5).unwrap();
		engine.emit("123456", 0.5).unwrap();
		assert_eq!(engine.total_guesses(), 1);
		assert_eq!(engine.into_sink().len(), 1);
	}

	#[test]
	fn unknown_context_is_dropped_silently() {
		let model = two_symbol_model();
		let mut engine = enumerator(&model);
		let schedule = ThresholdSchedule::new(100, 10).unwrap();
		let state = engine.run(&schedule, |_, _| {}).unwrap();
		// 'a'-rooted candidates hit the missing "#a" context and vanish
		assert_eq!(state, RunState::Exhausted);
	}

	#[test]
	fn keyword_seed_score_tapers_with_saturation() {
		let model = two_symbol_model();
		let intel = IntelSet::new(["qwerty"]).unwrap();
		let mut engine = Enumerator::new(
			&model,
			intel,
			HashMap::new(),
			permissive_config(),
			MemorySink::new(),
			FixedProbe::idle(),
		)
		.unwrap();

		let fresh = engine.keyword_seed_score(0);
		assert!(fresh > 1.0, "seed score must outrank probabilities, got {fresh}");

		// saturated: every confirmed hit is keyword-derived
		engine.confirmed_hits = 10;
		engine.keyword_hits = 10;
		assert_eq!(engine.keyword_seed_score(0), 0.0);

		// halfway to saturation (ratio 0.25 of 0.5)
		engine.keyword_hits = 2;
		let tapered = engine.keyword_seed_score(0);
		assert!(tapered > 0.0 && tapered < fresh);
	}

	#[test]
	fn variant_budget_stops_keyword_injection() {
		let model = two_symbol_model();
		let intel = IntelSet::new(["qwerty"]).unwrap();
		let config = RunConfig { keyword_variant_cap: 3, ..permissive_config() };
		let mut engine = Enumerator::new(
			&model,
			intel,
			HashMap::new(),
			config,
			MemorySink::new(),
			FixedProbe::idle(),
		)
		.unwrap();

		for expected in 1..=3 {
			engine.inject_keyword_continuations("qw");
			assert_eq!(engine.frontier_len(), expected);
		}
		// budget spent, further strict-prefix matches inject nothing
		engine.inject_keyword_continuations("qw");
		engine.inject_keyword_continuations("qwe");
		assert_eq!(engine.frontier_len(), 3);
	}

	#[test]
	fn failed_sink_append_leaves_counters_untouched() {
		struct BrokenSink;

		impl GuessSink for BrokenSink {
			fn append(&mut self, _password: &str, _probability: f64) -> std::io::Result<()> {
				Err(std::io::Error::other("disk full"))
			}
		}

		let model = two_symbol_model();
		let mut engine = Enumerator::new(
			&model,
			IntelSet::empty(),
			HashMap::new(),
			permissive_config(),
			BrokenSink,
			FixedProbe::idle(),
		)
		.unwrap();

		assert!(engine.emit("123456", 0.5).is_err());
		assert_eq!(engine.total_guesses(), 0);
	}

	#[test]
	fn guess_cap_exhausts_the_run() {
		let model = two_symbol_model();
		let mut engine = enumerator(&model);
		engine.total_guesses = engine.config.guess_cap + 1;
		engine.seed(1e-9);
		engine.step(1e-9).unwrap();
		assert_eq!(engine.state(), RunState::Exhausted);
	}
}
