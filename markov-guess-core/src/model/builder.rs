use std::collections::BTreeMap;
use std::sync::mpsc;
use std::thread;

use super::stats::ContextStats;

/// Raw transition-frequency table for a fixed context order.
///
/// The table records, for every `order`-character window seen in the
/// annotated training passwords, how often each continuation character
/// follows it, weighted by each password's multiplicity in the corpus.
///
/// # Invariants
/// - `order` is always >= 1
/// - Context keys have exactly `order` characters
/// - Contexts are held in a `BTreeMap`, so iteration (and serialization
///   of the finished model) is key-ordered and deterministic
#[derive(Clone, Debug)]
pub struct FrequencyTable {
	order: usize,
	contexts: BTreeMap<String, ContextStats>,
}

impl FrequencyTable {
	/// Creates an empty table of the given order (`order >= 1` expected,
	/// validated by the caller).
	pub fn new(order: usize) -> Self {
		Self { order, contexts: BTreeMap::new() }
	}

	pub fn order(&self) -> usize {
		self.order
	}

	pub(crate) fn into_contexts(self) -> BTreeMap<String, ContextStats> {
		self.contexts
	}

	/// Records every `order`-window of an annotated password.
	///
	/// `annotated` must already carry the start sentinels and the
	/// terminator; `weight` is the password's occurrence count in the
	/// corpus. Passwords too short to contain a single window are ignored.
	pub fn record(&mut self, annotated: &str, weight: u64) {
		let chars: Vec<char> = annotated.chars().collect();
		if chars.len() <= self.order {
			return;
		}

		for i in 0..chars.len() - self.order {
			let context: String = chars[i..i + self.order].iter().collect();
			let next_char = chars[i + self.order];

			self.contexts
				.entry(context)
				.or_insert_with(ContextStats::new)
				.add_transition(next_char, weight);
		}
	}

	/// Merges another table of the same order into this one.
	///
	/// Matching contexts have their transition counts summed; new contexts
	/// are inserted. Used to combine partial tables from parallel counting.
	pub fn merge(&mut self, other: &Self) {
		debug_assert_eq!(self.order, other.order);
		for (context, stats) in &other.contexts {
			match self.contexts.get_mut(context) {
				Some(existing) => existing.absorb(stats),
				None => {
					self.contexts.insert(context.clone(), stats.clone());
				}
			}
		}
	}

	/// Counts a tallied training multiset in parallel chunks and merges
	/// the partial tables.
	///
	/// # Behavior
	/// - Splits the multiset into chunks (CPU cores * factor).
	/// - Spawns a thread per chunk building a partial table.
	/// - Merges partial tables in chunk order, so the first-seen order of
	///   continuations (the tie-break order of the final sort) does not
	///   depend on thread scheduling.
	pub fn count_corpus(tallied: &[(String, u64)], order: usize) -> Self {
		let cpus = num_cpus::get();
		let factor = 8;
		let chunks = cpus * factor;
		let chunk_size = (tallied.len() + chunks - 1) / chunks.max(1);

		if tallied.is_empty() || chunk_size == 0 {
			return Self::new(order);
		}

		let (tx, rx) = mpsc::channel();
		for (index, chunk) in tallied.chunks(chunk_size).enumerate() {
			let tx = tx.clone();
			let chunk: Vec<(String, u64)> = chunk.to_vec();

			thread::spawn(move || {
				let mut partial = FrequencyTable::new(order);
				for (annotated, weight) in &chunk {
					partial.record(annotated, *weight);
				}
				tx.send((index, partial)).expect("Failed to send from thread");
			});
		}
		drop(tx);

		let mut partials: Vec<(usize, FrequencyTable)> = rx.iter().collect();
		partials.sort_by_key(|(index, _)| *index);

		let mut table = Self::new(order);
		for (_, partial) in &partials {
			table.merge(partial);
		}
		table
	}
}
