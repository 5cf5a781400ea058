use std::cmp::Ordering;
use std::collections::BTreeSet;

/// A partial candidate sequence pending expansion.
///
/// # Fields
/// - `score`: priority of the candidate. For ordinary candidates this is
///   the cumulative probability of the sequence (chain rule along the
///   Markov sequence); keyword seeds carry fixed priorities above 1.0 so
///   they outrank every probability-derived candidate.
/// - `sequence`: the full symbol sequence including the start sentinels.
/// - `context`: the trailing `min(order, len)` characters of `sequence`,
///   used as the next model lookup key. Recomputed on every extension.
///
/// Candidates are immutable once pushed: extensions create new
/// candidates, never mutate in place.
#[derive(Debug, Clone)]
pub struct Candidate {
	pub score: f64,
	pub sequence: String,
	pub context: String,
}

impl Candidate {
	/// Creates a candidate, deriving the context from the sequence tail.
	pub fn new(score: f64, sequence: String, order: usize) -> Self {
		let context = trailing_chars(&sequence, order);
		Self { score, sequence, context }
	}

	/// Creates the candidate extended by one symbol.
	pub fn extended(&self, symbol: char, score: f64, order: usize) -> Self {
		let mut sequence = self.sequence.clone();
		sequence.push(symbol);
		Self::new(score, sequence, order)
	}
}

/// Returns the last `n` characters of a string (UTF-8 safe).
///
/// If `n` is greater than the number of characters, the entire string is
/// returned.
fn trailing_chars(s: &str, n: usize) -> String {
	let count = s.chars().count();
	if n >= count {
		return s.to_owned();
	}
	s.chars().skip(count - n).collect()
}

/// Frontier entry: a candidate plus an insertion stamp.
///
/// Ordering is descending by score, then FIFO by stamp, so equal-score
/// candidates are popped in insertion order and none is silently lost to
/// tie-breaking. Stamps are unique, which keeps the ordering total.
#[derive(Debug)]
struct Entry {
	candidate: Candidate,
	stamp: u64,
}

impl PartialEq for Entry {
	fn eq(&self, other: &Self) -> bool {
		self.stamp == other.stamp
	}
}

impl Eq for Entry {}

impl PartialOrd for Entry {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl Ord for Entry {
	fn cmp(&self, other: &Self) -> Ordering {
		other
			.candidate
			.score
			.total_cmp(&self.candidate.score)
			.then(self.stamp.cmp(&other.stamp))
	}
}

/// Bounded best-first frontier of pending candidates.
///
/// An ordered multiset yielding the highest-score candidate first. When
/// the size cap is exceeded, the lowest-score entry is evicted, which
/// bounds memory regardless of how fast the search space branches.
#[derive(Debug)]
pub struct Frontier {
	entries: BTreeSet<Entry>,
	capacity: usize,
	next_stamp: u64,
}

impl Frontier {
	/// Creates an empty frontier holding at most `capacity` candidates
	/// (`capacity >= 1` expected, validated by the run configuration).
	pub fn new(capacity: usize) -> Self {
		Self { entries: BTreeSet::new(), capacity, next_stamp: 0 }
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Pushes a candidate, evicting the lowest-score entry if the cap is
	/// exceeded.
	pub fn push(&mut self, candidate: Candidate) {
		let stamp = self.next_stamp;
		self.next_stamp += 1;
		self.entries.insert(Entry { candidate, stamp });

		if self.entries.len() > self.capacity {
			self.entries.pop_last();
		}
	}

	/// Removes and returns the highest-score candidate.
	pub fn pop(&mut self) -> Option<Candidate> {
		self.entries.pop_first().map(|entry| entry.candidate)
	}
}
