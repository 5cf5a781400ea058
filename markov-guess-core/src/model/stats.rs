use serde::{Deserialize, Serialize};

use super::markov_model::{SMOOTHING_ALPHA, SMOOTHING_MASS};

/// Transition statistics for a single context key.
///
/// A `ContextStats` corresponds to a fixed `order`-character context and
/// stores all observed continuations from this context to the next
/// character, weighted by corpus frequency.
///
/// Conceptually, this is a node in a Markov chain where outgoing edges
/// are weighted by their number of observations.
///
/// ## Responsibilities
/// - Accumulate weighted transition occurrences during counting
/// - Merge with another node for the same context (parallel counting support)
/// - Convert counts into a smoothed, descending probability distribution
///
/// ## Invariants
/// - Transitions are kept in first-seen order, which makes tie-breaking
///   in the final sort deterministic (the sort is stable)
/// - Each transition count is strictly positive
#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct ContextStats {
	/// Outgoing transitions as `(next_char, occurrences)`, first-seen order.
	transitions: Vec<(char, u64)>,
}

impl ContextStats {
	/// Creates an empty node.
	pub(crate) fn new() -> Self {
		Self { transitions: Vec::new() }
	}

	/// Records `weight` occurrences of a transition toward `next_char`.
	///
	/// Context keys hold at most the printable-ASCII alphabet plus the
	/// terminator, so the linear scan stays short.
	pub(crate) fn add_transition(&mut self, next_char: char, weight: u64) {
		match self.transitions.iter_mut().find(|(c, _)| *c == next_char) {
			Some((_, occurrences)) => *occurrences += weight,
			None => self.transitions.push((next_char, weight)),
		}
	}

	/// Merges another node for the same context into this one.
	///
	/// Transition counts are summed; continuations unseen locally are
	/// appended in the other node's order. Intended for combining partial
	/// counting results.
	pub(crate) fn absorb(&mut self, other: &Self) {
		for (next_char, occurrences) in &other.transitions {
			self.add_transition(*next_char, *occurrences);
		}
	}

	/// Converts the raw counts into a smoothed probability distribution,
	/// sorted descending by probability.
	///
	/// Laplace/additive smoothing: `(count + α) / (total + α·V)` with
	/// `α = 0.01` and `α·V = 0.96` for the printable alphabet, so every
	/// stored probability is strictly positive.
	///
	/// The sort is stable, so equal probabilities keep their first-seen
	/// order and the output is deterministic for a fixed input.
	pub(crate) fn into_distribution(self) -> Vec<(char, f64)> {
		let total: u64 = self.transitions.iter().map(|(_, occurrences)| occurrences).sum();

		let mut distribution: Vec<(char, f64)> = self
			.transitions
			.into_iter()
			.map(|(next_char, occurrences)| {
				(next_char, (occurrences as f64 + SMOOTHING_ALPHA) / (total as f64 + SMOOTHING_MASS))
			})
			.collect();

		distribution.sort_by(|a, b| b.1.total_cmp(&a.1));
		distribution
	}
}
