use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::builder::FrequencyTable;
use crate::error::{GuessError, Result};
use crate::io::model_cache_path;

/// Start sentinel, repeated `order` times in front of every sequence.
pub const START_CHAR: char = '#';

/// Terminator sentinel marking end-of-password.
pub const END_CHAR: char = '\n';

/// Additive smoothing constant α.
pub const SMOOTHING_ALPHA: f64 = 0.01;

/// α·V for the effective alphabet bound (96 printable characters).
pub const SMOOTHING_MASS: f64 = 0.96;

/// The immutable probability model consumed by the enumerator.
///
/// Maps every context key observed in training to its continuations as
/// `(next_char, probability)` pairs, sorted descending by probability.
/// The descending order is load-bearing: the enumerator's expansion step
/// offers the most likely continuation first, which lets threshold
/// cutoffs trigger without a full scan in the common case.
///
/// # Invariants
/// - Probabilities for a given context sum to 1 within smoothing slack
/// - Every stored probability is strictly positive (Laplace smoothing)
/// - Every trained context has a non-empty continuation list
/// - Read-only after construction; the enumerator never mutates it
#[derive(Serialize, Deserialize, Debug)]
pub struct MarkovModel {
	order: usize,
	contexts: BTreeMap<String, Vec<(char, f64)>>,
}

impl MarkovModel {
	/// The order `k` the model conditions on.
	pub fn order(&self) -> usize {
		self.order
	}

	/// The bare start context: the start sentinel repeated `order` times.
	pub fn start_context(&self) -> String {
		START_CHAR.to_string().repeat(self.order)
	}

	/// Number of distinct trained contexts.
	pub fn len(&self) -> usize {
		self.contexts.len()
	}

	pub fn is_empty(&self) -> bool {
		self.contexts.is_empty()
	}

	/// Continuations of a context, most probable first.
	///
	/// Returns `None` for a context never seen in training; callers treat
	/// this as "no further expansion", not as an error.
	pub fn continuations(&self, context: &str) -> Option<&[(char, f64)]> {
		self.contexts.get(context).map(Vec::as_slice)
	}

	/// Iterates over all `(context, continuations)` pairs, key-ordered.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &[(char, f64)])> {
		self.contexts.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
	}

	/// Trains a model from a tallied multiset of annotated passwords.
	///
	/// # Parameters
	/// - `tallied`: `(annotated_password, occurrence_count)` pairs; the
	///   passwords must already carry the sentinels (see
	///   `corpus::tally_train`).
	/// - `order`: context order, must be >= 1.
	///
	/// # Behavior
	/// - Counts transition frequencies in parallel chunks.
	/// - Applies Laplace smoothing and sorts each context's continuations
	///   descending by probability.
	///
	/// # Determinism
	/// For a fixed input and order the result is bit-identical across
	/// runs: contexts live in a `BTreeMap` and probability ties are broken
	/// by a stable sort on first-seen continuation order.
	///
	/// # Errors
	/// Returns `InvalidConfig` if `order < 1`.
	pub fn train(tallied: &[(String, u64)], order: usize) -> Result<Self> {
		if order < 1 {
			return Err(GuessError::InvalidConfig("order must be >= 1".to_owned()));
		}

		let table = FrequencyTable::count_corpus(tallied, order);
		Ok(Self::from_table(table))
	}

	/// Converts a raw frequency table into the smoothed, sorted model.
	pub fn from_table(table: FrequencyTable) -> Self {
		let order = table.order();
		let contexts = table
			.into_contexts()
			.into_iter()
			.map(|(context, stats)| (context, stats.into_distribution()))
			.collect();
		Self { order, contexts }
	}

	/// Assembles a model from pre-computed distributions.
	///
	/// The caller is responsible for the model invariants (descending
	/// order, positive probabilities). Mainly useful for embedding a model
	/// smoothed elsewhere and for tests.
	pub fn from_distributions(order: usize, contexts: BTreeMap<String, Vec<(char, f64)>>) -> Self {
		Self { order, contexts }
	}

	/// Builds the cache path of a trained artifact under `base`.
	///
	/// Artifacts are keyed by order, seed and sample count:
	/// `base/order{k}/order{k}_{seed}_{number}.bin`.
	pub fn cache_path<P: AsRef<Path>>(base: P, order: usize, seed: u64, number: usize) -> PathBuf {
		model_cache_path(base, order, seed, number)
	}

	/// Loads a model from a postcard artifact written by `save`.
	pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
		let bytes = fs::read(path)?;
		Ok(postcard::from_bytes(&bytes)?)
	}

	/// Serializes the model to a compact postcard artifact.
	///
	/// Parent directories are created as needed. Written once per
	/// corpus/order/seed combination; later runs load the artifact
	/// instead of re-training.
	pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
		if let Some(parent) = path.as_ref().parent() {
			fs::create_dir_all(parent)?;
		}
		let bytes = postcard::to_stdvec(self)?;
		fs::write(path, bytes)?;
		Ok(())
	}
}
