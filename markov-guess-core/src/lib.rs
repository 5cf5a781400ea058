//! Markov-model password-guessing library.
//!
//! This crate provides a probabilistic password-guessing engine:
//! - Corpus loading, filtering and seeded train/test splitting
//! - An order-`k` character Markov model with Laplace smoothing and a
//!   cached binary artifact
//! - A best-first enumeration engine with threshold-based pruning,
//!   keyword ("intelligence") injection, output deduplication and
//!   resource-bounded termination
//!
//! The pipeline stages (corpus, builder, model, schedule, frontier,
//! intel, sinks, probes, enumerator) are all public so callers can
//! assemble custom runs; only raw transition bookkeeping and file
//! helpers stay internal.

/// Corpus preparation: annotated-wordlist parsing, seeded splitting,
/// and tallying into the multisets the model and engine consume.
pub mod corpus;

/// Crate error taxonomy and result alias.
pub mod error;

/// Probability model, threshold schedule, frontier, intel matching and
/// the enumeration engine.
pub mod model;

/// I/O utilities (file loading, cache path helpers).
pub(crate) mod io;
