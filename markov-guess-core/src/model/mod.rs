//! Top-level module for the guided password-enumeration system.
//!
//! This module provides the full guessing pipeline, including:
//! - Raw transition-frequency counting (`FrequencyTable`)
//! - The smoothed, immutable probability model (`MarkovModel`)
//! - The shrinking acceptance-floor schedule (`ThresholdSchedule`)
//! - The bounded best-first frontier (`Frontier`)
//! - Keyword intelligence matching (`IntelSet`)
//! - The enumeration engine itself (`Enumerator`)

/// Raw transition-frequency table and its parallel construction.
///
/// Counts `context -> next character` occurrences over the annotated
/// training corpus, weighted by password multiplicity, and merges
/// chunked partial counts deterministically.
pub mod builder;

/// The guided search engine.
///
/// Best-first pop/expand loop with threshold pruning, keyword
/// injection, output deduplication, ground-truth crediting and
/// resource-bounded termination.
pub mod enumerator;

/// Bounded best-first frontier of partial candidate sequences.
///
/// Descending-score ordering with deterministic FIFO tie-breaking and
/// lowest-score eviction on overflow.
pub mod frontier;

/// Attacker-supplied keyword hints and their matching automaton.
pub mod intel;

/// The immutable probability model (`context -> sorted continuations`)
/// and its cached binary persistence.
pub mod markov_model;

/// Injectable wall-clock / resident-memory probes.
pub mod resource;

/// Guess output sinks (in-memory and tab-separated file).
pub mod sink;

/// Internal transition statistics for a single context key.
///
/// Tracks weighted continuations and converts them into a smoothed,
/// sorted distribution. This module is not exposed publicly.
mod stats;

/// Shrinking sequence of acceptance-probability floors indexed by
/// confirmed-hit batches.
pub mod threshold;
