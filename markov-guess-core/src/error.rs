use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, GuessError>;

/// Errors surfaced by corpus preparation, model construction and the
/// enumeration engine.
///
/// Per-candidate anomalies (unknown context, degenerate length) are not
/// errors: they are handled locally by skipping the candidate. Only input
/// and persistence problems propagate to the caller.
#[derive(Debug, Error)]
pub enum GuessError {
	/// The corpus file contained no parseable password line.
	#[error("corpus format error: {0}")]
	CorpusFormat(String),

	/// More samples were requested than the corpus holds.
	#[error("requested {requested} samples but corpus only holds {available}")]
	InsufficientSample { requested: usize, available: usize },

	/// A run parameter failed startup validation.
	#[error("invalid configuration: {0}")]
	InvalidConfig(String),

	/// Model artifact (de)serialization failed.
	#[error("model persistence failed: {0}")]
	Persist(#[from] postcard::Error),

	/// Filesystem failure on the corpus, the model cache or the guess sink.
	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),
}
