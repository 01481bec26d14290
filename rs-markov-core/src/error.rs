//! Error types returned by the Markov chain library.

use thiserror::Error;

/// Errors produced by generation and snapshot persistence.
///
/// Training never fails, so none of these come out of `Markov::add_data`.
#[derive(Debug, Error)]
pub enum MarkovError {
	/// Generation was requested before any transition was learned.
	#[error("markov: corpus is empty")]
	EmptyCorpus,

	/// Every attempt either failed to reach an end word or was rejected by the filter.
	#[error("markov: failed to build sentence after {tries} tries")]
	GenerationExhausted { tries: usize },

	/// A training file or snapshot could not be read or written.
	#[error("io error: {0}")]
	Io(#[from] std::io::Error),

	/// A snapshot file could not be encoded or decoded.
	#[error("snapshot error: {0}")]
	Snapshot(#[from] postcard::Error),
}
