//! Word-level Markov chain text generation library.
//!
//! This crate provides:
//! - Incremental training on example sentences over fixed-size word windows
//! - Bounded random-walk generation from start words to end words, with
//!   retries, structural scoring and caller-provided filtering
//! - A pluggable storage seam with an in-memory implementation
//! - Snapshot persistence and file helpers
//!
//! Most callers only need [`model::markov::Markov`] and
//! [`model::generate_options::GenerateOptions`].

/// Markov chain models and generation logic.
pub mod model;

/// Error type shared by the whole crate.
pub mod error;

/// I/O utilities (file loading, snapshot persistence, path helpers).
pub mod io;

pub use error::MarkovError;
pub use model::fragment::{Corpus, Fragment, Structure};
pub use model::generate_options::{GenerateOptions, Sampling};
pub use model::generator::GenerationResult;
pub use model::markov::Markov;
pub use model::store::{MemoryStore, Store};
