//! Top-level module for the word-level Markov chain.
//!
//! This module provides:
//! - The model data types (`Fragment`, `Corpus`, `Structure`)
//! - The storage seam (`Store`) and its in-memory implementation
//! - Corpus construction from training sentences (`builder`)
//! - Bounded random-walk generation (`generator`, `GenerateOptions`)
//! - The `Markov` facade tying everything together

/// Fragments, corpus and snapshot types.
pub mod fragment;

/// Storage contract for the model state and the default in-memory store.
///
/// Reads always return owned copies, writes replace the stored value.
pub mod store;

/// Incremental corpus construction from training sentences.
pub mod builder;

/// Random-walk generation with retry, scoring and filtering.
pub mod generator;

/// Generation configuration: retries, entropy source, filter and sampling mode.
pub mod generate_options;

/// High-level chain owning the state size and the store.
pub mod markov;
