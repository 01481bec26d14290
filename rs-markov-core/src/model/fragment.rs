use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A window of `state_size` consecutive words and the sentences it came from.
///
/// Conceptually, this is a node in a Markov chain. The same type is used for
/// start words, end words and the successor states stored in the corpus.
///
/// ## Responsibilities:
/// - Hold the joined words of the window (`words`)
/// - Record the provenance of the window (`refs`), in insertion order
///
/// ## Invariants
/// - Within one sequence (start list, end list or corpus bucket) no two
///   fragments share the same `words`
/// - `refs` only ever grows
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Fragment {
	/// Words of the window joined by single spaces.
	/// Example: "lorem ipsum"
	pub words: String,
	/// Training sentences that produced this window.
	pub refs: Vec<String>,
}

impl Fragment {
	/// Creates a fragment observed for the first time in `sentence`.
	pub fn new(words: &str, sentence: &str) -> Self {
		Self {
			words: words.to_owned(),
			refs: vec![sentence.to_owned()],
		}
	}

	/// Number of observations recorded for this fragment.
	pub fn weight(&self) -> usize {
		self.refs.len()
	}
}

/// Transition table: state words -> distinct successor fragments.
///
/// Successors keep insertion order and are never duplicated, repeated
/// observations only show up in their `refs`.
pub type Corpus = HashMap<String, Vec<Fragment>>;

/// Full snapshot of a model, used for import and export.
///
/// This is the only persisted representation of a trained chain.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Structure {
	pub corpus: Corpus,
	pub start_words: Vec<Fragment>,
	pub end_words: Vec<Fragment>,
}

impl Structure {
	/// Total number of transitions (edges) stored in the corpus.
	pub fn transition_count(&self) -> usize {
		self.corpus.values().map(Vec::len).sum()
	}
}
