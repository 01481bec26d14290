use std::path::Path;

use log::{debug, info, warn};

use crate::error::MarkovError;
use crate::io::{build_output_path, load_structure, read_file, save_structure, sentences};
use super::builder;
use super::fragment::Structure;
use super::generate_options::GenerateOptions;
use super::generator::{self, GenerationResult};
use super::store::{MemoryStore, Store};

/// Number of words per state when none is given.
pub const DEFAULT_STATE_SIZE: usize = 2;

/// A word-level Markov chain which can be trained and used to generate sentences.
///
/// # Responsibilities
/// - Own the state size (fixed at construction) and the backing `Store`
/// - Feed training sentences to the corpus builder and write the result back
/// - Run the chain generator over a snapshot of the store
///
/// The facade never mutates the model directly, every change goes through
/// the store's read/replace contract.
#[derive(Debug)]
pub struct Markov<S: Store = MemoryStore> {
	state_size: usize,
	data: Vec<String>,
	store: S,
}

impl Markov<MemoryStore> {
	/// Creates an empty chain backed by a `MemoryStore`.
	///
	/// A `state_size` of 0 falls back to `DEFAULT_STATE_SIZE`.
	pub fn new(state_size: usize) -> Self {
		Self::with_store(state_size, MemoryStore::new())
	}

	/// Loads a chain trained on a text file, one sentence per line.
	///
	/// - Checks if a snapshot `<stem>.<state_size>.bin` exists next to the file.
	/// - If so, imports it (the training history stays empty).
	/// - Otherwise trains on every non-blank line (trimmed) and writes the snapshot for
	///   future fast loading.
	///
	/// # Errors
	/// Returns an error if the text file or the snapshot cannot be read or written.
	pub fn from_file<P: AsRef<Path>>(filepath: P, state_size: usize) -> Result<Self, MarkovError> {
		let mut model = Self::new(state_size);
		let snapshot_path = build_output_path(&filepath, &format!("{}.bin", model.state_size))?;

		if snapshot_path.exists() {
			info!("loading snapshot {}", snapshot_path.display());
			model.import(load_structure(&snapshot_path)?);
		} else {
			info!("training from {}", filepath.as_ref().display());
			model.add_data(&read_sentences(&filepath)?);
			save_structure(&snapshot_path, &model.export())?;
		}

		Ok(model)
	}

	/// Loads a chain trained on several text files.
	///
	/// A single file goes through `from_file` and its snapshot cache. Several
	/// files are trained together from their lines, in the given order, since
	/// snapshots cannot be combined.
	pub fn from_files<P: AsRef<Path>>(filepaths: &[P], state_size: usize) -> Result<Self, MarkovError> {
		if let [filepath] = filepaths {
			return Self::from_file(filepath, state_size);
		}

		let mut model = Self::new(state_size);
		for filepath in filepaths {
			info!("training from {}", filepath.as_ref().display());
			model.add_data(&read_sentences(filepath)?);
		}
		Ok(model)
	}
}

/// Trimmed, non-blank lines of a training file.
fn read_sentences<P: AsRef<Path>>(filepath: P) -> Result<Vec<String>, MarkovError> {
	let lines = read_file(filepath)?;
	Ok(sentences(lines.iter().map(String::as_str))
		.into_iter()
		.map(str::to_owned)
		.collect())
}

impl Default for Markov<MemoryStore> {
	fn default() -> Self {
		Self::new(DEFAULT_STATE_SIZE)
	}
}

impl<S: Store> Markov<S> {
	/// Creates an empty chain on top of a caller-provided store.
	pub fn with_store(state_size: usize, store: S) -> Self {
		let state_size = if state_size == 0 {
			warn!("state size 0 is invalid, using {}", DEFAULT_STATE_SIZE);
			DEFAULT_STATE_SIZE
		} else {
			state_size
		};

		Self { state_size, data: Vec::new(), store }
	}

	pub fn state_size(&self) -> usize {
		self.state_size
	}

	/// Every sentence passed to `add_data`, in call order.
	///
	/// Kept as a record only, generation never reads it.
	pub fn history(&self) -> &[String] {
		&self.data
	}

	pub fn store(&self) -> &S {
		&self.store
	}

	/// Trains the chain on `sentences`.
	///
	/// Never fails: sentences shorter than the state size only produce
	/// degenerate start/end words.
	pub fn add_data<T: AsRef<str>>(&mut self, sentences: &[T]) {
		let mut structure = self.snapshot();
		builder::build(sentences, self.state_size, &mut structure);

		self.store.set_start_words(structure.start_words);
		self.store.set_end_words(structure.end_words);
		self.store.set_corpus(structure.corpus);

		self.data.extend(sentences.iter().map(|s| s.as_ref().to_owned()));
	}

	/// Generates a sentence from the trained chain.
	///
	/// # Errors
	/// - `MarkovError::EmptyCorpus` if nothing was learned yet
	/// - `MarkovError::GenerationExhausted` if every attempt failed or was filtered
	pub fn generate(&self, mut options: GenerateOptions) -> Result<GenerationResult, MarkovError> {
		let structure = self.snapshot();
		debug!("generating with {:?}", options);
		generator::generate(&structure, &mut options)
	}

	/// Replaces the whole model with `structure`.
	pub fn import(&mut self, structure: Structure) {
		self.store.import(structure);
	}

	/// Returns a deep copy of the whole model.
	pub fn export(&self) -> Structure {
		self.store.export()
	}

	fn snapshot(&self) -> Structure {
		Structure {
			corpus: self.store.corpus(),
			start_words: self.store.start_words(),
			end_words: self.store.end_words(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn zero_state_size_falls_back_to_default() {
		assert_eq!(Markov::new(0).state_size(), DEFAULT_STATE_SIZE);
		assert_eq!(Markov::new(3).state_size(), 3);
		let model: Markov = Markov::default();
		assert_eq!(model.state_size(), 2);
	}

	#[test]
	fn add_data_records_history() {
		let mut model: Markov = Markov::default();
		model.add_data(&["a b c d"]);
		model.add_data(&vec!["e f g h".to_owned(), "x".to_owned()]);

		assert_eq!(model.history(), ["a b c d", "e f g h", "x"]);
	}

	#[test]
	fn add_data_writes_through_the_store() {
		let mut model: Markov = Markov::default();
		model.add_data(&["a b c d"]);

		let store = model.store();
		assert_eq!(store.start_words()[0].words, "a b");
		assert_eq!(store.end_words()[0].words, "c d");
		assert_eq!(store.corpus()["a b"][0].words, "c d");
	}
}
