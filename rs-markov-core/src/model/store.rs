use super::fragment::{Corpus, Fragment, Structure};

/// Storage backend holding the three pieces of model state.
///
/// # Contract
/// - Every read returns an owned copy; mutating it never touches stored state
/// - Every write replaces the stored value wholesale
/// - `import` replaces all three collections, `export` snapshots all three
///
/// Implementations are not required to be synchronized. Callers sharing a
/// store between threads must wrap it themselves.
pub trait Store {
	fn start_words(&self) -> Vec<Fragment>;
	fn set_start_words(&mut self, fragments: Vec<Fragment>);

	fn end_words(&self) -> Vec<Fragment>;
	fn set_end_words(&mut self, fragments: Vec<Fragment>);

	fn corpus(&self) -> Corpus;
	fn set_corpus(&mut self, corpus: Corpus);

	/// Replaces the whole model with `structure`.
	fn import(&mut self, structure: Structure);

	/// Returns a deep copy of the whole model.
	fn export(&self) -> Structure;
}

/// Default store keeping everything in process memory.
///
/// Data is discarded when the store is dropped.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
	start_words: Vec<Fragment>,
	end_words: Vec<Fragment>,
	corpus: Corpus,
}

impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}
}

impl Store for MemoryStore {
	fn start_words(&self) -> Vec<Fragment> {
		self.start_words.clone()
	}

	fn set_start_words(&mut self, fragments: Vec<Fragment>) {
		self.start_words = fragments;
	}

	fn end_words(&self) -> Vec<Fragment> {
		self.end_words.clone()
	}

	fn set_end_words(&mut self, fragments: Vec<Fragment>) {
		self.end_words = fragments;
	}

	fn corpus(&self) -> Corpus {
		self.corpus.clone()
	}

	fn set_corpus(&mut self, corpus: Corpus) {
		self.corpus = corpus;
	}

	fn import(&mut self, structure: Structure) {
		self.start_words = structure.start_words;
		self.end_words = structure.end_words;
		self.corpus = structure.corpus;
	}

	fn export(&self) -> Structure {
		Structure {
			corpus: self.corpus.clone(),
			start_words: self.start_words.clone(),
			end_words: self.end_words.clone(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn reads_do_not_alias_stored_state() {
		let mut store = MemoryStore::new();
		store.set_start_words(vec![Fragment::new("a b", "a b c d")]);

		let mut copy = store.start_words();
		copy[0].refs.push("intruder".to_owned());
		copy.push(Fragment::new("x y", "x y"));

		let stored = store.start_words();
		assert_eq!(stored.len(), 1);
		assert_eq!(stored[0].refs, vec!["a b c d".to_owned()]);
	}

	#[test]
	fn corpus_reads_do_not_alias_stored_state() {
		let mut store = MemoryStore::new();
		let mut corpus = Corpus::new();
		corpus.insert("a b".to_owned(), vec![Fragment::new("c d", "a b c d")]);
		store.set_corpus(corpus);

		let mut copy = store.corpus();
		copy.get_mut("a b").unwrap()[0].refs.clear();
		copy.insert("e f".to_owned(), Vec::new());

		let stored = store.corpus();
		assert_eq!(stored.len(), 1);
		assert_eq!(stored["a b"][0].refs.len(), 1);
	}

	#[test]
	fn import_replaces_and_export_snapshots() {
		let mut store = MemoryStore::new();
		store.set_end_words(vec![Fragment::new("old", "old")]);

		let mut structure = Structure::default();
		structure.start_words.push(Fragment::new("a b", "a b c d"));
		structure.end_words.push(Fragment::new("c d", "a b c d"));
		structure.corpus.insert("a b".to_owned(), vec![Fragment::new("c d", "a b c d")]);
		store.import(structure.clone());

		assert_eq!(store.export(), structure);
		assert_eq!(store.end_words()[0].words, "c d");
	}
}
