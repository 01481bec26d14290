use log::debug;

use super::fragment::{Fragment, Structure};

/// Accumulates training sentences into `structure`.
///
/// For each sentence:
/// - its first `state_size` words are recorded as a start word
/// - its last `state_size` words are recorded as an end word
/// - every window followed by a full window of `state_size` words records
///   a transition `window -> next window`
///
/// # Notes
/// - Words are split on single spaces, nothing else is tokenized.
/// - Sentences shorter than `state_size` are not rejected, they produce
///   shorter start/end words and no transitions.
/// - Start/end refs are deduplicated; transition refs are appended on every
///   observation, so training the same sentence twice records it twice.
/// - Nothing is ever removed.
pub fn build<S: AsRef<str>>(sentences: &[S], state_size: usize, structure: &mut Structure) {
	for sentence in sentences {
		add_sentence(sentence.as_ref(), state_size, structure);
	}

	debug!(
		"trained {} sentences: {} start words, {} end words, {} states",
		sentences.len(),
		structure.start_words.len(),
		structure.end_words.len(),
		structure.corpus.len()
	);
}

fn add_sentence(sentence: &str, state_size: usize, structure: &mut Structure) {
	let words: Vec<&str> = sentence.split(' ').collect();
	let len = words.len();

	let start = join_window(&words, 0, state_size);
	record(&mut structure.start_words, &start, sentence, true);

	let end = join_window(&words, len.saturating_sub(state_size), len);
	record(&mut structure.end_words, &end, sentence, true);

	for i in 0..len.saturating_sub(1) {
		let next = join_window(&words, i + state_size, i + state_size * 2);
		// Tail too short to fill a whole window
		if next.is_empty() || next.split(' ').count() != state_size {
			continue;
		}

		let curr = join_window(&words, i, i + state_size);
		let bucket = structure.corpus.entry(curr).or_default();
		record(bucket, &next, sentence, false);
	}
}

/// Joins `words[from..to]`, clamping both bounds to the slice.
fn join_window(words: &[&str], from: usize, to: usize) -> String {
	let to = to.min(words.len());
	let from = from.min(to);
	words[from..to].join(" ")
}

/// Finds the fragment for `words` or appends a new one, then records `sentence`.
///
/// With `unique_refs`, a sentence already present in the refs is not added again.
fn record(fragments: &mut Vec<Fragment>, words: &str, sentence: &str, unique_refs: bool) {
	match fragments.iter_mut().find(|f| f.words == words) {
		Some(fragment) => {
			if !unique_refs || !fragment.refs.iter().any(|r| r == sentence) {
				fragment.refs.push(sentence.to_owned());
			}
		}
		None => fragments.push(Fragment::new(words, sentence)),
	}
}
