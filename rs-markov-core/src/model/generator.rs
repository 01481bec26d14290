use std::collections::HashSet;

use log::{debug, warn};
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use crate::error::MarkovError;
use super::fragment::{Fragment, Structure};
use super::generate_options::{GenerateOptions, Sampling};

/// Outcome of a successful generation.
///
/// - `sentence`: the generated text
/// - `score`: sum over every step of (number of successors of the departing state - 1).
///   A walk through single-successor states scores 0.
/// - `refs`: training sentences touched by the walk, deduplicated, first-seen order
/// - `tries`: attempt that produced this result (1-based)
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct GenerationResult {
	pub sentence: String,
	pub score: usize,
	pub refs: Vec<String>,
	pub tries: usize,
}

impl GenerationResult {
	fn from_walk(walk: &[&Fragment], score: usize, tries: usize) -> Self {
		let sentence = walk
			.iter()
			.map(|f| f.words.as_str())
			.collect::<Vec<_>>()
			.join(" ")
			.trim()
			.to_owned();

		let mut seen = HashSet::new();
		let refs = walk
			.iter()
			.flat_map(|f| f.refs.iter().map(String::as_str))
			.filter(|r| seen.insert(*r))
			.map(str::to_owned)
			.collect();

		Self { sentence, score, refs, tries }
	}

	/// Returns `true` if the sentence is a verbatim copy (ASCII case-insensitive)
	/// of one of the training sentences it was built from.
	pub fn reproduces_reference(&self) -> bool {
		self.refs.iter().any(|r| r.eq_ignore_ascii_case(&self.sentence))
	}
}

/// Random-walks `structure` from a start word to an end word.
///
/// # Behavior
/// - Up to `max_tries` attempts, each walking at most `max_tries` steps.
/// - An attempt succeeds when the last picked state is one of the end words
///   and the filter (if any) does not reject the candidate.
/// - A state without successors ends the walk early, the attempt is lost.
///
/// # Errors
/// - `MarkovError::EmptyCorpus` if no transition was ever learned.
/// - `MarkovError::GenerationExhausted` if no attempt succeeded.
pub fn generate(structure: &Structure, options: &mut GenerateOptions) -> Result<GenerationResult, MarkovError> {
	if structure.corpus.is_empty() {
		return Err(MarkovError::EmptyCorpus);
	}

	let max_tries = options.max_tries();
	let sampling = options.sampling;

	for tries in 1..=max_tries {
		let Some(start) = pick(&structure.start_words, sampling, &mut *options.rng) else {
			warn!("no start word can be picked, attempt {tries} abandoned");
			continue;
		};

		let mut walk = vec![start];
		let mut score = 0;
		let mut ended = false;

		for _ in 0..max_tries {
			let Some(bucket) = walk.last().and_then(|block| structure.corpus.get(&block.words)) else {
				break;
			};
			let Some(state) = pick(bucket, sampling, &mut *options.rng) else {
				break;
			};

			walk.push(state);
			score += bucket.len() - 1;

			if structure.end_words.iter().any(|f| f.words == state.words) {
				ended = true;
				break;
			}
		}

		let result = GenerationResult::from_walk(&walk, score, tries);
		if ended && !options.rejects(&result) {
			debug!("generated after {} tries with score {}", tries, result.score);
			return Ok(result);
		}
	}

	debug!("generation exhausted after {} tries", max_tries);
	Err(MarkovError::GenerationExhausted { tries: max_tries })
}

/// Picks one fragment according to `sampling`.
///
/// Returns `None` for an empty slice, or in weighted mode when every weight is zero.
fn pick<'f, R: Rng + ?Sized>(fragments: &'f [Fragment], sampling: Sampling, rng: &mut R) -> Option<&'f Fragment> {
	match sampling {
		Sampling::Uniform => fragments.choose(rng),
		Sampling::Weighted => fragments.choose_weighted(rng, Fragment::weight).ok(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::builder::build;
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	fn trained(sentences: &[&str]) -> Structure {
		let mut structure = Structure::default();
		build(sentences, 2, &mut structure);
		structure
	}

	fn seeded<'a>() -> GenerateOptions<'a> {
		GenerateOptions::new().with_rng(StdRng::seed_from_u64(42))
	}

	#[test]
	fn empty_corpus_fails_immediately() {
		let structure = trained(&["x"]);
		let err = generate(&structure, &mut seeded()).unwrap_err();
		assert!(matches!(err, MarkovError::EmptyCorpus));
	}

	#[test]
	fn single_path_is_deterministic() {
		let structure = trained(&["a b c d e f"]);
		let result = generate(&structure, &mut seeded()).unwrap();

		assert_eq!(result.sentence, "a b c d e f");
		assert_eq!(result.score, 0);
		assert_eq!(result.tries, 1);
		assert_eq!(result.refs, vec!["a b c d e f".to_owned()]);
	}

	#[test]
	fn branching_increases_score_and_merges_refs() {
		let structure = trained(&["a b c d", "a b e f"]);
		let result = generate(&structure, &mut seeded()).unwrap();

		assert!(result.sentence == "a b c d" || result.sentence == "a b e f");
		assert_eq!(result.score, 1);
		assert_eq!(result.refs, vec!["a b c d".to_owned(), "a b e f".to_owned()]);
	}

	#[test]
	fn always_rejecting_filter_exhausts() {
		let structure = trained(&["a b c d"]);
		let mut options = seeded().with_max_tries(4).with_filter(|_| true);
		let err = generate(&structure, &mut options).unwrap_err();
		assert!(matches!(err, MarkovError::GenerationExhausted { tries: 4 }));
	}

	#[test]
	fn unterminated_walk_is_rejected() {
		// "a b" -> "c d" exists but "c d" is not an end word
		let mut structure = trained(&["a b c d"]);
		structure.end_words.clear();
		let err = generate(&structure, &mut seeded().with_max_tries(3)).unwrap_err();
		assert!(matches!(err, MarkovError::GenerationExhausted { tries: 3 }));
	}

	#[test]
	fn walk_stops_at_first_end_word() {
		// "c d" is an end word and also has a successor
		let mut structure = trained(&["a b c d", "c d e f"]);
		structure.start_words.retain(|f| f.words == "a b");

		for seed in 0..8 {
			let mut options = GenerateOptions::new().with_rng(StdRng::seed_from_u64(seed));
			let result = generate(&structure, &mut options).unwrap();
			assert_eq!(result.sentence, "a b c d");
			assert_eq!(result.tries, 1);
		}
	}

	#[test]
	fn cyclic_walk_is_bounded() {
		let mut structure = trained(&["a b a b a b"]);
		assert_eq!(structure.corpus["a b"][0].words, "a b");
		structure.end_words.clear();

		let err = generate(&structure, &mut seeded().with_max_tries(5)).unwrap_err();
		assert!(matches!(err, MarkovError::GenerationExhausted { tries: 5 }));
	}

	#[test]
	fn missing_start_words_exhaust() {
		let mut structure = trained(&["a b c d"]);
		structure.start_words.clear();
		let err = generate(&structure, &mut seeded().with_max_tries(2)).unwrap_err();
		assert!(matches!(err, MarkovError::GenerationExhausted { tries: 2 }));
	}

	#[test]
	fn weighted_mode_skips_unobserved_fragments() {
		let mut structure = trained(&["a b c d", "a b e f"]);
		for fragment in structure.corpus.get_mut("a b").unwrap() {
			if fragment.words == "c d" {
				fragment.refs.clear();
			}
		}

		for seed in 0..16 {
			let mut options = GenerateOptions::new()
				.with_rng(StdRng::seed_from_u64(seed))
				.with_sampling(Sampling::Weighted);
			let result = generate(&structure, &mut options).unwrap();
			assert_eq!(result.sentence, "a b e f");
			assert_eq!(result.score, 1);
		}
	}

	#[test]
	fn verbatim_copy_is_detected() {
		let structure = trained(&["A b c d"]);
		let result = generate(&structure, &mut seeded()).unwrap();
		assert!(result.reproduces_reference());

		let novel = GenerationResult {
			sentence: "a b e f".to_owned(),
			score: 1,
			refs: vec!["a b c d".to_owned(), "x y e f".to_owned()],
			tries: 1,
		};
		assert!(!novel.reproduces_reference());
	}
}
