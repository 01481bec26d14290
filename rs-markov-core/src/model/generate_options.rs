use std::fmt;

use rand::RngCore;

use super::generator::GenerationResult;

/// Default number of attempts (and of steps per attempt).
pub const DEFAULT_MAX_TRIES: usize = 10;

/// Strategy used to pick the next state among a bucket of successors.
///
/// # Variants
/// - `Uniform`: every distinct successor is equally likely, whatever the
///   number of times it was observed.
/// - `Weighted`: a successor is picked proportionally to its number of refs
///   (observations). Fragments without refs are never picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Sampling {
	#[default]
	Uniform,
	Weighted,
}

type Filter<'a> = Box<dyn Fn(&GenerationResult) -> bool + 'a>;

/// Input parameters for one call to `Markov::generate`.
///
/// # Defaults
/// - `max_tries`: 10, a value of 0 keeps the default
/// - `rng`: the thread-local generator from `rand::rng()`
/// - `filter`: none, every terminated walk is accepted
/// - `sampling`: `Sampling::Uniform`
///
/// The filter is a rejection predicate: returning `true` discards the
/// candidate and starts a new attempt.
pub struct GenerateOptions<'a> {
	max_tries: usize,
	pub(crate) rng: Box<dyn RngCore + 'a>,
	pub(crate) filter: Option<Filter<'a>>,
	pub sampling: Sampling,
}

impl<'a> GenerateOptions<'a> {
	pub fn new() -> Self {
		Self {
			max_tries: DEFAULT_MAX_TRIES,
			rng: Box::new(rand::rng()),
			filter: None,
			sampling: Sampling::Uniform,
		}
	}

	/// Sets the number of attempts. Zero is ignored and keeps the current value.
	pub fn with_max_tries(mut self, max_tries: usize) -> Self {
		if max_tries > 0 {
			self.max_tries = max_tries;
		}
		self
	}

	/// Sets the entropy source used for every random pick.
	pub fn with_rng<R: RngCore + 'a>(mut self, rng: R) -> Self {
		self.rng = Box::new(rng);
		self
	}

	/// Sets the rejection predicate.
	pub fn with_filter<F>(mut self, filter: F) -> Self
	where
		F: Fn(&GenerationResult) -> bool + 'a,
	{
		self.filter = Some(Box::new(filter));
		self
	}

	pub fn with_sampling(mut self, sampling: Sampling) -> Self {
		self.sampling = sampling;
		self
	}

	pub fn max_tries(&self) -> usize {
		self.max_tries
	}

	/// Returns `true` if a filter is set and it rejects `result`.
	pub(crate) fn rejects(&self, result: &GenerationResult) -> bool {
		self.filter.as_ref().is_some_and(|filter| filter(result))
	}
}

impl Default for GenerateOptions<'_> {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Debug for GenerateOptions<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("GenerateOptions")
			.field("max_tries", &self.max_tries)
			.field("filter", &self.filter.is_some())
			.field("sampling", &self.sampling)
			.finish_non_exhaustive()
	}
}
