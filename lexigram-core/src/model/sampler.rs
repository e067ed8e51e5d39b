use std::collections::HashSet;

use rand::Rng;
use rand::seq::IndexedRandom;

/// Candidate name sampler over ordered part lists.
///
/// Draws one entry from each part list independently, with replacement,
/// and concatenates them: a uniform sample from the cartesian product of
/// the lists. The randomness source is injected by the caller, so tests
/// can seed a deterministic generator instead of relying on ambient
/// global state.
pub struct NameSampler {
	parts: Vec<Vec<String>>,
}

impl NameSampler {
	/// Creates a sampler from ordered part lists (e.g. prefixes, stems,
	/// suffixes). Empty part lists contribute nothing to a sample.
	pub fn new(parts: Vec<Vec<String>>) -> Self {
		Self { parts }
	}

	/// Number of distinct draws: the product of the part-list lengths.
	pub fn possibilities(&self) -> usize {
		self.parts.iter().map(Vec::len).product()
	}

	/// Draws one name: one uniformly chosen entry per part list,
	/// concatenated in list order.
	pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
		self.parts
			.iter()
			.filter_map(|part| part.choose(rng))
			.map(String::as_str)
			.collect()
	}

	/// Draws `count` names and deduplicates them, keeping the first
	/// occurrence order. The result may be shorter than `count`.
	pub fn sample_set<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Vec<String> {
		let mut seen = HashSet::new();
		let mut names = Vec::new();
		for _ in 0..count {
			let name = self.sample(rng);
			if seen.insert(name.clone()) {
				names.push(name);
			}
		}
		names
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	fn parts(lists: &[&[&str]]) -> Vec<Vec<String>> {
		lists
			.iter()
			.map(|list| list.iter().map(|s| s.to_string()).collect())
			.collect()
	}

	#[test]
	fn possibilities_is_the_product_of_list_lengths() {
		let sampler = NameSampler::new(parts(&[&["a", "b"], &["x", "y", "z"], &["", "q"]]));
		assert_eq!(sampler.possibilities(), 12);
	}

	#[test]
	fn sample_concatenates_one_entry_per_list_in_order() {
		let sampler = NameSampler::new(parts(&[&["nano"], &["cal"], &["ry"]]));
		let mut rng = StdRng::seed_from_u64(7);
		assert_eq!(sampler.sample(&mut rng), "nanocalry");
	}

	#[test]
	fn seeded_sampling_is_repeatable() {
		let sampler = NameSampler::new(parts(&[&["a", "b", "c"], &["x", "y"], &["", "z"]]));
		let first: Vec<String> = {
			let mut rng = StdRng::seed_from_u64(42);
			sampler.sample_set(20, &mut rng)
		};
		let second: Vec<String> = {
			let mut rng = StdRng::seed_from_u64(42);
			sampler.sample_set(20, &mut rng)
		};
		assert_eq!(first, second);
	}

	#[test]
	fn sample_set_deduplicates_and_keeps_first_seen_order() {
		let sampler = NameSampler::new(parts(&[&["a"], &["b"]]));
		let mut rng = StdRng::seed_from_u64(1);
		assert_eq!(sampler.sample_set(5, &mut rng), vec!["ab".to_string()]);
	}

	#[test]
	fn empty_part_lists_contribute_nothing() {
		let sampler = NameSampler::new(parts(&[&["a"], &[], &["b"]]));
		let mut rng = StdRng::seed_from_u64(3);
		assert_eq!(sampler.sample(&mut rng), "ab");
		assert_eq!(sampler.possibilities(), 0);
	}
}
