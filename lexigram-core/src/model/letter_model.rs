use std::collections::HashSet;
use std::path::Path;
use std::sync::mpsc;
use std::thread;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::io::{build_output_path, get_filename, load_wordlist};
use crate::model::alphabet::Alphabet;
use crate::model::counts::{CountTable, ModelOrder};
use crate::model::probability::{LogProbabilityTable, ProbabilityTable};
use crate::model::repair::RepairEngine;

/// Top-level letter-transition model learned from a word corpus.
///
/// This struct ties the whole pipeline together and owns:
/// - the `Alphabet` every index refers to,
/// - the raw `CountTable` accumulated from the corpus,
/// - the normalized `ProbabilityTable` and its log-space counterpart,
/// - the set of training words (used to filter generated candidates that
///   already exist).
///
/// Everything is frozen after construction: scoring and repair only read
/// the tables, so a model can be shared across threads without locking.
#[derive(Serialize, Deserialize, Debug)]
pub struct LetterModel {
	/// Name of the model, derived from the wordlist file name.
	name: String,
	alphabet: Alphabet,
	order: ModelOrder,
	smoothing: f64,
	counts: CountTable,
	probabilities: ProbabilityTable,
	log_probabilities: LogProbabilityTable,
	words: HashSet<String>,
}

impl LetterModel {
	/// Loads a `LetterModel` from a wordlist file, using a binary cache
	/// when one exists.
	///
	/// - `filepath` is the raw wordlist (whitespace-separated words).
	/// - A `.bin` file next to the wordlist is tried first; `postcard` is
	///   used for compact serialization.
	/// - A cache built with a different order or smoothing, or an
	///   unreadable cache, triggers a rebuild instead of serving a stale
	///   model.
	///
	/// The alphabet is fixed to the 26 lowercase letters; the wordlist
	/// loader filters out anything that would not encode against it.
	pub fn new<P: AsRef<Path>>(filepath: P, order: ModelOrder, smoothing: f64) -> Result<Self> {
		let binary_data_path = build_output_path(&filepath, "bin")?;

		if binary_data_path.exists() {
			let bytes = std::fs::read(&binary_data_path)?;
			match postcard::from_bytes::<Self>(&bytes) {
				Ok(model)
					if model.order == order
						&& model.smoothing == smoothing
						&& model.alphabet == Alphabet::lowercase() =>
				{
					info!("loaded cached model '{}'", model.name);
					return Ok(model);
				}
				Ok(_) => info!("cached model parameters differ, rebuilding"),
				Err(e) => info!("cached model unreadable ({}), rebuilding", e),
			}
		}

		Self::read_wordlist_file(&filepath, binary_data_path, order, smoothing)
	}

	/// Builds a model directly from an in-memory corpus.
	///
	/// Every word must encode against `alphabet`; the count table is
	/// accumulated sequentially, then normalized once.
	///
	/// # Errors
	/// Propagates `UnsupportedSymbol` from the codec and
	/// `InvalidSmoothing` from the normalizer.
	pub fn from_words(
		words: Vec<String>,
		alphabet: Alphabet,
		order: ModelOrder,
		smoothing: f64,
	) -> Result<Self> {
		let mut counts = CountTable::new(order, alphabet.len());
		for word in &words {
			counts.add_sequence(&alphabet.encode(word)?);
		}

		Self::assemble(String::new(), alphabet, order, smoothing, counts, words)
	}

	/// Reads a wordlist file, splits it into chunks, accumulates partial
	/// count tables in parallel, merges them into the final table, and
	/// serializes the finished model.
	///
	/// # Behavior
	/// - Splits the corpus into chunks (CPU cores * factor).
	/// - Spawns one thread per chunk; each owns a private partial
	///   `CountTable`, so there is no shared mutable state during the
	///   accumulation phase.
	/// - Merges (sums) all partial tables sequentially.
	/// - Writes the final model to `binary_data_path` for future fast
	///   loading.
	///
	/// # Notes
	/// - Uses MPSC channels to collect partial tables from threads.
	/// - Codec failures inside a worker are sent back through the channel
	///   and surface here, never silently dropped.
	fn read_wordlist_file<PF, PB>(
		filepath: PF,
		binary_data_path: PB,
		order: ModelOrder,
		smoothing: f64,
	) -> Result<Self>
	where
		PF: AsRef<Path>,
		PB: AsRef<Path>,
	{
		let words = load_wordlist(&filepath)?;
		let alphabet = Alphabet::lowercase();

		let cpus = num_cpus::get();
		let factor = 8;
		let chunks = cpus * factor;
		let chunk_size = ((words.len() + chunks - 1) / chunks).max(1);
		debug!("counting transitions over {} words, chunk size {}", words.len(), chunk_size);

		let (tx, rx) = mpsc::channel();
		for chunk in words.chunks(chunk_size) {
			let tx = tx.clone();
			let chunk: Vec<String> = chunk.to_vec();
			let alphabet = alphabet.clone();

			thread::spawn(move || {
				let partial = chunk.iter().try_fold(
					CountTable::new(order, alphabet.len()),
					|mut table, word| {
						table.add_sequence(&alphabet.encode(word)?);
						Ok::<_, ModelError>(table)
					},
				);
				tx.send(partial).expect("Failed to send from thread");
			});
		}
		drop(tx);

		let mut counts = CountTable::new(order, alphabet.len());
		for partial in rx.iter() {
			counts.merge(&partial?)?;
		}

		let name = get_filename(&filepath)?;
		let model = Self::assemble(name, alphabet, order, smoothing, counts, words)?;

		let bytes = postcard::to_stdvec(&model)?;
		std::fs::write(binary_data_path, bytes)?;
		info!("model '{}' built from {} words and cached", model.name, model.words.len());

		Ok(model)
	}

	/// Freezes accumulated counts into a finished model.
	fn assemble(
		name: String,
		alphabet: Alphabet,
		order: ModelOrder,
		smoothing: f64,
		counts: CountTable,
		words: Vec<String>,
	) -> Result<Self> {
		let probabilities = counts.normalized(smoothing)?;
		let log_probabilities = probabilities.ln();

		Ok(Self {
			name,
			alphabet,
			order,
			smoothing,
			counts,
			probabilities,
			log_probabilities,
			words: words.into_iter().collect(),
		})
	}

	/// Name of the model (wordlist file stem; empty for in-memory models).
	pub fn name(&self) -> &str {
		&self.name
	}

	/// The alphabet every table index refers to.
	pub fn alphabet(&self) -> &Alphabet {
		&self.alphabet
	}

	/// The model order.
	pub fn order(&self) -> ModelOrder {
		self.order
	}

	/// The smoothing constant the tables were normalized with.
	pub fn smoothing(&self) -> f64 {
		self.smoothing
	}

	/// Number of distinct training words.
	pub fn word_count(&self) -> usize {
		self.words.len()
	}

	/// Returns true if `word` was part of the training corpus.
	///
	/// Used to drop generated candidates that already exist.
	pub fn contains(&self, word: &str) -> bool {
		self.words.contains(word)
	}

	/// The raw accumulated counts.
	pub fn counts(&self) -> &CountTable {
		&self.counts
	}

	/// The normalized probability table.
	pub fn probabilities(&self) -> &ProbabilityTable {
		&self.probabilities
	}

	/// The log-space table used for scoring.
	pub fn scorer(&self) -> &LogProbabilityTable {
		&self.log_probabilities
	}

	/// Log-likelihood of a word under the model.
	///
	/// # Errors
	/// Returns `UnsupportedSymbol` if the word contains a character
	/// outside the alphabet; the failure happens at the codec boundary,
	/// before any scoring.
	pub fn score(&self, word: &str) -> Result<f64> {
		Ok(self.log_probabilities.score(&self.alphabet.encode(word)?))
	}

	/// Creates a repair engine over this model's probability table.
	///
	/// # Errors
	/// Returns `UnsupportedModelOrder` for order-2 models: the repair
	/// cost model is pairwise.
	pub fn repair_engine(&self, allow_deletions: bool) -> Result<RepairEngine> {
		RepairEngine::new(&self.probabilities, allow_deletions)
	}

	/// Applies one repair step to a word and decodes the result.
	pub fn repair(&self, word: &str, allow_deletions: bool) -> Result<String> {
		let engine = self.repair_engine(allow_deletions)?;
		let repaired = engine.repair(&self.alphabet.encode(word)?);
		self.alphabet.decode(&repaired)
	}

	/// Repairs a word until it stops changing or `max_rounds` passes
	/// have run.
	pub fn repair_until_fixed(
		&self,
		word: &str,
		allow_deletions: bool,
		max_rounds: usize,
	) -> Result<String> {
		let engine = self.repair_engine(allow_deletions)?;
		let repaired = engine.repair_until_fixed(&self.alphabet.encode(word)?, max_rounds);
		self.alphabet.decode(&repaired)
	}

	/// For each symbol, the most likely next symbol under the model.
	///
	/// # Errors
	/// Returns `UnsupportedModelOrder` for order-2 models (the report is
	/// over pairwise transitions).
	pub fn most_likely_transitions(&self) -> Result<Vec<(char, char)>> {
		self.extremal_transitions(true)
	}

	/// For each symbol, the least likely next symbol under the model.
	pub fn least_likely_transitions(&self) -> Result<Vec<(char, char)>> {
		self.extremal_transitions(false)
	}

	fn extremal_transitions(&self, most_likely: bool) -> Result<Vec<(char, char)>> {
		if self.order != ModelOrder::Order1 {
			return Err(ModelError::UnsupportedModelOrder(self.order.as_usize()));
		}

		let n = self.alphabet.len();
		let mut transitions = Vec::with_capacity(n);
		for a in 0..n {
			let mut extremal = 0;
			for b in 1..n {
				let better = if most_likely {
					self.probabilities.pair(a, b) > self.probabilities.pair(a, extremal)
				} else {
					self.probabilities.pair(a, b) < self.probabilities.pair(a, extremal)
				};
				if better {
					extremal = b;
				}
			}
			// Both indices are below the alphabet size by construction
			transitions.push((
				self.alphabet.symbol(a).unwrap(),
				self.alphabet.symbol(extremal).unwrap(),
			));
		}

		Ok(transitions)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::path::PathBuf;

	fn abc_model() -> LetterModel {
		let words = ["ab", "ab", "ac"].iter().map(|s| s.to_string()).collect();
		LetterModel::from_words(words, Alphabet::new("abc"), ModelOrder::Order1, 1.0).unwrap()
	}

	#[test]
	fn in_memory_models_score_and_repair() {
		let model = abc_model();
		assert!(model.score("ab").unwrap() > model.score("aa").unwrap());
		assert!(model.contains("ab"));
		assert!(!model.contains("zz"));

		let repaired = model.repair("aa", false).unwrap();
		assert!(model.score(&repaired).unwrap() >= model.score("aa").unwrap());
		assert!(repaired.chars().all(|c| model.alphabet().index_of(c).is_some()));
	}

	#[test]
	fn accessors_expose_the_frozen_tables() {
		let model = abc_model();

		// ["ab", "ab", "ac"] yields two a->b transitions and one a->c
		assert_eq!(model.counts().pair(0, 1), 2);
		assert_eq!(model.counts().pair(0, 2), 1);

		// Scoring through the shared scorer matches the word-level API
		let encoded = model.alphabet().encode("ab").unwrap();
		assert_eq!(model.scorer().score(&encoded), model.score("ab").unwrap());
	}

	#[test]
	fn scoring_fails_at_the_codec_boundary() {
		let model = abc_model();
		assert!(matches!(
			model.score("a3"),
			Err(ModelError::UnsupportedSymbol('3'))
		));
		assert!(matches!(
			model.repair("a!", false),
			Err(ModelError::UnsupportedSymbol('!'))
		));
	}

	#[test]
	fn order_2_models_score_but_refuse_pairwise_repair() {
		let words = ["abc", "abc"].iter().map(|s| s.to_string()).collect();
		let model =
			LetterModel::from_words(words, Alphabet::new("abc"), ModelOrder::Order2, 1.0).unwrap();

		assert!(model.score("abc").unwrap() < 0.0);
		assert!(matches!(
			model.repair("abc", false),
			Err(ModelError::UnsupportedModelOrder(2))
		));
	}

	#[test]
	fn extremal_transitions_follow_the_counts() {
		let model = abc_model();
		let most = model.most_likely_transitions().unwrap();
		// counts[a] = [0, 2, 1], so 'b' follows 'a' most often
		assert_eq!(most[0], ('a', 'b'));
		let least = model.least_likely_transitions().unwrap();
		assert_eq!(least[0], ('a', 'a'));
	}

	fn scratch_wordlist(tag: &str) -> PathBuf {
		let mut path = std::env::temp_dir();
		path.push(format!("lexigram-model-{}-{}.txt", std::process::id(), tag));
		std::fs::write(&path, "the cat sat on the mat\nwords tree vine\n").unwrap();
		path
	}

	#[test]
	fn wordlist_models_cache_and_reload() {
		let path = scratch_wordlist("cache");
		let cache = build_output_path(&path, "bin").unwrap();

		let built = LetterModel::new(&path, ModelOrder::Order1, 1.0).unwrap();
		assert!(cache.exists());
		assert_eq!(built.word_count(), 7); // "on" is too short, "the" repeats

		let reloaded = LetterModel::new(&path, ModelOrder::Order1, 1.0).unwrap();
		assert_eq!(reloaded.score("cat").unwrap(), built.score("cat").unwrap());

		// Different parameters must not be served from the stale cache
		let rebuilt = LetterModel::new(&path, ModelOrder::Order1, 2.0).unwrap();
		assert_eq!(rebuilt.smoothing(), 2.0);

		std::fs::remove_file(&path).unwrap();
		std::fs::remove_file(&cache).unwrap();
	}
}
