use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// Fixed bijection between symbols and dense indices `0..n`.
///
/// An `Alphabet` maps each of its `n` symbols to exactly one index in
/// `[0, n)` and back. The mapping is immutable for the lifetime of a model:
/// count tables, probability tables and repaired sequences all refer to the
/// same index space.
///
/// # Responsibilities
/// - Encode a word into its index-sequence representation
/// - Decode an index-sequence back into a word
/// - Reject symbols or indices outside the configured set
///
/// # Invariants
/// - Every symbol maps to exactly one index and vice versa
/// - Indices are dense: `0..len()`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Alphabet {
	/// Symbols in index order.
	symbols: Vec<char>,
	/// Reverse lookup from symbol to index.
	indices: HashMap<char, usize>,
}

impl Alphabet {
	/// Creates an alphabet from an ordered set of symbols.
	///
	/// The index of each symbol is its position in `symbols`.
	/// Duplicate characters keep their first position.
	pub fn new(symbols: &str) -> Self {
		let mut ordered = Vec::new();
		let mut indices = HashMap::new();
		for c in symbols.chars() {
			if !indices.contains_key(&c) {
				indices.insert(c, ordered.len());
				ordered.push(c);
			}
		}
		Self { symbols: ordered, indices }
	}

	/// The default alphabet: the 26 lowercase ASCII letters, `a` at index 0.
	pub fn lowercase() -> Self {
		Self::new("abcdefghijklmnopqrstuvwxyz")
	}

	/// Number of symbols in the alphabet.
	pub fn len(&self) -> usize {
		self.symbols.len()
	}

	/// Returns true if the alphabet contains no symbols.
	pub fn is_empty(&self) -> bool {
		self.symbols.is_empty()
	}

	/// Returns the index of `symbol`, or `None` if it is not part of
	/// the alphabet.
	pub fn index_of(&self, symbol: char) -> Option<usize> {
		self.indices.get(&symbol).copied()
	}

	/// Returns the symbol at `index`, or `None` if out of range.
	pub fn symbol(&self, index: usize) -> Option<char> {
		self.symbols.get(index).copied()
	}

	/// Encodes a word into its index-sequence representation.
	///
	/// # Errors
	/// Returns `ModelError::UnsupportedSymbol` for the first character that
	/// is not part of the alphabet. Unknown symbols are never dropped or
	/// substituted.
	pub fn encode(&self, word: &str) -> Result<Vec<usize>> {
		word.chars()
			.map(|c| self.index_of(c).ok_or(ModelError::UnsupportedSymbol(c)))
			.collect()
	}

	/// Decodes an index-sequence back into a word.
	///
	/// Exact inverse of `encode`: `decode(&encode(w)?) == w` for every word
	/// composed solely of alphabet symbols.
	///
	/// # Errors
	/// Returns `ModelError::IndexOutOfRange` for the first index `>= len()`.
	pub fn decode(&self, sequence: &[usize]) -> Result<String> {
		sequence
			.iter()
			.map(|&index| {
				self.symbol(index).ok_or(ModelError::IndexOutOfRange {
					index,
					size: self.len(),
				})
			})
			.collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn round_trip_over_the_lowercase_alphabet() {
		let alphabet = Alphabet::lowercase();
		assert_eq!(alphabet.len(), 26);
		for word in ["a", "zephyr", "abcdefghijklmnopqrstuvwxyz", ""] {
			let encoded = alphabet.encode(word).unwrap();
			assert_eq!(alphabet.decode(&encoded).unwrap(), word);
		}
	}

	#[test]
	fn encode_maps_letters_to_dense_indices() {
		let alphabet = Alphabet::lowercase();
		assert_eq!(alphabet.encode("abz").unwrap(), vec![0, 1, 25]);
	}

	#[test]
	fn encode_rejects_symbols_outside_the_alphabet() {
		let alphabet = Alphabet::lowercase();
		for word in ["ab3", "Été", "hello world"] {
			match alphabet.encode(word) {
				Err(ModelError::UnsupportedSymbol(_)) => (),
				other => panic!("expected UnsupportedSymbol, got {:?}", other),
			}
		}
	}

	#[test]
	fn decode_rejects_out_of_range_indices() {
		let alphabet = Alphabet::new("abc");
		match alphabet.decode(&[0, 3]) {
			Err(ModelError::IndexOutOfRange { index: 3, size: 3 }) => (),
			other => panic!("expected IndexOutOfRange, got {:?}", other),
		}
	}

	#[test]
	fn custom_alphabet_preserves_symbol_order() {
		let alphabet = Alphabet::new("cab");
		assert_eq!(alphabet.index_of('c'), Some(0));
		assert_eq!(alphabet.index_of('a'), Some(1));
		assert_eq!(alphabet.symbol(2), Some('b'));
		assert_eq!(alphabet.index_of('z'), None);
	}

	#[test]
	fn duplicate_symbols_keep_their_first_position() {
		let alphabet = Alphabet::new("aba");
		assert_eq!(alphabet.len(), 2);
		assert_eq!(alphabet.index_of('a'), Some(0));
		assert_eq!(alphabet.index_of('b'), Some(1));
	}
}
