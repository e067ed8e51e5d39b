use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::model::probability::ProbabilityTable;

/// Order of a transition model: pairwise or triple adjacency.
///
/// The order is fixed when a table is built and dispatched on once;
/// other orders are unrepresentable.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModelOrder {
	/// Adjacent pairs `(a, b)`, an `n×n` table.
	Order1,
	/// Adjacent triples `(a, b, c)`, an `n×n×n` table.
	Order2,
}

impl ModelOrder {
	/// Converts a raw integer order into the tagged variant.
	///
	/// # Errors
	/// Returns `ModelError::UnsupportedModelOrder` for anything other
	/// than 1 or 2. This is the single entry point for untrusted orders
	/// (configuration, query parameters), so invalid orders are rejected
	/// at construction time rather than per call.
	pub fn from_order(order: usize) -> Result<Self> {
		match order {
			1 => Ok(Self::Order1),
			2 => Ok(Self::Order2),
			other => Err(ModelError::UnsupportedModelOrder(other)),
		}
	}

	/// The raw order: 1 or 2.
	pub fn as_usize(self) -> usize {
		match self {
			Self::Order1 => 1,
			Self::Order2 => 2,
		}
	}

	/// Number of symbols a sequence must span to contribute one
	/// transition: 2 for pairs, 3 for triples.
	pub fn window(self) -> usize {
		self.as_usize() + 1
	}
}

/// Dense transition count table over symbol indices.
///
/// Accumulates adjacency counts from index-sequences: an `n×n` array of
/// pair counts for order 1, an `n×n×n` array of triple counts for order 2.
/// Mutated only during accumulation, then treated as immutable.
///
/// # Invariants
/// - `cells.len() == n_symbols.pow(order + 1)`
/// - Counts depend only on the multiset of ingested sequences, not
///   their order
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CountTable {
	order: ModelOrder,
	n_symbols: usize,
	cells: Vec<u64>,
}

impl CountTable {
	/// Creates an empty count table for `n_symbols` symbols.
	pub fn new(order: ModelOrder, n_symbols: usize) -> Self {
		let cells = vec![0; n_symbols.pow(order.window() as u32)];
		Self { order, n_symbols, cells }
	}

	/// Builds a table by accumulating every sequence of a corpus.
	pub fn from_sequences<'a, I>(order: ModelOrder, n_symbols: usize, sequences: I) -> Self
	where
		I: IntoIterator<Item = &'a [usize]>,
	{
		let mut table = Self::new(order, n_symbols);
		for sequence in sequences {
			table.add_sequence(sequence);
		}
		table
	}

	/// The order of the table.
	pub fn order(&self) -> ModelOrder {
		self.order
	}

	/// The alphabet size the table was built for.
	pub fn n_symbols(&self) -> usize {
		self.n_symbols
	}

	/// Count for the pair `(a, b)`. Meaningful for order-1 tables.
	pub fn pair(&self, a: usize, b: usize) -> u64 {
		debug_assert_eq!(self.order, ModelOrder::Order1);
		self.cells[a * self.n_symbols + b]
	}

	/// Count for the triple `(a, b, c)`. Meaningful for order-2 tables.
	pub fn triple(&self, a: usize, b: usize, c: usize) -> u64 {
		debug_assert_eq!(self.order, ModelOrder::Order2);
		self.cells[(a * self.n_symbols + b) * self.n_symbols + c]
	}

	/// Raw cells in row-major order.
	pub fn cells(&self) -> &[u64] {
		&self.cells
	}

	/// Accumulates every adjacent window of one index-sequence.
	///
	/// For order 1, every adjacent pair of a sequence of length >= 2
	/// increments its cell; for order 2, every adjacent triple of a
	/// sequence of length >= 3. Shorter sequences contribute nothing
	/// (not an error).
	///
	/// Indices must come from the same alphabet the table was sized for;
	/// the codec validates them before they reach the builder.
	pub fn add_sequence(&mut self, sequence: &[usize]) {
		let n = self.n_symbols;
		match self.order {
			ModelOrder::Order1 => {
				for window in sequence.windows(2) {
					self.cells[window[0] * n + window[1]] += 1;
				}
			}
			ModelOrder::Order2 => {
				for window in sequence.windows(3) {
					self.cells[(window[0] * n + window[1]) * n + window[2]] += 1;
				}
			}
		}
	}

	/// Merges another count table into this one by cell-wise summation.
	///
	/// Intended for parallel builds: each worker accumulates a private
	/// partial table over its chunk of the corpus, then the partials are
	/// summed into the final table.
	///
	/// # Errors
	/// Returns `ModelError::ShapeMismatch` if the orders or alphabet
	/// sizes differ.
	pub fn merge(&mut self, other: &Self) -> Result<()> {
		if self.order != other.order || self.n_symbols != other.n_symbols {
			return Err(ModelError::ShapeMismatch {
				left_order: self.order.as_usize(),
				left_symbols: self.n_symbols,
				right_order: other.order.as_usize(),
				right_symbols: other.n_symbols,
			});
		}

		for (cell, partial) in self.cells.iter_mut().zip(&other.cells) {
			*cell += partial;
		}

		Ok(())
	}

	/// Normalizes the table into a row-stochastic probability table
	/// with additive smoothing. See `ProbabilityTable::from_counts`.
	pub fn normalized(&self, smoothing: f64) -> Result<ProbabilityTable> {
		ProbabilityTable::from_counts(self, smoothing)
	}
}
