use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::model::counts::{CountTable, ModelOrder};

/// Row-stochastic transition probability table.
///
/// Derived from a `CountTable` by additive smoothing: every cell of a row
/// receives `smoothing` extra mass and the row is divided by the smoothed
/// row sum, so each row sums to exactly 1 and every cell is strictly
/// positive. A row with zero observed mass therefore comes out uniform.
///
/// Immutable once built; shared read-only by the scorer and the repair
/// engine. Scoring happens on the log-space counterpart (`ln`), computed
/// once and reused across calls.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ProbabilityTable {
	order: ModelOrder,
	n_symbols: usize,
	smoothing: f64,
	cells: Vec<f64>,
}

impl ProbabilityTable {
	/// Normalizes a count table into a probability table.
	///
	/// Each row (all cells sharing the same leading indices) becomes
	/// `(count + smoothing) / (row_sum + n * smoothing)`.
	///
	/// # Errors
	/// Returns `ModelError::InvalidSmoothing` if `smoothing <= 0`; a
	/// positive smoothing constant is what guarantees non-zero cells and
	/// a well-defined divisor even for rows never observed in the corpus.
	/// Returns `ModelError::EmptyAlphabet` for a table over zero symbols:
	/// an empty table is a configuration error, surfaced eagerly here.
	pub fn from_counts(counts: &CountTable, smoothing: f64) -> Result<Self> {
		if !(smoothing > 0.0) {
			return Err(ModelError::InvalidSmoothing(smoothing));
		}

		let n = counts.n_symbols();
		if n == 0 {
			return Err(ModelError::EmptyAlphabet);
		}
		let raw = counts.cells();
		let mut cells = Vec::with_capacity(raw.len());

		// One row per leading index tuple, n cells each
		for row in raw.chunks(n) {
			let row_sum: u64 = row.iter().sum();
			let divisor = row_sum as f64 + n as f64 * smoothing;
			for &count in row {
				cells.push((count as f64 + smoothing) / divisor);
			}
		}

		Ok(Self {
			order: counts.order(),
			n_symbols: n,
			smoothing,
			cells,
		})
	}

	/// The order of the table.
	pub fn order(&self) -> ModelOrder {
		self.order
	}

	/// The alphabet size the table was built for.
	pub fn n_symbols(&self) -> usize {
		self.n_symbols
	}

	/// The smoothing constant used during normalization.
	pub fn smoothing(&self) -> f64 {
		self.smoothing
	}

	/// Raw cells in row-major order.
	pub fn cells(&self) -> &[f64] {
		&self.cells
	}

	/// `P(b | a)` for an order-1 table.
	pub fn pair(&self, a: usize, b: usize) -> f64 {
		debug_assert_eq!(self.order, ModelOrder::Order1);
		self.cells[a * self.n_symbols + b]
	}

	/// `P(c | a, b)` for an order-2 table.
	pub fn triple(&self, a: usize, b: usize, c: usize) -> f64 {
		debug_assert_eq!(self.order, ModelOrder::Order2);
		self.cells[(a * self.n_symbols + b) * self.n_symbols + c]
	}

	/// Log-transforms the table once for repeated scoring.
	///
	/// Every cell is strictly positive, so the logarithm is always
	/// defined.
	pub fn ln(&self) -> LogProbabilityTable {
		LogProbabilityTable {
			order: self.order,
			n_symbols: self.n_symbols,
			cells: self.cells.iter().map(|p| p.ln()).collect(),
		}
	}
}

/// Log-space transition table, the input to sequence scoring.
///
/// Kept separate from `ProbabilityTable` so the log transform happens once
/// at construction, not on every scoring call.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct LogProbabilityTable {
	order: ModelOrder,
	n_symbols: usize,
	cells: Vec<f64>,
}

impl LogProbabilityTable {
	/// The order of the table.
	pub fn order(&self) -> ModelOrder {
		self.order
	}

	/// The alphabet size the table was built for.
	pub fn n_symbols(&self) -> usize {
		self.n_symbols
	}

	/// Total log-likelihood of an index-sequence.
	///
	/// Order 1 sums `log P(s[i+1] | s[i])` over every adjacent pair;
	/// order 2 sums `log P(s[i+2] | s[i], s[i+1])` over every adjacent
	/// triple. The dispatch is on the order tag fixed at construction.
	///
	/// A sequence too short for a single transition scores exactly `0.0`
	/// (the identity element, not an error). Pure function: total over
	/// every sequence whose indices fall within the table's range.
	pub fn score(&self, sequence: &[usize]) -> f64 {
		let n = self.n_symbols;
		match self.order {
			ModelOrder::Order1 => sequence
				.windows(2)
				.map(|w| self.cells[w[0] * n + w[1]])
				.sum(),
			ModelOrder::Order2 => sequence
				.windows(3)
				.map(|w| self.cells[(w[0] * n + w[1]) * n + w[2]])
				.sum(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::alphabet::Alphabet;

	const TOLERANCE: f64 = 1e-12;

	/// Order-1 table over {a, b, c} built from ["ab", "ab", "ac"].
	fn abc_table() -> ProbabilityTable {
		let alphabet = Alphabet::new("abc");
		let sequences: Vec<Vec<usize>> = ["ab", "ab", "ac"]
			.iter()
			.map(|w| alphabet.encode(w).unwrap())
			.collect();
		CountTable::from_sequences(
			ModelOrder::Order1,
			alphabet.len(),
			sequences.iter().map(Vec::as_slice),
		)
		.normalized(1.0)
		.unwrap()
	}

	#[test]
	fn rows_sum_to_one_and_cells_stay_positive() {
		let table = abc_table();
		for row in table.cells().chunks(table.n_symbols()) {
			let sum: f64 = row.iter().sum();
			assert!((sum - 1.0).abs() < TOLERANCE, "row sums to {}", sum);
			assert!(row.iter().all(|&p| p > 0.0));
		}
	}

	#[test]
	fn observed_transitions_outweigh_unobserved_ones() {
		// counts[a] = [0, 2, 1], so with smoothing 1 the 'a' row is
		// [1/6, 3/6, 2/6]
		let table = abc_table();
		assert!((table.pair(0, 1) - 0.5).abs() < TOLERANCE);
		assert!((table.pair(0, 2) - 2.0 / 6.0).abs() < TOLERANCE);
		assert!((table.pair(0, 0) - 1.0 / 6.0).abs() < TOLERANCE);
		assert!(table.pair(0, 1) > table.pair(0, 2));
		assert!(table.pair(0, 2) > table.pair(0, 0));
	}

	#[test]
	fn plausible_sequences_outscore_implausible_ones() {
		let log_table = abc_table().ln();
		let ab = log_table.score(&[0, 1]);
		let aa = log_table.score(&[0, 0]);
		assert!(ab > aa);
	}

	#[test]
	fn unobserved_rows_normalize_to_uniform() {
		// 'b' and 'c' never start a transition in ["ab", "ab", "ac"]
		let table = abc_table();
		for row in [1, 2] {
			for column in 0..3 {
				assert!((table.pair(row, column) - 1.0 / 3.0).abs() < TOLERANCE);
			}
		}
	}

	#[test]
	fn score_is_the_sum_over_adjacent_pairs() {
		let table = abc_table();
		let log_table = table.ln();
		let expected = table.pair(0, 1).ln() + table.pair(1, 0).ln() + table.pair(0, 2).ln();
		assert!((log_table.score(&[0, 1, 0, 2]) - expected).abs() < TOLERANCE);
	}

	#[test]
	fn sequences_without_transitions_score_zero() {
		let log_table = abc_table().ln();
		assert_eq!(log_table.score(&[]), 0.0);
		assert_eq!(log_table.score(&[2]), 0.0);

		let triples = CountTable::new(ModelOrder::Order2, 3)
			.normalized(1.0)
			.unwrap()
			.ln();
		assert_eq!(triples.score(&[0, 1]), 0.0);
	}

	#[test]
	fn order_2_scoring_sums_adjacent_triples() {
		let alphabet = Alphabet::new("abc");
		let sequences: Vec<Vec<usize>> = ["abc", "abc", "bca"]
			.iter()
			.map(|w| alphabet.encode(w).unwrap())
			.collect();
		let table = CountTable::from_sequences(
			ModelOrder::Order2,
			alphabet.len(),
			sequences.iter().map(Vec::as_slice),
		)
		.normalized(1.0)
		.unwrap();

		let log_table = table.ln();
		let expected = table.triple(0, 1, 2).ln() + table.triple(1, 2, 0).ln();
		assert!((log_table.score(&[0, 1, 2, 0]) - expected).abs() < TOLERANCE);
	}

	#[test]
	fn empty_alphabet_tables_cannot_be_normalized() {
		// An alphabet with no symbols has no rows to normalize; the
		// misconfiguration surfaces as an error, never a panic
		for order in [ModelOrder::Order1, ModelOrder::Order2] {
			assert!(matches!(
				CountTable::new(order, 0).normalized(1.0),
				Err(ModelError::EmptyAlphabet)
			));
		}
	}

	#[test]
	fn non_positive_smoothing_is_rejected() {
		let counts = CountTable::new(ModelOrder::Order1, 3);
		for smoothing in [0.0, -1.0] {
			assert!(matches!(
				counts.normalized(smoothing),
				Err(ModelError::InvalidSmoothing(_))
			));
		}
	}
}
