use crate::error::{ModelError, Result};
use crate::model::counts::ModelOrder;
use crate::model::probability::{LogProbabilityTable, ProbabilityTable};

/// Default bound on repair rounds when iterating to a fixed point.
pub const DEFAULT_MAX_ROUNDS: usize = 10;

/// Local-search repair of implausible sequences.
///
/// One repair step finds the single worst-scoring adjacent transition of a
/// sequence and replaces it with the best 3-symbol sub-path (one symbol
/// spliced into the worst edge), or removes a symbol when deletions are
/// enabled, keeping the original whenever no candidate scores higher.
///
/// The repair cost model is pairwise, so the engine works on order-1
/// tables only. It precomputes the log table once at construction and is
/// then a pure function over sequences: safe to share across threads and
/// to apply repeatedly.
pub struct RepairEngine {
	n_symbols: usize,
	/// Linear-space transition probabilities, used to locate the worst edge.
	probabilities: Vec<f64>,
	/// Log-space table, used to rank candidates.
	log_table: LogProbabilityTable,
	allow_deletions: bool,
}

impl RepairEngine {
	/// Creates a repair engine over an order-1 probability table.
	///
	/// # Errors
	/// Returns `ModelError::UnsupportedModelOrder` for an order-2 table:
	/// the worst-edge cost model is pairwise, and the mismatch is a
	/// configuration error caught here rather than per call.
	pub fn new(table: &ProbabilityTable, allow_deletions: bool) -> Result<Self> {
		if table.order() != ModelOrder::Order1 {
			return Err(ModelError::UnsupportedModelOrder(table.order().as_usize()));
		}

		Ok(Self {
			n_symbols: table.n_symbols(),
			probabilities: table.cells().to_vec(),
			log_table: table.ln(),
			allow_deletions,
		})
	}

	/// Whether single-symbol deletion candidates are considered.
	pub fn allow_deletions(&self) -> bool {
		self.allow_deletions
	}

	/// Applies one repair step to an index-sequence.
	///
	/// # Algorithm
	/// 1. Sequences shorter than 2 symbols are returned unchanged.
	/// 2. Every adjacent pair is costed with its transition probability;
	///    the minimum (first occurrence on ties) is the worst edge `w`.
	/// 3. Candidates are enumerated in a fixed order: one insertion per
	///    alphabet symbol (symbol `c` spliced between `w` and `w+1`, in
	///    alphabet order), then the unmodified sequence, then (if
	///    deletions are enabled) one candidate per position with that
	///    single symbol removed from the original sequence.
	/// 4. All candidates are scored under the order-1 log table; the
	///    maximum wins, first occurrence on ties.
	///
	/// The no-op candidate guarantees the result never scores below the
	/// input. A repaired sequence is not necessarily a fixed point; call
	/// `repair_until_fixed` to iterate.
	pub fn repair(&self, sequence: &[usize]) -> Vec<usize> {
		if sequence.len() < 2 {
			return sequence.to_vec();
		}

		let n = self.n_symbols;

		// Worst transition, first occurrence on ties
		let mut worst = 0;
		let mut worst_cost = f64::INFINITY;
		for i in 0..sequence.len() - 1 {
			let cost = self.probabilities[sequence[i] * n + sequence[i + 1]];
			if cost < worst_cost {
				worst_cost = cost;
				worst = i;
			}
		}

		let deletions = if self.allow_deletions { sequence.len() } else { 0 };
		let mut candidates = Vec::with_capacity(n + 1 + deletions);

		// One insertion candidate per alphabet symbol, spliced into the
		// worst edge
		for symbol in 0..n {
			let mut candidate = Vec::with_capacity(sequence.len() + 1);
			candidate.extend_from_slice(&sequence[..=worst]);
			candidate.push(symbol);
			candidate.extend_from_slice(&sequence[worst + 1..]);
			candidates.push(candidate);
		}

		// Staying the same is always an option, scored on equal footing
		candidates.push(sequence.to_vec());

		// Each deletion candidate removes one symbol from the original
		// sequence, never from a previous candidate
		if self.allow_deletions {
			for position in 0..sequence.len() {
				let mut candidate = sequence.to_vec();
				candidate.remove(position);
				candidates.push(candidate);
			}
		}

		// Best candidate, first occurrence on ties
		let mut best = 0;
		let mut best_score = f64::NEG_INFINITY;
		for (i, candidate) in candidates.iter().enumerate() {
			let score = self.log_table.score(candidate);
			if score > best_score {
				best_score = score;
				best = i;
			}
		}

		candidates.swap_remove(best)
	}

	/// Repeatedly applies `repair` until the sequence stops changing or
	/// `max_rounds` passes have run, returning the final sequence.
	///
	/// A single step can land on a sequence whose worst edge is already
	/// optimal without being a fixed point of the step itself, so
	/// convergence is detected by comparing consecutive outputs.
	pub fn repair_until_fixed(&self, sequence: &[usize], max_rounds: usize) -> Vec<usize> {
		let mut current = sequence.to_vec();
		for _ in 0..max_rounds {
			let next = self.repair(&current);
			if next == current {
				break;
			}
			current = next;
		}
		current
	}
}
