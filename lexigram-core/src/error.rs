use thiserror::Error;

/// Convenient result type used throughout the crate.
pub type Result<T, E = ModelError> = std::result::Result<T, E>;

/// Errors produced while building or querying a letter-transition model.
///
/// All failures are local and synchronous: every operation in the crate is
/// deterministic, so callers are not expected to retry.
#[derive(Debug, Error)]
pub enum ModelError {
	/// A character outside the configured alphabet was presented to the codec.
	#[error("unsupported symbol '{0}': not part of the model alphabet")]
	UnsupportedSymbol(char),

	/// A model order other than 1 (pairwise) or 2 (triples) was requested.
	#[error("unsupported model order {0}: only orders 1 and 2 are available")]
	UnsupportedModelOrder(usize),

	/// A symbol index does not fit the alphabet it is decoded against.
	#[error("symbol index {index} out of range for an alphabet of {size} symbols")]
	IndexOutOfRange { index: usize, size: usize },

	/// The smoothing constant must be strictly positive so that every
	/// transition keeps a non-zero probability.
	#[error("smoothing must be strictly positive, got {0}")]
	InvalidSmoothing(f64),

	/// Two tables with different orders or alphabet sizes cannot be combined.
	#[error(
		"table shape mismatch: order {left_order} over {left_symbols} symbols \
		 vs order {right_order} over {right_symbols} symbols"
	)]
	ShapeMismatch {
		left_order: usize,
		left_symbols: usize,
		right_order: usize,
		right_symbols: usize,
	},

	/// A table was built over an alphabet with no symbols; there is no
	/// row to normalize, so this is caught before any probability math.
	#[error("empty alphabet: a probability table needs at least one symbol")]
	EmptyAlphabet,

	/// Underlying filesystem failure while reading or writing model data.
	#[error("io error: {0}")]
	Io(#[from] std::io::Error),

	/// Serialization or deserialization of a cached model failed.
	#[error("model codec error: {0}")]
	Codec(#[from] postcard::Error),
}
