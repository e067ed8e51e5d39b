//! Letter-transition modeling library.
//!
//! This crate builds a statistical model of letter-adjacency patterns from a
//! word corpus and uses it to:
//! - Score the plausibility of arbitrary letter sequences (log-likelihood)
//! - Repair implausible sequences by targeted insertion or deletion
//! - Sample candidate names from prefix/stem/suffix part lists
//!
//! Only the high-level API is exposed publicly. Low-level components
//! are kept internal to ensure consistency and prevent misuse.

/// Core model types: alphabet codec, count and probability tables,
/// sequence scoring, repair, and candidate sampling.
pub mod model;

/// Error taxonomy shared by every component of the crate.
pub mod error;

/// I/O utilities (wordlist loading, path helpers).
pub mod io;
