//! Top-level module for the letter-transition modeling system.
//!
//! This module provides the full scoring and repair pipeline, including:
//! - A fixed symbol/index bijection (`Alphabet`)
//! - Dense transition count tables (`CountTable`)
//! - Row-stochastic probability tables (`ProbabilityTable`)
//! - Log-likelihood scoring (`LogProbabilityTable`)
//! - Local-search sequence repair (`RepairEngine`)
//! - A high-level corpus-backed model (`LetterModel`)

/// Fixed bijection between symbols and dense indices, plus the
/// string ↔ index-sequence codec.
pub mod alphabet;

/// Order-1 and order-2 transition count accumulation.
///
/// Handles sequence ingestion, cell-wise merging for parallel builds,
/// and normalization into probability tables.
pub mod counts;

/// Row-stochastic probability tables with additive smoothing, their
/// log-space counterparts, and sequence scoring.
pub mod probability;

/// Local-search repair of implausible sequences.
///
/// Replaces the single worst-scoring transition with the best insertion
/// (or deletion) candidate, with a convergence helper for repeated passes.
pub mod repair;

/// Cartesian-product candidate name sampling with an injected RNG.
pub mod sampler;

/// High-level corpus-backed model tying the pipeline together.
///
/// Supports load-or-build with a binary cache, parallel counting,
/// scoring, repair, and transition reporting.
pub mod letter_model;
