//! Error types for partition and search operations

use thiserror::Error;

/// Fatal conditions that abort a canonicalization.
///
/// Construction errors (`EmptyPartition`, `BadInitialPartition`) are caller
/// mistakes; the remaining variants are internal-consistency violations the
/// engine reports instead of continuing with corrupt state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CanonError {
    /// A partition must contain at least one vertex.
    #[error("partition must contain at least one vertex")]
    EmptyPartition,

    /// A caller-supplied initial partition must cover {0,…,n−1} exactly once.
    #[error("initial partition is not an exact cover of 0..{n}: {reason}")]
    BadInitialPartition { n: usize, reason: String },

    /// Target-cell selection requires at least one non-singleton cell.
    #[error("no target cell can be selected from a discrete partition")]
    DiscreteTargetCell,

    /// Individualization requires the vertex to sit in a non-singleton cell.
    #[error("cannot individualize vertex {vertex}: its cell is a singleton")]
    SingletonSplit { vertex: usize },

    /// The root partition (level 1) has no predecessor to reconstruct.
    #[error("cannot reconstruct the partition at level 0")]
    ReconstructAtRoot,

    /// The refinement log does not reach the requested level.
    #[error("refinement log holds {have} levels, cannot reconstruct at level {want}")]
    RefinementLogMismatch { have: usize, want: usize },

    /// The backtrack log named a merge range that runs past the last cell.
    #[error("refinement log entry at offset {first} does not close at level {level}")]
    CorruptRefinementLog { first: usize, level: usize },

    /// The per-level invariant ledger must have length `level − 1` when a
    /// new level's invariant is first recorded.
    #[error("invariant ledger has length {have} when extending at level {level}")]
    InvariantLedgerSkew { have: usize, level: usize },

    /// Only a discrete partition corresponds to a permutation.
    #[error("partition is not discrete and has no associated permutation")]
    NotDiscrete,

    /// Two leaves with identical vertex sequences have no proper common
    /// ancestor; the search never produces the same leaf twice.
    #[error("leaf vertex sequences are identical; no common-ancestor level")]
    EqualLeafSequences,

    /// The traversal terminated without visiting a single leaf. The first
    /// descent always reaches one, so this indicates corrupted search state.
    #[error("search terminated without reaching a leaf")]
    SearchExhausted,
}
