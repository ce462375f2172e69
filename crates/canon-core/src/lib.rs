//! canon-core — canonical labeling and isomorphism testing for simple
//! undirected graphs, in the individualization-refinement family of
//! nauty/Traces.
//!
//! # Overview
//!
//! Canonicalizing a graph means picking one concrete relabeling of its
//! vertices such that any two isomorphic graphs relabel to the same result.
//! The engine searches a tree of ordered partitions: the root is the
//! equitable refinement of the unit (or a caller-supplied) partition, each
//! interior node branches by individualizing every vertex of a target cell,
//! and each leaf is a discrete partition, i.e. a vertex ordering. The leaf
//! whose permuted-graph hash is lexicographically greatest is the canonical
//! form, and equivalent leaves met along the way yield generators of the
//! automorphism group.
//!
//! # Quick start
//!
//! ```rust
//! use canon_core::{canonicalize, isomorphic, Options, SparseGraph};
//!
//! // A 5-cycle and one of its relabelings.
//! let mut c5 = SparseGraph::new(5);
//! for i in 0..5 {
//!     c5.add_edge(i, (i + 1) % 5);
//! }
//! let mut other = SparseGraph::new(5);
//! for (u, v) in [(2, 4), (4, 1), (1, 3), (3, 0), (0, 2)] {
//!     other.add_edge(u, v);
//! }
//!
//! let options = Options::default();
//! assert!(isomorphic(&c5, &other, &options)?);
//!
//! let canonical = canonicalize(&c5, &options)?;
//! assert!(!canonical.generators.is_empty()); // C5 has nontrivial symmetry
//! # Ok::<(), canon_core::CanonError>(())
//! ```
//!
//! # Determinism and sharing
//!
//! A search is single-threaded, never suspends, and is fully deterministic
//! for a given graph and options. The [`SparseGraph`] is read-only during a
//! search and may back any number of concurrent searches; all other state is
//! owned by the search itself.

pub mod error;
pub mod graph;
pub mod partition;
pub mod perm;
pub mod search;
pub mod stats;

pub use error::CanonError;
pub use graph::{GraphHash, SparseGraph, Vertex};
pub use partition::{CellRef, Invariant, Partition, TargetCellMethod};
pub use perm::{fixing_generators, min_cell_representatives, Permutation};
pub use search::{
    canonicalize, isomorphic, Canonical, InvariantMethod, Leaf, LeafBacktrack, Options,
};
pub use stats::Statistics;
