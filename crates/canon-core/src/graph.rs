//! Sparse graph representation and graph hashing.
//!
//! `SparseGraph` stores one sorted neighbor list per vertex; undirected edges
//! appear at both endpoints. The graph is built once and treated as read-only
//! for the lifetime of a search, so a single graph may back any number of
//! concurrent searches.
//!
//! Two hashes are exposed: the adjacency-bit-vector hash of the graph itself,
//! and the hash of the graph relabeled by a permutation, computed without
//! materializing the relabeled graph.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::perm::Permutation;

/// A vertex index in `[0, n)`.
pub type Vertex = usize;

/// An n-vertex simple undirected graph as sorted adjacency lists.
///
/// Invariants: no self-loops, neighbor lists sorted and duplicate-free, the
/// edge relation symmetric, all indices in `[0, n)`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SparseGraph {
    adjacency: Vec<Vec<Vertex>>,
}

/// The n²-bit adjacency fingerprint of a (relabeled) graph.
///
/// Bit `n·(n−i)−j−1` is set iff the edge (i, j) exists. The derived `Ord`
/// compares the underlying bit vector lexicographically from bit index 0,
/// which is exactly the big-endian bit-sequence order the search maximizes.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GraphHash(Vec<bool>);

impl SparseGraph {
    /// An edge-less graph on `n` vertices.
    pub fn new(n: usize) -> Self {
        SparseGraph {
            adjacency: vec![Vec::new(); n],
        }
    }

    /// Number of vertices.
    pub fn order(&self) -> usize {
        self.adjacency.len()
    }

    /// Insert the undirected edge (u, v). Parallel edges collapse silently.
    ///
    /// `u` and `v` must be distinct and in range; the parsers in the codec
    /// crate validate both before calling.
    pub fn add_edge(&mut self, u: Vertex, v: Vertex) {
        debug_assert_ne!(u, v, "self-loops are not representable");
        Self::insert_sorted(&mut self.adjacency[u], v);
        Self::insert_sorted(&mut self.adjacency[v], u);
    }

    fn insert_sorted(list: &mut Vec<Vertex>, x: Vertex) {
        if let Err(pos) = list.binary_search(&x) {
            list.insert(pos, x);
        }
    }

    /// The sorted neighbor list of `v`.
    pub fn neighbors(&self, v: Vertex) -> &[Vertex] {
        &self.adjacency[v]
    }

    /// Degree of `v`.
    pub fn degree(&self, v: Vertex) -> usize {
        self.adjacency[v].len()
    }

    /// Number of undirected edges.
    pub fn size(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum::<usize>() / 2
    }

    /// `|N(v) ∩ cell|` — the degree of `v` into the vertex set `cell`.
    ///
    /// `cell` need not be sorted: during refinement a worklist range can span
    /// several cells whose concatenation is unsorted. Each membership test is
    /// a binary search in the sorted neighbor list.
    pub fn degree_in(&self, v: Vertex, cell: &[Vertex]) -> usize {
        let nbrs = &self.adjacency[v];
        cell.iter().filter(|w| nbrs.binary_search(w).is_ok()).count()
    }

    /// Whether the edge (u, v) exists.
    pub fn has_edge(&self, u: Vertex, v: Vertex) -> bool {
        self.adjacency[u].binary_search(&v).is_ok()
    }

    /// All undirected edges as ordered pairs (u, v) with u < v.
    pub fn edges(&self) -> impl Iterator<Item = (Vertex, Vertex)> + '_ {
        self.adjacency
            .iter()
            .enumerate()
            .flat_map(|(u, nbrs)| nbrs.iter().filter(move |&&v| u < v).map(move |&v| (u, v)))
    }

    /// The adjacency-bit-vector hash of the graph itself.
    pub fn hash_value(&self) -> GraphHash {
        let n = self.order();
        let mut bits = vec![false; n * n];
        for (i, nbrs) in self.adjacency.iter().enumerate() {
            for &j in nbrs {
                bits[n * (n - i) - j - 1] = true;
            }
        }
        GraphHash(bits)
    }

    /// The adjacency hash the graph would have after relabeling every edge
    /// (i, j) to (perm[i], perm[j]), computed directly from the source edges.
    pub fn permuted_hash(&self, perm: &Permutation) -> GraphHash {
        let n = self.order();
        let mut bits = vec![false; n * n];
        for (i, nbrs) in self.adjacency.iter().enumerate() {
            for &j in nbrs {
                bits[n * (n - perm.image(i)) - perm.image(j) - 1] = true;
            }
        }
        GraphHash(bits)
    }

    /// Materialize the relabeled graph: edge (i, j) becomes
    /// (perm[i], perm[j]).
    ///
    /// `relabel(p).hash_value() == permuted_hash(p)` for every permutation on
    /// the graph's vertex set.
    pub fn relabel(&self, perm: &Permutation) -> SparseGraph {
        let mut out = SparseGraph::new(self.order());
        for (u, v) in self.edges() {
            out.add_edge(perm.image(u), perm.image(v));
        }
        out
    }
}

impl fmt::Display for SparseGraph {
    /// One `v : neighbors` line per vertex.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (v, nbrs) in self.adjacency.iter().enumerate() {
            write!(f, "{} :", v)?;
            for w in nbrs {
                write!(f, " {}", w)?;
            }
            writeln!(f, ".")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path3() -> SparseGraph {
        let mut g = SparseGraph::new(3);
        g.add_edge(0, 1);
        g.add_edge(1, 2);
        g
    }

    #[test]
    fn neighbor_lists_stay_sorted_and_deduped() {
        let mut g = SparseGraph::new(4);
        g.add_edge(2, 0);
        g.add_edge(2, 3);
        g.add_edge(2, 1);
        g.add_edge(2, 3);
        assert_eq!(g.neighbors(2), &[0, 1, 3]);
        assert_eq!(g.degree(2), 3);
        assert_eq!(g.size(), 3);
    }

    #[test]
    fn edges_are_symmetric() {
        let g = path3();
        assert!(g.has_edge(0, 1) && g.has_edge(1, 0));
        assert!(!g.has_edge(0, 2));
        assert_eq!(g.edges().collect::<Vec<_>>(), vec![(0, 1), (1, 2)]);
    }

    #[test]
    fn degree_in_handles_unsorted_cells() {
        let g = path3();
        assert_eq!(g.degree_in(1, &[2, 0]), 2);
        assert_eq!(g.degree_in(0, &[2]), 0);
        assert_eq!(g.degree_in(0, &[]), 0);
    }

    #[test]
    fn hash_sets_expected_bits() {
        // Single edge (0, 1) on n = 2: arcs (0,1) and (1,0) set bits
        // 2·(2−0)−1−1 = 2 and 2·(2−1)−0−1 = 1.
        let mut g = SparseGraph::new(2);
        g.add_edge(0, 1);
        assert_eq!(g.hash_value(), GraphHash(vec![false, true, true, false]));
    }

    #[test]
    fn identity_permuted_hash_matches_plain_hash() {
        let g = path3();
        let id = Permutation::identity(3);
        assert_eq!(g.permuted_hash(&id), g.hash_value());
    }

    #[test]
    fn relabel_agrees_with_permuted_hash() {
        let g = path3();
        let p = Permutation::from_images(vec![2, 0, 1]);
        assert_eq!(g.relabel(&p).hash_value(), g.permuted_hash(&p));
    }

    #[test]
    fn hash_distinguishes_nonisomorphic_labelings() {
        let mut a = SparseGraph::new(3);
        a.add_edge(0, 1);
        let mut b = SparseGraph::new(3);
        b.add_edge(1, 2);
        assert_ne!(a.hash_value(), b.hash_value());
    }

    #[test]
    fn display_prints_adjacency_lists() {
        assert_eq!(path3().to_string(), "0 : 1.\n1 : 0 2.\n2 : 1.\n");
    }
}
