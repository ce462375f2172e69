//! The canonicalization search: an iterative depth-first traversal of the
//! individualization-refinement tree.
//!
//! Each tree node is an equitable ordered partition; branching individualizes
//! every vertex of a chosen target cell in turn; leaves are discrete
//! partitions, i.e. vertex orderings. The search keeps the leaf whose
//! permuted-graph hash is lexicographically greatest — that hash is the
//! canonical form — and every pair of equivalent leaves yields an
//! automorphism generator.
//!
//! Three pruning devices keep the tree tractable:
//!
//! - **Node invariants** (pruning method Pa): a per-level ledger of the
//!   greatest invariant seen; children with smaller invariants cannot lead to
//!   the canonical leaf and are cut. Leaves carry a sentinel greater than any
//!   interior invariant, so a leaf is never cut here.
//! - **Orbit pruning**: on re-entry to a node, unexplored siblings are
//!   intersected with the minimum cell representatives of the generators
//!   fixing the current branch sequence; siblings in an already-explored
//!   orbit are dropped.
//! - **Implicit automorphisms** (opt-in): cell-count conditions under which
//!   all children of a node are provably equivalent, so only the first is
//!   kept.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::time::Instant;

use crate::error::CanonError;
use crate::graph::{GraphHash, SparseGraph, Vertex};
use crate::partition::{Invariant, Partition, TargetCellMethod};
use crate::perm::{min_cell_representatives, Permutation};
use crate::stats::Statistics;

/// Which node invariant prunes the search.
///
/// Any choice other than `None` yields the same canonical form for a given
/// target-cell method; the invariant only decides how much of the tree is
/// visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvariantMethod {
    /// No invariant pruning.
    None,
    /// Cell lengths in partition order.
    Shape,
    /// Splitter sizes recorded during the refinement reaching the node.
    Refinement,
    /// Number of cells.
    NumCells,
}

/// How far to backtrack after a leaf produced an automorphism.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeafBacktrack {
    /// One level up, to the leaf's parent.
    OneLevel,
    /// To the greatest common ancestor of the equivalent leaves' branch
    /// sequences.
    CommonAncestor,
}

/// Tunable parameters of a search. Different options can produce different
/// (equally valid) canonical forms; isomorphism verdicts require identical
/// options on both sides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Options {
    /// Node invariant used for pruning.
    pub invariant: InvariantMethod,
    /// Target-cell selector.
    pub target_cell: TargetCellMethod,
    /// Selector used instead of `target_cell` at levels below
    /// `strong_tc_below_level`.
    pub strong_target_cell: TargetCellMethod,
    /// Levels strictly below this threshold use the strong selector
    /// (0 disables it).
    pub strong_tc_below_level: usize,
    /// Enable the implicit-automorphism sibling shortcut.
    pub use_implicit: bool,
    /// Backtrack policy after automorphism leaves.
    pub leaf_backtrack: LeafBacktrack,
    /// Suppress invariant pruning until the first root-to-leaf path has been
    /// fully explored.
    pub explore_first_path: bool,
    /// Initial partition as a cell list; `None` means the unit partition.
    pub initial_partition: Option<Vec<Vec<Vertex>>>,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            invariant: InvariantMethod::Shape,
            target_cell: TargetCellMethod::First,
            strong_target_cell: TargetCellMethod::Joins,
            strong_tc_below_level: 0,
            use_implicit: false,
            leaf_backtrack: LeafBacktrack::OneLevel,
            explore_first_path: false,
            initial_partition: None,
        }
    }
}

/// A visited leaf: the branch that reached it, the vertex ordering its
/// discrete partition denotes, and the graph hash under that ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leaf {
    /// Individualized vertices on the root-to-leaf path.
    pub sequence: Vec<Vertex>,
    /// Vertex `i` maps to its offset in the discrete partition.
    pub perm: Permutation,
    /// Permuted-graph hash under `perm`.
    pub hash: GraphHash,
}

/// The result of a canonicalization run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Canonical {
    /// The best leaf; its hash is the canonical form.
    pub leaf: Leaf,
    /// Automorphism generators discovered along the way.
    pub generators: Vec<Permutation>,
    /// Run counters.
    pub stats: Statistics,
}

impl Canonical {
    /// The canonical form: the permuted-graph hash of the best leaf.
    pub fn hash(&self) -> &GraphHash {
        &self.leaf.hash
    }
}

/// Compute the canonical form and automorphism generators of `graph`.
pub fn canonicalize(graph: &SparseGraph, options: &Options) -> Result<Canonical, CanonError> {
    Search::new(graph, options)?.run()
}

/// Whether `a` and `b` are isomorphic: equal canonical forms under the same
/// options.
pub fn isomorphic(
    a: &SparseGraph,
    b: &SparseGraph,
    options: &Options,
) -> Result<bool, CanonError> {
    if a.order() != b.order() {
        return Ok(false);
    }
    let ca = canonicalize(a, options)?;
    let cb = canonicalize(b, options)?;
    Ok(ca.hash() == cb.hash())
}

/// The leaf invariant: strictly greater than every attainable interior
/// invariant (whose components are all ≤ n).
fn leaf_sentinel() -> Invariant {
    vec![u32::MAX]
}

/// The level of the greatest common ancestor of two distinct branch
/// sequences: the length of their agreeing prefix plus one.
fn gca_level(a: &[Vertex], b: &[Vertex]) -> Result<usize, CanonError> {
    for (i, (x, y)) in a.iter().zip(b.iter()).enumerate() {
        if x != y {
            return Ok(i + 1);
        }
    }
    Err(CanonError::EqualLeafSequences)
}

/// Intersection of two ascending vertex lists.
fn sorted_intersection(a: &[Vertex], b: &[Vertex]) -> Vec<Vertex> {
    let mut out = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                out.push(a[i]);
                i += 1;
                j += 1;
            }
        }
    }
    out
}

/// All mutable state of one traversal.
struct Search<'a> {
    graph: &'a SparseGraph,
    opt: &'a Options,
    partition: Partition,
    level: usize,
    unbranched: Vec<Vec<Vertex>>,
    sequence: Vec<Vertex>,
    first_leaf: Option<Leaf>,
    best_leaf: Option<Leaf>,
    generators: Vec<Permutation>,
    max_invar: Vec<Invariant>,
    best_leaf_outdated: bool,
    first_path_started: bool,
    first_path_explored: bool,
    stats: Statistics,
}

impl<'a> Search<'a> {
    fn new(graph: &'a SparseGraph, opt: &'a Options) -> Result<Self, CanonError> {
        let mut partition = match &opt.initial_partition {
            Some(cells) => {
                let partition = Partition::from_cells(cells)?;
                if partition.size() != graph.order() {
                    return Err(CanonError::BadInitialPartition {
                        n: graph.order(),
                        reason: format!("partition covers {} vertices", partition.size()),
                    });
                }
                partition
            }
            None => Partition::unit(graph.order())?,
        };
        partition.set_collect_ref_invar(opt.invariant == InvariantMethod::Refinement);

        let mut stats = Statistics::default();
        partition.refine(graph);
        stats.refinements = 1;
        stats.max_level = 1;

        Ok(Search {
            graph,
            opt,
            partition,
            level: 1,
            unbranched: Vec::new(),
            sequence: Vec::new(),
            first_leaf: None,
            best_leaf: None,
            generators: Vec::new(),
            max_invar: Vec::new(),
            best_leaf_outdated: false,
            first_path_started: false,
            first_path_explored: false,
            stats,
        })
    }

    fn run(mut self) -> Result<Canonical, CanonError> {
        let started = Instant::now();
        while self.level >= 1 {
            if self.level > self.stats.max_level {
                self.stats.max_level = self.level;
            }
            if self.partition.is_discrete() {
                self.stats.leaves_visited += 1;
                self.process_leaf()?;
            } else {
                self.process_node()?;
            }
        }
        self.stats.duration = started.elapsed();

        match self.best_leaf {
            Some(leaf) => Ok(Canonical {
                leaf,
                generators: self.generators,
                stats: self.stats,
            }),
            // The first loop iteration always reaches a leaf before the
            // level can drop to zero.
            None => Err(CanonError::SearchExhausted),
        }
    }

    /// Handle an interior node: establish or prune its child list, then
    /// branch on the smallest remaining child.
    fn process_node(&mut self) -> Result<(), CanonError> {
        // The root is revisited once per top-level child; the second visit
        // means the first root-to-leaf path is complete.
        if self.level == 1 && self.opt.explore_first_path {
            if self.first_path_started {
                self.first_path_explored = true;
            } else {
                self.first_path_started = true;
            }
        }

        if self.unbranched.len() < self.level {
            // First visit: select the target cell and record its vertices as
            // the children of this node.
            let method = if self.level < self.opt.strong_tc_below_level {
                self.opt.strong_target_cell
            } else {
                self.opt.target_cell
            };
            let cell = self.partition.target_cell(self.graph, method)?;
            self.stats.target_cells_selected += 1;
            let mut children = self.partition.cell_members(cell).to_vec();
            if self.opt.use_implicit && self.implicit_shortcut_applies() {
                self.stats.pruned_by_implicit += (children.len() - 1) as u64;
                children.truncate(1);
            }
            self.unbranched.push(children);
        } else if !self.generators.is_empty() {
            // Re-entry: drop siblings in orbits already explored. Both lists
            // are ascending, so a sorted-merge intersection applies.
            let reps =
                min_cell_representatives(&self.generators, &self.sequence, self.graph.order());
            let current = &mut self.unbranched[self.level - 1];
            let kept = sorted_intersection(current, &reps);
            self.stats.pruned_by_automorphism += (current.len() - kept.len()) as u64;
            *current = kept;
        }

        if self.unbranched[self.level - 1].is_empty() {
            return self.backtrack_to(self.level - 1);
        }
        let child = self.unbranched[self.level - 1].remove(0);
        self.sequence.push(child);
        self.partition.individualize_and_refine(self.graph, child)?;
        self.stats.refinements += 1;
        self.prune_by_invariant()
    }

    /// All children of the current node are equivalent under automorphisms
    /// implied by the partition's cell structure when the vertex count is
    /// close enough to the cell count (p cells, m of them non-singleton).
    fn implicit_shortcut_applies(&self) -> bool {
        let n = self.graph.order();
        let p = self.partition.num_cells();
        let m = self.partition.num_nonsingleton_cells();
        n <= p + 4 || n == p + m || n == p + m + 1
    }

    /// Compare the freshly created child against the per-level invariant
    /// ledger; advance into it or undo the split.
    fn prune_by_invariant(&mut self) -> Result<(), CanonError> {
        let invar = match (self.partition.is_discrete(), self.opt.invariant) {
            (_, InvariantMethod::None) => {
                self.level += 1;
                return Ok(());
            }
            (true, _) => leaf_sentinel(),
            (false, InvariantMethod::Shape) => self.partition.shape_invariant(),
            (false, InvariantMethod::Refinement) => self.partition.ref_invariant().clone(),
            (false, InvariantMethod::NumCells) => vec![self.partition.num_cells() as u32],
        };

        if self.max_invar.len() < self.level {
            if self.max_invar.len() != self.level - 1 {
                return Err(CanonError::InvariantLedgerSkew {
                    have: self.max_invar.len(),
                    level: self.level,
                });
            }
            self.max_invar.push(invar);
            self.level += 1;
            return Ok(());
        }

        match invar.cmp(&self.max_invar[self.level - 1]) {
            Ordering::Equal => {
                self.level += 1;
            }
            Ordering::Greater => {
                // Everything recorded below this level chased a smaller
                // invariant; the ledger beyond it is void and the stored
                // best leaf must yield to the next one found.
                self.max_invar[self.level - 1] = invar;
                self.max_invar.truncate(self.level);
                self.best_leaf_outdated = true;
                self.level += 1;
            }
            Ordering::Less => {
                if self.opt.explore_first_path && !self.first_path_explored {
                    self.level += 1;
                } else {
                    self.partition.reconstruct_at_level(self.level)?;
                    self.sequence.pop();
                    self.stats.pruned_by_invariant += 1;
                }
            }
        }
        Ok(())
    }

    /// Handle a discrete partition: record, compare, or derive an
    /// automorphism, then backtrack.
    fn process_leaf(&mut self) -> Result<(), CanonError> {
        let perm = self.partition.to_permutation()?;
        let hash = self.graph.permuted_hash(&perm);
        let leaf = Leaf {
            sequence: self.sequence.clone(),
            perm,
            hash,
        };

        let (first, best) = match (self.first_leaf.clone(), self.best_leaf.clone()) {
            (Some(first), Some(best)) => (first, best),
            _ => {
                self.first_leaf = Some(leaf.clone());
                self.best_leaf = Some(leaf);
                return self.backtrack_to(self.level - 1);
            }
        };

        if self.best_leaf_outdated || leaf.hash > best.hash {
            self.stats.best_leaf_updates += 1;
            self.best_leaf_outdated = false;
            self.best_leaf = Some(leaf);
            return self.backtrack_to(self.level - 1);
        }
        if leaf.hash == first.hash {
            return self.automorphism_leaf(&first, leaf);
        }
        if leaf.hash == best.hash {
            return self.automorphism_leaf(&best, leaf);
        }
        self.stats.bad_leaves += 1;
        self.backtrack_to(self.level - 1)
    }

    /// The current leaf is equivalent to a stored one: their orderings
    /// compose to an automorphism of the graph.
    fn automorphism_leaf(&mut self, anchor: &Leaf, leaf: Leaf) -> Result<(), CanonError> {
        let generator = anchor.perm.compose(&leaf.perm.inverse());
        let target = match self.opt.leaf_backtrack {
            LeafBacktrack::OneLevel => self.level - 1,
            LeafBacktrack::CommonAncestor => gca_level(&anchor.sequence, &leaf.sequence)?,
        };
        self.generators.push(generator);
        self.stats.automorphisms_found += 1;
        self.backtrack_to(target)
    }

    fn backtrack_to(&mut self, target: usize) -> Result<(), CanonError> {
        self.stats.backtracks += 1;
        if target == 0 {
            self.level = 0;
            return Ok(());
        }
        self.partition.reconstruct_at_level(target)?;
        self.sequence.truncate(target - 1);
        self.unbranched.truncate(target);
        self.level = target;
        Ok(())
    }
}
