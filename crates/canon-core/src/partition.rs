//! The ordered partition: equitable refinement, individualization, target
//! cell selection, and level-indexed backtracking.
//!
//! An ordered partition of `{0, …, n−1}` is a sequence of disjoint nonempty
//! cells covering every vertex. The physical layout follows the classical
//! scheme of Junttila & Kaski: one flat `elements` array in which cells
//! occupy contiguous ranges, a keyed collection of cell descriptors, a
//! per-vertex handle to its cell, and a separate ordered view of the
//! non-singleton cells.
//!
//! Cell descriptors live in a `BTreeMap<usize, CellInfo>` keyed by the cell's
//! `first` offset. A cell's `first` never changes while the cell exists
//! (splits create new descriptors, merges keep the leading one), so the key
//! doubles as a stable handle and the map's key order is exactly the
//! partition order. `cell_of[v]` stores the `first` of the cell containing v.
//!
//! Backtracking uses a compact log: each level owns a stack of the `first`
//! offsets of cells split while producing the next level, and the *last*
//! piece of every split inherits the split cell's `in_level`. Merging from a
//! logged offset through the first cell with `in_level ≤ k` reconstitutes the
//! level-k cell covering that position; sorting the merged range restores the
//! canonical within-cell order.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fmt;

use crate::error::CanonError;
use crate::graph::{SparseGraph, Vertex};
use crate::perm::Permutation;

/// A node invariant: a vector of non-negative integers compared
/// lexicographically.
pub type Invariant = Vec<u32>;

/// How `Partition::target_cell` chooses the cell to individualize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetCellMethod {
    /// The leftmost non-singleton cell.
    First,
    /// The leftmost non-singleton cell of minimum length.
    FirstSmallest,
    /// The non-singleton cell non-trivially joined to the most other
    /// non-singleton cells; falls back to the leftmost when no non-trivial
    /// joins exist.
    Joins,
}

/// Descriptor payload for one cell; the cell's `first` offset is its key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct CellInfo {
    len: usize,
    in_level: usize,
}

/// A by-value reference to a cell, valid until the next refinement,
/// individualization, or reconstruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRef {
    /// Offset of the cell's slice in `elements`.
    pub first: usize,
    /// Number of vertices in the cell.
    pub len: usize,
    pub(crate) in_level: usize,
}

/// An ordered partition with refinement history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partition {
    elements: Vec<Vertex>,
    cells: BTreeMap<usize, CellInfo>,
    cell_of: Vec<usize>,
    nonsingleton: BTreeSet<usize>,
    level: usize,
    refinement_log: Vec<Vec<usize>>,
    collect_ref_invar: bool,
    ref_invar: Invariant,
}

impl Partition {
    /// The unit partition: a single cell holding all of `{0, …, n−1}`.
    pub fn unit(n: usize) -> Result<Self, CanonError> {
        if n == 0 {
            return Err(CanonError::EmptyPartition);
        }
        let mut cells = BTreeMap::new();
        cells.insert(0, CellInfo { len: n, in_level: 1 });
        let mut nonsingleton = BTreeSet::new();
        if n > 1 {
            nonsingleton.insert(0);
        }
        Ok(Partition {
            elements: (0..n).collect(),
            cells,
            cell_of: vec![0; n],
            nonsingleton,
            level: 0,
            refinement_log: Vec::new(),
            collect_ref_invar: false,
            ref_invar: Vec::new(),
        })
    }

    /// Build from an explicit cell list, which must cover `{0, …, n−1}`
    /// exactly once (n being the total number of listed vertices).
    pub fn from_cells(cell_list: &[Vec<Vertex>]) -> Result<Self, CanonError> {
        let n: usize = cell_list.iter().map(Vec::len).sum();
        if n == 0 {
            return Err(CanonError::EmptyPartition);
        }
        let bad = |reason: &str| CanonError::BadInitialPartition {
            n,
            reason: reason.to_string(),
        };
        let mut elements = Vec::with_capacity(n);
        let mut cells = BTreeMap::new();
        let mut cell_of = vec![usize::MAX; n];
        let mut nonsingleton = BTreeSet::new();
        let mut first = 0;
        for cell in cell_list {
            if cell.is_empty() {
                return Err(bad("empty cell"));
            }
            cells.insert(
                first,
                CellInfo {
                    len: cell.len(),
                    in_level: 1,
                },
            );
            if cell.len() > 1 {
                nonsingleton.insert(first);
            }
            for &v in cell {
                if v >= n {
                    return Err(bad("vertex out of range"));
                }
                if cell_of[v] != usize::MAX {
                    return Err(bad("vertex listed twice"));
                }
                cell_of[v] = first;
                elements.push(v);
            }
            first += cell.len();
        }
        Ok(Partition {
            elements,
            cells,
            cell_of,
            nonsingleton,
            level: 0,
            refinement_log: Vec::new(),
            collect_ref_invar: false,
            ref_invar: Vec::new(),
        })
    }

    /// Number of vertices.
    pub fn size(&self) -> usize {
        self.elements.len()
    }

    /// Number of cells.
    pub fn num_cells(&self) -> usize {
        self.cells.len()
    }

    /// Number of cells with more than one vertex.
    pub fn num_nonsingleton_cells(&self) -> usize {
        self.nonsingleton.len()
    }

    /// Whether every cell is a singleton.
    pub fn is_discrete(&self) -> bool {
        self.nonsingleton.is_empty()
    }

    /// The search-tree level this partition represents (0 before the first
    /// refinement, 1 at the root).
    pub fn level(&self) -> usize {
        self.level
    }

    /// The cell containing `v`.
    pub fn cell_containing(&self, v: Vertex) -> CellRef {
        self.cell_ref(self.cell_of[v])
    }

    /// The vertices of `cell`, in sorted order.
    pub fn cell_members(&self, cell: CellRef) -> &[Vertex] {
        &self.elements[cell.first..cell.first + cell.len]
    }

    /// All cells in partition order.
    pub fn iter_cells(&self) -> impl Iterator<Item = CellRef> + '_ {
        self.cells.iter().map(|(&first, info)| CellRef {
            first,
            len: info.len,
            in_level: info.in_level,
        })
    }

    fn cell_ref(&self, first: usize) -> CellRef {
        let info = self.cells[&first];
        CellRef {
            first,
            len: info.len,
            in_level: info.in_level,
        }
    }

    /// Enable or disable collection of the refinement invariant.
    pub fn set_collect_ref_invar(&mut self, enabled: bool) {
        self.collect_ref_invar = enabled;
    }

    /// The refinement invariant accumulated by the most recent
    /// individualize-and-refine (empty unless collection is enabled).
    pub fn ref_invariant(&self) -> &Invariant {
        &self.ref_invar
    }

    /// The sequence of cell lengths, in partition order.
    pub fn shape_invariant(&self) -> Invariant {
        self.cells.values().map(|info| info.len as u32).collect()
    }

    /// The permutation a discrete partition denotes: vertex `i` maps to the
    /// offset of `i` in `elements`.
    pub fn to_permutation(&self) -> Result<Permutation, CanonError> {
        if !self.is_discrete() {
            return Err(CanonError::NotDiscrete);
        }
        Ok(Permutation::from_images(self.cell_of.clone()))
    }

    // ------------------------------------------------------------------
    // Refinement
    // ------------------------------------------------------------------

    /// Refine to the coarsest equitable partition with respect to `graph`,
    /// starting from a worklist of all cells. Increments the level.
    pub fn refine(&mut self, graph: &SparseGraph) {
        let worklist = self
            .cells
            .iter()
            .map(|(&first, info)| CellRef {
                first,
                len: info.len,
                in_level: info.in_level,
            })
            .collect();
        self.refine_with(graph, worklist);
    }

    /// Individualize `v` (split its cell into {v} and the rest) and refine
    /// with {v} as the initial splitter. Increments the level and opens a new
    /// refinement-log stack for it.
    pub fn individualize_and_refine(
        &mut self,
        graph: &SparseGraph,
        v: Vertex,
    ) -> Result<(), CanonError> {
        let first = self.cell_of[v];
        let info = self.cells[&first];
        if info.len == 1 {
            return Err(CanonError::SingletonSplit { vertex: v });
        }

        // Rotate v to the front of its cell's slice; the remainder keeps its
        // sorted order.
        let slice = &mut self.elements[first..first + info.len];
        if let Some(pos) = slice.iter().position(|&x| x == v) {
            slice[..=pos].rotate_right(1);
        }

        self.cells.insert(
            first,
            CellInfo {
                len: 1,
                in_level: self.level + 1,
            },
        );
        self.cells.insert(
            first + 1,
            CellInfo {
                len: info.len - 1,
                in_level: info.in_level,
            },
        );
        self.cell_of[v] = first;
        for &x in &self.elements[first + 1..first + info.len] {
            self.cell_of[x] = first + 1;
        }
        self.nonsingleton.remove(&first);
        if info.len - 1 > 1 {
            self.nonsingleton.insert(first + 1);
        }

        self.refinement_log.push(vec![first]);
        if self.collect_ref_invar {
            self.ref_invar.clear();
            self.ref_invar.push(info.len as u32);
        }

        let worklist = VecDeque::from([CellRef {
            first,
            len: 1,
            in_level: self.level + 1,
        }]);
        self.refine_with(graph, worklist);
        Ok(())
    }

    /// Worklist refinement. Entries are by-value cell snapshots; an entry
    /// matches a live cell only while all three fields agree, exactly as the
    /// source algorithm matches queued descriptors by value.
    fn refine_with(&mut self, graph: &SparseGraph, mut worklist: VecDeque<CellRef>) {
        while !self.is_discrete() {
            let w0 = match worklist.pop_front() {
                Some(cell) => cell,
                None => break,
            };
            let splitter: Vec<Vertex> = self.elements[w0.first..w0.first + w0.len].to_vec();

            // Non-singleton cells present when this splitter is processed;
            // pieces created below are only examined by later splitters.
            let targets: Vec<usize> = self.nonsingleton.iter().copied().collect();
            for first in targets {
                let info = self.cells[&first];
                let members = self.elements[first..first + info.len].to_vec();
                let classes = degree_classes(graph, &members, &splitter);
                if classes.len() == 1 {
                    continue;
                }

                let key = CellRef {
                    first,
                    len: info.len,
                    in_level: info.in_level,
                };
                let queued_at = worklist.iter().position(|k| *k == key);
                let mut largest = 0;
                for (i, class) in classes.iter().enumerate() {
                    if class.len() > classes[largest].len() {
                        largest = i;
                    }
                }

                // Replace the cell by its degree classes, ascending.
                self.nonsingleton.remove(&first);
                let mut off = first;
                let mut pieces: Vec<CellRef> = Vec::with_capacity(classes.len());
                for class in &classes {
                    self.cells.insert(
                        off,
                        CellInfo {
                            len: class.len(),
                            in_level: self.level + 1,
                        },
                    );
                    self.elements[off..off + class.len()].copy_from_slice(class);
                    for &x in class {
                        self.cell_of[x] = off;
                    }
                    if class.len() > 1 {
                        self.nonsingleton.insert(off);
                    }
                    pieces.push(CellRef {
                        first: off,
                        len: class.len(),
                        in_level: self.level + 1,
                    });
                    if self.collect_ref_invar && self.level > 0 {
                        self.ref_invar.push(class.len() as u32);
                    }
                    off += class.len();
                }

                match queued_at {
                    // The split cell was queued: its entry is replaced by all
                    // of its pieces, in place.
                    Some(pos) => {
                        worklist.remove(pos);
                        for (i, piece) in pieces.iter().enumerate() {
                            worklist.insert(pos + i, *piece);
                        }
                    }
                    // Otherwise every piece except the first-encountered
                    // largest joins the queue.
                    None => {
                        for (i, piece) in pieces.iter().enumerate() {
                            if i != largest {
                                worklist.push_back(*piece);
                            }
                        }
                    }
                }

                // Log the split for backtracking, and let the last piece
                // inherit the split cell's in_level so the undo scan can tell
                // pre-existing pieces from newly created ones. Cells created
                // earlier in this same refinement are covered by their own
                // log entry.
                if !self.refinement_log.is_empty() && info.in_level != self.level + 1 {
                    if let Some(last) = pieces.last() {
                        if let Some(cell) = self.cells.get_mut(&last.first) {
                            cell.in_level = info.in_level;
                        }
                    }
                    if let Some(stack) = self.refinement_log.last_mut() {
                        stack.push(first);
                    }
                }
            }
        }
        self.level += 1;
    }

    // ------------------------------------------------------------------
    // Backtracking
    // ------------------------------------------------------------------

    /// Restore the partition to its state at level `k` (1 ≤ k ≤ level).
    ///
    /// Every refinement-log stack at or above level k is drained; the
    /// original consults only the level-k stack, which suffices for the
    /// single-level backtracks the search mostly performs but not for the
    /// multi-level jumps of common-ancestor backtracking.
    pub fn reconstruct_at_level(&mut self, k: usize) -> Result<(), CanonError> {
        if k < 1 {
            return Err(CanonError::ReconstructAtRoot);
        }
        if self.refinement_log.len() + 1 != self.level || k > self.level {
            return Err(CanonError::RefinementLogMismatch {
                have: self.refinement_log.len(),
                want: k,
            });
        }
        while self.refinement_log.len() + 1 > k {
            let mut stack = match self.refinement_log.pop() {
                Some(stack) => stack,
                None => break,
            };
            while let Some(first) = stack.pop() {
                let start = self.cell_of[self.elements[first]];
                if self.cells[&start].in_level > k {
                    self.merge_through(start, k)?;
                }
            }
        }
        self.level = k;
        self.ref_invar.clear();
        Ok(())
    }

    /// Merge the cell at `start` with all following cells through the first
    /// one whose `in_level ≤ k`, restoring sorted order within the range.
    fn merge_through(&mut self, start: usize, k: usize) -> Result<(), CanonError> {
        let mut last = start;
        let mut last_info = self.cells[&start];
        while last_info.in_level > k {
            let next = last + last_info.len;
            match self.cells.get(&next) {
                Some(&info) => {
                    last = next;
                    last_info = info;
                }
                None => {
                    return Err(CanonError::CorruptRefinementLog {
                        first: start,
                        level: k,
                    })
                }
            }
        }
        let new_len = last + last_info.len - start;

        let absorbed: Vec<usize> = self.cells.range(start + 1..=last).map(|(&f, _)| f).collect();
        for f in absorbed {
            self.cells.remove(&f);
        }
        self.cells.insert(
            start,
            CellInfo {
                len: new_len,
                in_level: last_info.in_level,
            },
        );

        self.elements[start..start + new_len].sort_unstable();
        for &x in &self.elements[start..start + new_len] {
            self.cell_of[x] = start;
        }

        let covered: Vec<usize> = self
            .nonsingleton
            .range(start + 1..start + new_len)
            .copied()
            .collect();
        for f in covered {
            self.nonsingleton.remove(&f);
        }
        self.nonsingleton.insert(start);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Target cell selection
    // ------------------------------------------------------------------

    /// Choose a non-singleton cell to individualize.
    pub fn target_cell(
        &self,
        graph: &SparseGraph,
        method: TargetCellMethod,
    ) -> Result<CellRef, CanonError> {
        let first_ns = match self.nonsingleton.iter().next() {
            Some(&f) => f,
            None => return Err(CanonError::DiscreteTargetCell),
        };
        if self.nonsingleton.len() == 1 {
            return Ok(self.cell_ref(first_ns));
        }
        match method {
            TargetCellMethod::First => Ok(self.cell_ref(first_ns)),
            TargetCellMethod::FirstSmallest => {
                let mut best = first_ns;
                let mut best_len = self.cells[&first_ns].len;
                for &f in &self.nonsingleton {
                    let len = self.cells[&f].len;
                    if len == 2 {
                        return Ok(self.cell_ref(f));
                    }
                    if len < best_len {
                        best = f;
                        best_len = len;
                    }
                }
                Ok(self.cell_ref(best))
            }
            TargetCellMethod::Joins => Ok(self.most_nontrivial_joins(graph)),
        }
    }

    /// The first non-singleton cell non-trivially joined to the most other
    /// non-singleton cells. X is non-trivially joined to Y iff
    /// `0 < deg(x, Y) < |Y|`; since the partition is equitable, one
    /// representative per cell decides, and the relation is symmetric.
    fn most_nontrivial_joins(&self, graph: &SparseGraph) -> CellRef {
        let ns: Vec<usize> = self.nonsingleton.iter().copied().collect();
        let mut joins = vec![0usize; ns.len()];
        for i in 0..ns.len() {
            let rep = self.elements[ns[i]];
            for j in i + 1..ns.len() {
                let other = self.cells[&ns[j]];
                let members = &self.elements[ns[j]..ns[j] + other.len];
                let d = graph.degree_in(rep, members);
                if d > 0 && d < other.len {
                    joins[i] += 1;
                    joins[j] += 1;
                }
            }
        }
        let mut best = 0;
        for (i, &count) in joins.iter().enumerate() {
            if count > joins[best] {
                best = i;
            }
        }
        self.cell_ref(ns[best])
    }

    // ------------------------------------------------------------------
    // Consistency audit
    // ------------------------------------------------------------------

    /// Check every structural invariant of the representation; returns the
    /// first violation found. Intended for tests and debugging.
    pub fn check_consistency(&self) -> Result<(), String> {
        let n = self.elements.len();
        let mut seen = vec![false; n];
        for &v in &self.elements {
            if v >= n {
                return Err(format!("element {} out of range", v));
            }
            if std::mem::replace(&mut seen[v], true) {
                return Err(format!("element {} appears twice", v));
            }
        }
        let mut expected_first = 0;
        for (&first, info) in &self.cells {
            if first != expected_first {
                return Err(format!(
                    "cell at {} does not start where the previous one ended ({})",
                    first, expected_first
                ));
            }
            if info.len == 0 {
                return Err(format!("empty cell at {}", first));
            }
            for &v in &self.elements[first..first + info.len] {
                if self.cell_of[v] != first {
                    return Err(format!("cell_of[{}] = {} but cell starts at {}", v, self.cell_of[v], first));
                }
            }
            let listed = self.nonsingleton.contains(&first);
            if listed != (info.len > 1) {
                return Err(format!(
                    "nonsingleton listing wrong for cell at {} (len {})",
                    first, info.len
                ));
            }
            expected_first += info.len;
        }
        if expected_first != n {
            return Err(format!("cells cover {} of {} positions", expected_first, n));
        }
        if self.nonsingleton.len() > self.cells.len() {
            return Err("more nonsingleton entries than cells".to_string());
        }
        Ok(())
    }
}

/// Partition `members` by degree into `splitter`, ascending.
fn degree_classes(
    graph: &SparseGraph,
    members: &[Vertex],
    splitter: &[Vertex],
) -> Vec<Vec<Vertex>> {
    let mut by_degree: BTreeMap<usize, Vec<Vertex>> = BTreeMap::new();
    for &x in members {
        by_degree.entry(graph.degree_in(x, splitter)).or_default().push(x);
    }
    by_degree.into_values().collect()
}

impl fmt::Display for Partition {
    /// `[[0,1][2]]` — cells in order, elements comma-separated.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (&first, info) in &self.cells {
            write!(f, "[")?;
            for (i, v) in self.elements[first..first + info.len].iter().enumerate() {
                if i > 0 {
                    write!(f, ",")?;
                }
                write!(f, "{}", v)?;
            }
            write!(f, "]")?;
        }
        write!(f, "]")
    }
}
