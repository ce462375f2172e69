//! Permutation algebra and the group helpers used for orbit pruning.
//!
//! Permutations are stored in vector form: `p` sends `i` to `p[i]`. The
//! composition convention throughout is "read left to right":
//! `(p ∘ q)[i] = q[p[i]]`, i.e. `p` is applied first.
//!
//! The two group-theoretic helpers deliberately treat a list of generators as
//! if it were the whole group: `fixing_generators` filters the list, and
//! `min_cell_representatives` walks single-generator cycles only. Both
//! produce conservative overapproximations, which is all that orbit pruning
//! needs — see the module-level discussion in `search`.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::graph::Vertex;

/// A permutation of `{0, …, n−1}` in vector form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Permutation(Vec<Vertex>);

impl Permutation {
    /// The identity on `n` points.
    pub fn identity(n: usize) -> Self {
        Permutation((0..n).collect())
    }

    /// Build from an image vector; `images[i]` is where `i` goes.
    ///
    /// The caller is responsible for `images` being a permutation (every
    /// value in `[0, n)` exactly once); all engine-internal constructions
    /// satisfy this by shape.
    pub fn from_images(images: Vec<Vertex>) -> Self {
        debug_assert!({
            let mut seen = vec![false; images.len()];
            images.iter().all(|&x| {
                x < seen.len() && !std::mem::replace(&mut seen[x], true)
            })
        });
        Permutation(images)
    }

    /// Number of points the permutation acts on.
    pub fn degree(&self) -> usize {
        self.0.len()
    }

    /// The image of a single point.
    pub fn image(&self, i: Vertex) -> Vertex {
        self.0[i]
    }

    /// The underlying image vector.
    pub fn images(&self) -> &[Vertex] {
        &self.0
    }

    /// The inverse permutation: `inv[p[i]] = i`.
    pub fn inverse(&self) -> Permutation {
        let mut inv = vec![0; self.0.len()];
        for (i, &pi) in self.0.iter().enumerate() {
            inv[pi] = i;
        }
        Permutation(inv)
    }

    /// `self ∘ other`: apply `self` first, then `other`.
    pub fn compose(&self, other: &Permutation) -> Permutation {
        debug_assert_eq!(self.degree(), other.degree());
        Permutation(self.0.iter().map(|&i| other.0[i]).collect())
    }

    /// The image of a vertex sequence, element-wise.
    pub fn apply_to(&self, seq: &[Vertex]) -> Vec<Vertex> {
        seq.iter().map(|&v| self.0[v]).collect()
    }

    /// Whether every element of `seq` is a fixed point.
    pub fn fixes(&self, seq: &[Vertex]) -> bool {
        seq.iter().all(|&v| self.0[v] == v)
    }

    /// Whether this is the identity.
    pub fn is_identity(&self) -> bool {
        self.0.iter().enumerate().all(|(i, &pi)| i == pi)
    }
}

impl fmt::Display for Permutation {
    /// Cycle notation, fixed points omitted; the identity prints as `id`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_identity() {
            return write!(f, "id");
        }
        let mut visited = vec![false; self.0.len()];
        for start in 0..self.0.len() {
            if visited[start] || self.0[start] == start {
                continue;
            }
            visited[start] = true;
            write!(f, "({}", start)?;
            let mut cur = self.0[start];
            while cur != start {
                visited[cur] = true;
                write!(f, " {}", cur)?;
                cur = self.0[cur];
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

/// The generators in `generators` that fix every element of `fixed`.
///
/// This is a filter over the generator list, not a stabilizer computation:
/// products of generators are never considered.
pub fn fixing_generators<'a>(
    generators: &'a [Permutation],
    fixed: &[Vertex],
) -> Vec<&'a Permutation> {
    generators.iter().filter(|g| g.fixes(fixed)).collect()
}

/// Approximate minimum cell representatives of the subgroup of `generators`
/// fixing `fixed`, acting on `{0, …, n−1}`, in increasing order.
///
/// For each unvisited `i` ascending, `i` is emitted as a representative and
/// the cycle of `i` under every individual fixing generator is marked
/// visited. Elements reachable only through generator products stay
/// unvisited, so the result can be a strict superset of the true orbit
/// minima — never a subset, which is the direction pruning relies on.
pub fn min_cell_representatives(
    generators: &[Permutation],
    fixed: &[Vertex],
    n: usize,
) -> Vec<Vertex> {
    let fixing = fixing_generators(generators, fixed);
    let mut visited = vec![false; n];
    let mut reps = Vec::new();
    for i in 0..n {
        if visited[i] {
            continue;
        }
        visited[i] = true;
        reps.push(i);
        for g in &fixing {
            let mut cur = g.image(i);
            while cur != i {
                visited[cur] = true;
                cur = g.image(cur);
            }
        }
    }
    reps
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compose_applies_left_operand_first() {
        let p = Permutation::from_images(vec![1, 2, 0]);
        let q = Permutation::from_images(vec![0, 2, 1]);
        // (p ∘ q)[i] = q[p[i]]
        assert_eq!(p.compose(&q), Permutation::from_images(vec![2, 1, 0]));
    }

    #[test]
    fn inverse_composes_to_identity() {
        let p = Permutation::from_images(vec![3, 0, 2, 1]);
        assert!(p.compose(&p.inverse()).is_identity());
        assert!(p.inverse().compose(&p).is_identity());
    }

    #[test]
    fn compose_is_associative() {
        let p = Permutation::from_images(vec![1, 2, 3, 0]);
        let q = Permutation::from_images(vec![0, 3, 1, 2]);
        let r = Permutation::from_images(vec![2, 0, 3, 1]);
        assert_eq!(p.compose(&q).compose(&r), p.compose(&q.compose(&r)));
    }

    #[test]
    fn apply_and_fixes() {
        let p = Permutation::from_images(vec![0, 2, 1, 3]);
        assert_eq!(p.apply_to(&[1, 3]), vec![2, 3]);
        assert!(p.fixes(&[0, 3]));
        assert!(!p.fixes(&[0, 1]));
    }

    #[test]
    fn cycle_display() {
        assert_eq!(Permutation::identity(4).to_string(), "id");
        let p = Permutation::from_images(vec![1, 0, 3, 4, 2]);
        assert_eq!(p.to_string(), "(0 1)(2 3 4)");
    }

    #[test]
    fn fixing_generators_filters() {
        let swap01 = Permutation::from_images(vec![1, 0, 2]);
        let swap12 = Permutation::from_images(vec![0, 2, 1]);
        let gens = vec![swap01.clone(), swap12.clone()];
        assert_eq!(fixing_generators(&gens, &[0]), vec![&swap12]);
        assert_eq!(fixing_generators(&gens, &[]).len(), 2);
        assert!(fixing_generators(&gens, &[0, 1]).is_empty());
    }

    #[test]
    fn mcr_of_empty_generator_list_is_everything() {
        assert_eq!(min_cell_representatives(&[], &[], 4), vec![0, 1, 2, 3]);
    }

    #[test]
    fn mcr_collapses_generator_cycles() {
        // 3-cycle (0 1 2) acting on 4 points: orbits {0,1,2} and {3}.
        let rot = Permutation::from_images(vec![1, 2, 0, 3]);
        assert_eq!(min_cell_representatives(&[rot.clone()], &[], 4), vec![0, 3]);
        // Fixing the sequence [0] excludes the rotation entirely.
        assert_eq!(
            min_cell_representatives(&[rot], &[0], 4),
            vec![0, 1, 2, 3]
        );
    }

    #[test]
    fn mcr_is_superset_of_true_minima() {
        // (0 1) and (1 2) generate S3 on {0,1,2}; the true orbit has the
        // single minimum 0, but the single-generator walk from 0 only visits
        // 1 via the first generator and 2 stays a representative.
        let gens = vec![
            Permutation::from_images(vec![1, 0, 2, 3]),
            Permutation::from_images(vec![0, 2, 1, 3]),
        ];
        let reps = min_cell_representatives(&gens, &[], 4);
        assert!(reps.contains(&0) && reps.contains(&3));
        assert_eq!(reps, vec![0, 2, 3]);
    }

    #[test]
    fn serde_round_trip() {
        let p = Permutation::from_images(vec![2, 0, 1]);
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(serde_json::from_str::<Permutation>(&json).unwrap(), p);
    }
}
