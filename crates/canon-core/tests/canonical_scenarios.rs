//! End-to-end canonicalization scenarios: boundary graphs, known
//! automorphism groups, and isomorphism verdicts on classic pairs.

use std::collections::HashSet;

use canon_core::{canonicalize, isomorphic, Options, Permutation, SparseGraph};

fn graph(n: usize, edges: &[(usize, usize)]) -> SparseGraph {
    let mut g = SparseGraph::new(n);
    for &(u, v) in edges {
        g.add_edge(u, v);
    }
    g
}

fn cycle(n: usize) -> SparseGraph {
    let mut g = SparseGraph::new(n);
    for i in 0..n {
        g.add_edge(i, (i + 1) % n);
    }
    g
}

fn path(n: usize) -> SparseGraph {
    let mut g = SparseGraph::new(n);
    for i in 0..n - 1 {
        g.add_edge(i, i + 1);
    }
    g
}

fn complete(n: usize) -> SparseGraph {
    let mut g = SparseGraph::new(n);
    for u in 0..n {
        for v in u + 1..n {
            g.add_edge(u, v);
        }
    }
    g
}

/// Center 0 joined to 1..n-1.
fn star(n: usize) -> SparseGraph {
    let mut g = SparseGraph::new(n);
    for leaf in 1..n {
        g.add_edge(0, leaf);
    }
    g
}

/// Outer 5-cycle, inner pentagram, five spokes.
fn petersen() -> SparseGraph {
    let mut g = SparseGraph::new(10);
    for i in 0..5 {
        g.add_edge(i, (i + 1) % 5);
        g.add_edge(5 + i, 5 + (i + 2) % 5);
        g.add_edge(i, 5 + i);
    }
    g
}

/// Order of the group generated by `generators`, by breadth-first closure.
/// Only suitable for the small groups these scenarios expect.
fn group_order(generators: &[Permutation], n: usize) -> usize {
    let mut seen: HashSet<Vec<usize>> = HashSet::new();
    let identity = Permutation::identity(n);
    seen.insert(identity.images().to_vec());
    let mut frontier = vec![identity];
    while let Some(p) = frontier.pop() {
        for g in generators {
            let q = p.compose(g);
            if seen.insert(q.images().to_vec()) {
                frontier.push(q);
            }
        }
    }
    seen.len()
}

/// All permutations of 0..n, by Heap's algorithm.
fn all_permutations(n: usize) -> Vec<Permutation> {
    fn heap(k: usize, items: &mut Vec<usize>, out: &mut Vec<Permutation>) {
        if k <= 1 {
            out.push(Permutation::from_images(items.clone()));
            return;
        }
        for i in 0..k {
            heap(k - 1, items, out);
            if k % 2 == 0 {
                items.swap(i, k - 1);
            } else {
                items.swap(0, k - 1);
            }
        }
    }
    let mut items: Vec<usize> = (0..n).collect();
    let mut out = Vec::new();
    heap(n, &mut items, &mut out);
    out
}

#[test]
fn boundary_graphs_canonicalize() {
    let options = Options::default();
    for g in [
        SparseGraph::new(1),
        SparseGraph::new(2),
        graph(2, &[(0, 1)]),
        complete(4),
        SparseGraph::new(5),
        path(5),
        cycle(5),
    ] {
        let canonical = canonicalize(&g, &options).unwrap();
        assert!(canonical.stats.leaves_visited >= 1);
        // The canonical permutation really is a relabeling of the graph
        // with the canonical hash.
        assert_eq!(
            g.relabel(&canonical.leaf.perm).hash_value(),
            *canonical.hash()
        );
    }
}

#[test]
fn c5_and_p5_are_not_isomorphic() {
    assert!(!isomorphic(&cycle(5), &path(5), &Options::default()).unwrap());
}

#[test]
fn equal_degree_sequences_do_not_fool_the_search() {
    // Two disjoint triangles vs the 6-cycle: both 2-regular.
    let two_triangles = graph(6, &[(0, 1), (1, 2), (2, 0), (3, 4), (4, 5), (5, 3)]);
    let c6 = cycle(6);
    assert!(!isomorphic(&two_triangles, &c6, &Options::default()).unwrap());
    // Each is isomorphic to a relabeling of itself.
    let sigma = Permutation::from_images(vec![5, 3, 1, 4, 2, 0]);
    assert!(isomorphic(&two_triangles, &two_triangles.relabel(&sigma), &Options::default()).unwrap());
}

#[test]
fn k4_automorphism_group_has_order_24() {
    let canonical = canonicalize(&complete(4), &Options::default()).unwrap();
    assert_eq!(group_order(&canonical.generators, 4), 24);
}

#[test]
fn empty_graph_group_is_full_symmetric() {
    let canonical = canonicalize(&SparseGraph::new(4), &Options::default()).unwrap();
    assert_eq!(group_order(&canonical.generators, 4), 24);
}

#[test]
fn star_s5_automorphism_group_has_order_120() {
    let canonical = canonicalize(&star(6), &Options::default()).unwrap();
    assert_eq!(group_order(&canonical.generators, 6), 120);
    // Every generator fixes the center.
    for g in &canonical.generators {
        assert_eq!(g.image(0), 0);
    }
}

#[test]
fn star_s5_canonical_form_is_stable_across_all_720_relabelings() {
    let base = canonicalize(&star(6), &Options::default()).unwrap();
    for sigma in all_permutations(6) {
        let relabeled = star(6).relabel(&sigma);
        let canonical = canonicalize(&relabeled, &Options::default()).unwrap();
        assert_eq!(canonical.hash(), base.hash(), "relabeling {}", sigma);
    }
}

#[test]
fn petersen_graph_group_has_order_120() {
    let p = petersen();
    let canonical = canonicalize(&p, &Options::default()).unwrap();
    assert_eq!(group_order(&canonical.generators, 10), 120);
    for g in &canonical.generators {
        for (u, v) in p.edges() {
            assert!(p.has_edge(g.image(u), g.image(v)));
        }
    }
}

#[test]
fn petersen_graph_is_isomorphic_to_its_relabelings() {
    let g = petersen();
    let base = canonicalize(&g, &Options::default()).unwrap();
    for sigma in [
        Permutation::from_images(vec![3, 8, 0, 5, 9, 2, 7, 4, 1, 6]),
        Permutation::from_images(vec![9, 8, 7, 6, 5, 4, 3, 2, 1, 0]),
        Permutation::from_images(vec![1, 2, 3, 4, 0, 6, 7, 8, 9, 5]),
    ] {
        let relabeled = g.relabel(&sigma);
        assert!(isomorphic(&g, &relabeled, &Options::default()).unwrap());
        assert_eq!(
            canonicalize(&relabeled, &Options::default()).unwrap().hash(),
            base.hash()
        );
    }
}

#[test]
fn complete_graph_hash_is_the_all_ones_vector_positionwise() {
    // Every leaf of Kn denotes the same graph, so first leaf == best leaf
    // and the hash equals the unpermuted one.
    let k4 = complete(4);
    let canonical = canonicalize(&k4, &Options::default()).unwrap();
    assert_eq!(*canonical.hash(), k4.hash_value());
}
