//! Edge-list format: a vertex-count header, then one `u v` edge per line.

use canon_core::SparseGraph;

use super::combinators;
use super::{GraphFormat, Parsed};
use crate::error::CodecError;

/// Parse the body lines following an `n` header.
pub(super) fn parse(n: usize, lines: &[(usize, &str)]) -> Result<Parsed, CodecError> {
    let mut graph = SparseGraph::new(n);
    for &(line_no, line) in lines {
        let (u, v) = match combinators::vertex_pair(line) {
            Some(pair) => pair,
            None => return Err(CodecError::BadEdgeLine { line: line_no }),
        };
        for endpoint in [u, v] {
            if endpoint >= n {
                return Err(CodecError::VertexOutOfRange {
                    line: line_no,
                    vertex: endpoint,
                    n,
                });
            }
        }
        if u == v {
            return Err(CodecError::SelfLoop { line: line_no });
        }
        // Parallel edges collapse silently.
        graph.add_edge(u, v);
    }
    Ok(Parsed {
        graph,
        format: GraphFormat::EdgeList,
        warnings: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::super::parse;
    use crate::error::CodecError;

    #[test]
    fn reads_a_path_graph() {
        let parsed = parse("4\n0 1\n1 2\n2 3\n").unwrap();
        assert_eq!(parsed.graph.order(), 4);
        assert_eq!(parsed.graph.size(), 3);
        assert!(parsed.graph.has_edge(2, 1));
        assert!(parsed.warnings.is_empty());
    }

    #[test]
    fn parallel_edges_collapse() {
        let parsed = parse("3\n0 1\n1 0\n0 1\n").unwrap();
        assert_eq!(parsed.graph.size(), 1);
    }

    #[test]
    fn loops_are_fatal() {
        assert!(matches!(
            parse("3\n0 1\n2 2\n"),
            Err(CodecError::SelfLoop { line: 3 })
        ));
    }

    #[test]
    fn out_of_range_endpoints_are_fatal() {
        assert!(matches!(
            parse("3\n0 3\n"),
            Err(CodecError::VertexOutOfRange {
                line: 2,
                vertex: 3,
                n: 3
            })
        ));
    }

    #[test]
    fn malformed_edge_lines_are_fatal() {
        assert!(matches!(
            parse("3\n0 1\n1 two\n"),
            Err(CodecError::BadEdgeLine { line: 3 })
        ));
    }
}
