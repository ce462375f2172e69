//! DIMACS graph format: `c` comments, a `p edge <n> <m>` problem line, and
//! `e u v` edges with 1-based vertex numbers.
//!
//! `n` (node color) lines are not supported; they produce a warning and are
//! skipped, matching the engine's colorless graph model.

use canon_core::SparseGraph;
use nom::bytes::complete::tag;
use nom::character::complete::space1;
use nom::combinator::all_consuming;
use nom::sequence::{preceded, separated_pair, tuple};

use super::combinators::integer;
use super::{GraphFormat, Parsed};
use crate::error::CodecError;

/// `p edge <n> <m>`
fn problem_line(line: &str) -> Option<(usize, usize)> {
    all_consuming(preceded(
        tuple((tag("p"), space1, tag("edge"), space1)),
        separated_pair(integer, space1, integer),
    ))(line)
    .ok()
    .map(|(_, counts)| counts)
}

/// `e <u> <v>`
fn edge_line(line: &str) -> Option<(usize, usize)> {
    all_consuming(preceded(
        tuple((tag("e"), space1)),
        separated_pair(integer, space1, integer),
    ))(line)
    .ok()
    .map(|(_, pair)| pair)
}

/// Parse a whole DIMACS input (pre-split into non-empty numbered lines).
pub(super) fn parse(lines: &[(usize, &str)]) -> Result<Parsed, CodecError> {
    let mut iter = lines
        .iter()
        .copied()
        .skip_while(|(_, line)| line.starts_with('c'));

    let (header_no, header) = match iter.next() {
        Some(entry) => entry,
        None => return Err(CodecError::EmptyInput),
    };
    let (n, declared_edges) = match problem_line(header) {
        Some(counts) => counts,
        None => return Err(CodecError::MissingDimacsHeader { line: header_no }),
    };

    let mut graph = SparseGraph::new(n);
    let mut warnings = Vec::new();
    let mut edge_lines = 0usize;
    for (line_no, line) in iter {
        if line.starts_with('c') {
            continue;
        }
        if line.starts_with('n') {
            warnings.push(format!(
                "line {}: vertex colors are not supported; ignoring 'n' line",
                line_no
            ));
            continue;
        }
        let (u, v) = match edge_line(line) {
            Some(pair) => pair,
            None => return Err(CodecError::BadDimacs { line: line_no }),
        };
        for endpoint in [u, v] {
            if endpoint < 1 || endpoint > n {
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
        // DIMACS vertices are 1-based.
        graph.add_edge(u - 1, v - 1);
        edge_lines += 1;
    }
    if edge_lines != declared_edges {
        warnings.push(format!(
            "problem line declared {} edges, found {}",
            declared_edges, edge_lines
        ));
    }
    Ok(Parsed {
        graph,
        format: GraphFormat::Dimacs,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::super::parse;
    use crate::error::CodecError;

    #[test]
    fn reads_a_triangle_with_comments() {
        let input = "c a triangle\np edge 3 3\nc interior comment\ne 1 2\ne 2 3\ne 3 1\n";
        let parsed = parse(input).unwrap();
        assert_eq!(parsed.graph.order(), 3);
        assert_eq!(parsed.graph.size(), 3);
        assert!(parsed.graph.has_edge(0, 2));
        assert!(parsed.warnings.is_empty());
    }

    #[test]
    fn node_lines_warn_and_are_skipped() {
        let parsed = parse("p edge 2 1\nn 1 7\ne 1 2\n").unwrap();
        assert_eq!(parsed.graph.size(), 1);
        assert_eq!(parsed.warnings.len(), 1);
        assert!(parsed.warnings[0].contains("vertex colors"));
    }

    #[test]
    fn edge_count_mismatch_warns() {
        let parsed = parse("p edge 3 5\ne 1 2\n").unwrap();
        assert_eq!(parsed.warnings.len(), 1);
        assert!(parsed.warnings[0].contains("declared 5 edges"));
    }

    #[test]
    fn missing_problem_line_is_fatal() {
        assert!(matches!(
            parse("c only comments\ne 1 2\n"),
            Err(CodecError::MissingDimacsHeader { line: 2 })
        ));
    }

    #[test]
    fn one_based_indices_are_enforced() {
        assert!(matches!(
            parse("p edge 3 1\ne 0 2\n"),
            Err(CodecError::VertexOutOfRange {
                line: 2,
                vertex: 0,
                n: 3
            })
        ));
        assert!(matches!(
            parse("p edge 3 1\ne 1 4\n"),
            Err(CodecError::VertexOutOfRange {
                line: 2,
                vertex: 4,
                n: 3
            })
        ));
    }

    #[test]
    fn dimacs_loops_are_fatal() {
        assert!(matches!(
            parse("p edge 3 1\ne 2 2\n"),
            Err(CodecError::SelfLoop { line: 2 })
        ));
    }

    #[test]
    fn unrecognized_lines_are_fatal() {
        assert!(matches!(
            parse("p edge 2 1\nx 1 2\n"),
            Err(CodecError::BadDimacs { line: 2 })
        ));
    }
}
