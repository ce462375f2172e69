//! Format auto-detection and dispatch.
//!
//! The format is decided by the first non-empty line: a line starting with a
//! letter means DIMACS; otherwise the line must be the vertex count, and the
//! second non-empty line separates edge lists (two integers) from row
//! matrices (a {0,1} string).

pub mod combinators;
mod dimacs;
mod edge_list;
mod matrix;

use canon_core::SparseGraph;

use crate::error::CodecError;

/// Which of the three input formats a graph was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphFormat {
    EdgeList,
    RowMatrix,
    Dimacs,
}

/// A successfully parsed graph plus any non-fatal observations made on the
/// way (e.g. ignored DIMACS color lines).
#[derive(Debug)]
pub struct Parsed {
    pub graph: SparseGraph,
    pub format: GraphFormat,
    pub warnings: Vec<String>,
}

/// Parse a graph in any supported format.
pub fn parse(input: &str) -> Result<Parsed, CodecError> {
    // Non-empty trimmed lines, each tagged with its 1-based raw line number.
    let lines: Vec<(usize, &str)> = input
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
        .collect();

    let (first_no, first) = match lines.first() {
        Some(&entry) => entry,
        None => return Err(CodecError::EmptyInput),
    };

    if first.chars().next().map_or(false, |c| c.is_ascii_alphabetic()) {
        return dimacs::parse(&lines);
    }

    let n = match combinators::header(first) {
        Some(n) => n,
        None => return Err(CodecError::BadHeader { line: first_no }),
    };
    let body = &lines[1..];
    match body.first() {
        // Just a header: an edge-less graph on n vertices.
        None => Ok(Parsed {
            graph: SparseGraph::new(n),
            format: GraphFormat::EdgeList,
            warnings: Vec::new(),
        }),
        Some(&(_, second)) => {
            if second.chars().any(char::is_whitespace) {
                edge_list::parse(n, body)
            } else {
                matrix::parse(n, body)
            }
        }
    }
}
