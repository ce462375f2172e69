//! Row-matrix format: a vertex-count header, then n rows of n characters
//! over {'0', '1'}. The matrix is symmetrized on read: an edge exists if
//! either triangle records it.

use canon_core::SparseGraph;

use super::combinators;
use super::{GraphFormat, Parsed};
use crate::error::CodecError;

/// Parse the body lines following an `n` header.
pub(super) fn parse(n: usize, lines: &[(usize, &str)]) -> Result<Parsed, CodecError> {
    if lines.len() < n {
        return Err(CodecError::MissingRows {
            got: lines.len(),
            expected: n,
        });
    }
    let mut graph = SparseGraph::new(n);
    for (i, &(line_no, line)) in lines.iter().take(n).enumerate() {
        let row = match combinators::matrix_row(line) {
            Some(row) => row,
            None => return Err(CodecError::BadMatrixRow { line: line_no }),
        };
        if row.len() != n {
            return Err(CodecError::RowLength {
                line: line_no,
                got: row.len(),
                expected: n,
            });
        }
        for (j, cell) in row.chars().enumerate() {
            if cell == '1' {
                if i == j {
                    return Err(CodecError::SelfLoop { line: line_no });
                }
                graph.add_edge(i, j);
            }
        }
    }
    Ok(Parsed {
        graph,
        format: GraphFormat::RowMatrix,
        warnings: Vec::new(),
    })
}
