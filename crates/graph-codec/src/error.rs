//! Error types for graph parsing

use thiserror::Error;

/// A fatal problem with a graph input. Line numbers are 1-based and refer to
/// the raw input, blank lines included.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The file could not be read at all.
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Nothing but blank lines.
    #[error("input contains no graph")]
    EmptyInput,

    /// The first line of a non-DIMACS input must be the number of vertices.
    #[error("line {line}: expected the number of vertices")]
    BadHeader { line: usize },

    /// An edge-list line must hold exactly two vertex numbers.
    #[error("line {line}: expected an edge as two vertex numbers")]
    BadEdgeLine { line: usize },

    /// Loops cannot be represented.
    #[error("line {line}: self-loops are not allowed")]
    SelfLoop { line: usize },

    /// An endpoint does not name a vertex of the declared graph.
    #[error("line {line}: vertex {vertex} is out of range for {n} vertices")]
    VertexOutOfRange { line: usize, vertex: usize, n: usize },

    /// A matrix row with the wrong number of entries.
    #[error("line {line}: matrix row has {got} entries, expected {expected}")]
    RowLength {
        line: usize,
        got: usize,
        expected: usize,
    },

    /// A matrix row with characters outside {'0', '1'}.
    #[error("line {line}: matrix rows must consist of '0' and '1'")]
    BadMatrixRow { line: usize },

    /// The matrix ended before all rows were given.
    #[error("matrix has {got} rows, expected {expected}")]
    MissingRows { got: usize, expected: usize },

    /// A DIMACS input must start (after comments) with `p edge <n> <m>`.
    #[error("line {line}: expected a 'p edge <n> <m>' problem line")]
    MissingDimacsHeader { line: usize },

    /// A DIMACS line that is neither comment, problem, node nor edge.
    #[error("line {line}: unrecognized DIMACS line")]
    BadDimacs { line: usize },
}
