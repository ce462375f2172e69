//! # graph-codec
//!
//! Text formats for the canon-core engine: read a simple undirected graph
//! from an edge list, a row adjacency matrix, or a DIMACS file, with the
//! format auto-detected from the first non-empty line.
//!
//! ## Formats
//!
//! - **Edge list** — a vertex-count header, then one `u v` edge per line
//!   (0-based). Loops are fatal; parallel edges collapse.
//! - **Row matrix** — a vertex-count header, then n rows over {'0','1'}.
//!   The matrix is symmetrized on read; diagonal ones are fatal.
//! - **DIMACS** — `c` comments, one `p edge <n> <m>` problem line, `e u v`
//!   edges (1-based). `n` color lines warn and are skipped.
//!
//! ## Example
//!
//! ```rust
//! use graph_codec::parse_graph;
//!
//! let parsed = parse_graph("4\n0 1\n1 2\n2 3\n")?;
//! assert_eq!(parsed.graph.order(), 4);
//! assert_eq!(parsed.graph.size(), 3);
//! # Ok::<(), graph_codec::CodecError>(())
//! ```
//!
//! Parsing never partially succeeds: any malformed line aborts with a
//! [`CodecError`] carrying the 1-based line number. Non-fatal observations
//! (ignored DIMACS `n` lines, edge-count mismatches) are returned as
//! warnings on the [`Parsed`] value rather than logged, so callers decide
//! how to surface them.

mod error;
mod parser;

use std::fs;
use std::path::Path;

pub use error::CodecError;
pub use parser::{GraphFormat, Parsed};

/// Parse a graph from text in any supported format.
pub fn parse_graph(input: &str) -> Result<Parsed, CodecError> {
    parser::parse(input)
}

/// Read and parse a graph file.
pub fn read_graph_file<P: AsRef<Path>>(path: P) -> Result<Parsed, CodecError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| CodecError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_graph(&text)
}
