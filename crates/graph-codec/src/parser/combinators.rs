//! Token-level nom combinators shared by the format parsers.
//!
//! Each helper parses one already-trimmed line in full and collapses the nom
//! error into `Option`; the callers attach line numbers and turn misses into
//! the right `CodecError`.

use nom::bytes::complete::is_a;
use nom::character::complete::{digit1, space1};
use nom::combinator::{all_consuming, map_res};
use nom::sequence::separated_pair;
use nom::IResult;

/// Nom result over plain string input.
pub type ParseResult<'a, O> = IResult<&'a str, O>;

/// An unsigned decimal integer.
pub fn integer(input: &str) -> ParseResult<'_, usize> {
    map_res(digit1, str::parse)(input)
}

/// A line holding exactly one integer: the vertex-count header.
pub fn header(line: &str) -> Option<usize> {
    all_consuming(integer)(line).ok().map(|(_, n)| n)
}

/// A line holding exactly two whitespace-separated integers.
pub fn vertex_pair(line: &str) -> Option<(usize, usize)> {
    all_consuming(separated_pair(integer, space1, integer))(line)
        .ok()
        .map(|(_, pair)| pair)
}

/// A line consisting solely of '0' and '1' characters.
pub fn matrix_row(line: &str) -> Option<&str> {
    all_consuming(is_a::<_, _, nom::error::Error<&str>>("01"))(line)
        .ok()
        .map(|(_, row)| row)
}
