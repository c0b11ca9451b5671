//! Regex reversal.
//!
//! The regex engine only searches forward. To search backward from a point,
//! the text before it is reversed and searched forward with a reversed
//! pattern: `abc` becomes `cba`, `^` and `$` trade places, quantifiers stay
//! attached to what they quantify and flag scopes are rewritten so every
//! piece of the pattern keeps the flags it had.

pub mod ast;
pub mod parser;
pub mod scanner;
pub mod serialize;
pub mod transform;

use crate::error::Errors;
use ast::FlagSet;

/// Reverse a pattern compiled with no flags set.
pub fn reverse_pattern(pattern: &str) -> Result<String, Errors> {
    reverse_pattern_with(pattern, FlagSet::EMPTY)
}

/// Reverse a pattern that will be compiled with `initial` flags already set.
pub fn reverse_pattern_with(pattern: &str, initial: FlagSet) -> Result<String, Errors> {
    let root = parser::parse(pattern)?;
    Ok(serialize::to_pattern(&transform::reverse(&root, initial)))
}
