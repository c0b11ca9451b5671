//! Stage implementations.
//!
//! Addresses, operations and groups implement `Select`; commands and the
//! terminal no-op implement `Effect`.

mod address;
mod command;
mod group;
mod noop;
mod operation;

pub use address::AddressStage;
pub use command::CommandStage;
pub use group::GroupStage;
pub use noop::Noop;
pub use operation::OperationStage;

use regex::{Regex, RegexBuilder};

use crate::error::{Error, Result};

/// Compile a pattern the way every stage does: `^` and `$` match at line
/// boundaries.
pub(crate) fn build_regex(pattern: &str) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .multi_line(true)
        .build()
        .map_err(|e| Error::regex(pattern, e))
}
