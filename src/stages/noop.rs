use crate::error::Result;
use crate::interpreter::{Context, Effect};
use crate::range::Range;

/// Ends a command that has no editing or display command, so the handler
/// still hears about the final selection.
pub struct Noop;

impl Effect for Noop {
    fn label(&self) -> String {
        "noop".to_string()
    }

    fn apply(&self, ctx: &mut Context, ranges: Vec<Range>) -> Result<Vec<Range>> {
        for &r in &ranges {
            ctx.noop(r);
        }
        Ok(ranges)
    }
}
