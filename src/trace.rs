//! Hooks for watching a pipeline run.

use crate::range::Range;

/// Receives a report after each stage and for each edit a command stage makes.
///
/// Every method has an empty default, so an implementation only overrides
/// what it cares about.
pub trait Tracer {
    /// Called after stage `index` (labelled e.g. `x/re/`) produced `ranges`.
    fn stage(&self, _index: usize, _label: &str, _ranges: &[Range]) {}

    /// Called for each edit reported to the handler.
    fn edit(&self, _label: &str, _range: Range, _text: &str) {}
}

/// Ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl Tracer for Silent {}

/// Forwards reports to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct Logged;

impl Tracer for Logged {
    fn stage(&self, index: usize, label: &str, ranges: &[Range]) {
        tracing::debug!(
            target: "sx",
            stage = index,
            label,
            count = ranges.len(),
            ranges = %format_ranges(ranges),
            "stage finished"
        );
    }

    fn edit(&self, label: &str, range: Range, text: &str) {
        tracing::trace!(target: "sx", label, %range, text, "edit");
    }
}

fn format_ranges(ranges: &[Range]) -> String {
    ranges
        .iter()
        .map(Range::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    struct Collect(RefCell<Vec<String>>);

    impl Tracer for Collect {
        fn stage(&self, index: usize, label: &str, ranges: &[Range]) {
            self.0
                .borrow_mut()
                .push(format!("{} {} {}", index, label, format_ranges(ranges)));
        }
    }

    #[test]
    fn defaults_do_nothing() {
        Silent.stage(0, "x/a/", &[Range::new(0, 1)]);
        Silent.edit("d", Range::new(0, 1), "");
    }

    #[test]
    fn override_only_what_is_needed() {
        let tracer = Collect::default();
        tracer.stage(1, "x/a/", &[Range::new(0, 1), Range::new(3, 4)]);
        tracer.edit("d", Range::new(0, 1), "");
        assert_eq!(*tracer.0.borrow(), vec!["1 x/a/ [0,1) [3,4)"]);
    }
}
