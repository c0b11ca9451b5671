//! Ranges over rune offsets and the set operations the stages share.

use std::fmt;

use serde::Serialize;

/// A half-open `[start, end)` interval of rune (code point) offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Range {
    pub start: usize,
    pub end: usize,
}

impl Range {
    /// Create a range. `end` is clamped so that `start <= end` always holds.
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start,
            end: end.max(start),
        }
    }

    /// A zero-length range at `pos`.
    pub fn point(pos: usize) -> Self {
        Self::new(pos, pos)
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Whether `pos` lies in `[start, end)`.
    pub fn contains(&self, pos: usize) -> bool {
        self.start <= pos && pos < self.end
    }

    /// Move both ends by `delta` runes.
    ///
    /// A shift that would move the range before offset 0 means the running
    /// edit offset is out of step with the range set, which is a bug.
    pub fn shifted(self, delta: isize) -> crate::error::Result<Range> {
        let start = self.start.checked_add_signed(delta);
        let end = self.end.checked_add_signed(delta);
        match (start, end) {
            (Some(start), Some(end)) => Ok(Range { start, end }),
            _ => Err(crate::error::Error::internal(format!(
                "range {} shifted by {} falls before the buffer start",
                self, delta
            ))),
        }
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{})", self.start, self.end)
    }
}

impl From<(usize, usize)> for Range {
    fn from((start, end): (usize, usize)) -> Self {
        Range::new(start, end)
    }
}

/// Stable sort by start offset.
pub fn sort_ranges(ranges: &mut [Range]) {
    ranges.sort_by_key(|r| r.start);
}

/// Merge overlapping ranges.
///
/// Ranges are sorted by start; a range that starts before the end of the
/// range accumulated so far is folded into it.
pub fn union_of_ranges(mut ranges: Vec<Range>) -> Vec<Range> {
    // longest first among equal starts, so the result does not depend on input order
    ranges.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));
    let mut merged: Vec<Range> = Vec::with_capacity(ranges.len());
    for r in ranges {
        match merged.last_mut() {
            Some(prev) if r.start < prev.end => {
                prev.end = prev.end.max(r.end);
            }
            _ => merged.push(r),
        }
    }
    merged
}

/// The gaps around sorted, non-overlapping `ranges` within `[start, end)`.
///
/// Interior gaps are kept even when empty; the leading and trailing gaps
/// only when they contain text.
pub fn invert_ranges(ranges: &[Range], start: usize, end: usize) -> Vec<Range> {
    let mut gaps = Vec::with_capacity(ranges.len() + 1);
    let mut pos = start;
    for (i, r) in ranges.iter().enumerate() {
        let gap = Range::new(pos, r.start);
        if i > 0 || !gap.is_empty() {
            gaps.push(gap);
        }
        pos = r.end;
    }
    if pos < end {
        gaps.push(Range::new(pos, end));
    }
    gaps
}

/// Converts byte offsets in a string to rune offsets.
///
/// Regex matches arrive with monotonically increasing byte offsets, so the
/// cursor only counts the runes between the previous offset and the new one.
/// Asking for an earlier offset restarts from the beginning.
pub struct RuneCursor<'s> {
    text: &'s str,
    byte: usize,
    rune: usize,
}

impl<'s> RuneCursor<'s> {
    pub fn new(text: &'s str) -> Self {
        Self {
            text,
            byte: 0,
            rune: 0,
        }
    }

    /// Rune offset of `byte`, which must be on a char boundary.
    pub fn rune_at(&mut self, byte: usize) -> usize {
        if byte < self.byte {
            self.byte = 0;
            self.rune = 0;
        }
        self.rune += self.text[self.byte..byte].chars().count();
        self.byte = byte;
        self.rune
    }

    /// Rune range for a byte range, offset by `base` runes.
    pub fn range(&mut self, start: usize, end: usize, base: usize) -> Range {
        let start = self.rune_at(start);
        let end = self.rune_at(end);
        Range::new(base + start, base + end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranges(pairs: &[(usize, usize)]) -> Vec<Range> {
        pairs.iter().map(|&p| Range::from(p)).collect()
    }

    #[test]
    fn new_clamps_end() {
        let r = Range::new(5, 3);
        assert_eq!(r, Range::point(5));
        assert!(r.is_empty());
    }

    #[test]
    fn contains_is_half_open() {
        let r = Range::new(2, 4);
        assert!(!r.contains(1));
        assert!(r.contains(2));
        assert!(r.contains(3));
        assert!(!r.contains(4));
    }

    #[test]
    fn shifted_moves_both_ends() {
        assert_eq!(Range::new(5, 8).shifted(-2).unwrap(), Range::new(3, 6));
        assert_eq!(Range::new(5, 8).shifted(3).unwrap(), Range::new(8, 11));
    }

    #[test]
    fn shifted_below_zero_is_internal() {
        let err = Range::new(1, 2).shifted(-5).unwrap_err();
        assert!(err.is_internal());
    }

    #[test]
    fn union_merges_overlaps() {
        let input = ranges(&[(1, 5), (2, 3), (2, 6), (10, 15), (9, 12), (20, 21)]);
        assert_eq!(
            union_of_ranges(input),
            ranges(&[(1, 6), (9, 15), (20, 21)])
        );
    }

    #[test]
    fn union_keeps_adjacent_ranges_apart() {
        let input = ranges(&[(0, 5), (5, 8)]);
        assert_eq!(union_of_ranges(input.clone()), input);
    }

    #[test]
    fn union_of_nothing() {
        assert!(union_of_ranges(Vec::new()).is_empty());
    }

    #[test]
    fn invert_single() {
        assert_eq!(
            invert_ranges(&ranges(&[(5, 10)]), 0, 30),
            ranges(&[(0, 5), (10, 30)])
        );
    }

    #[test]
    fn invert_empty_set_is_whole_span() {
        assert_eq!(invert_ranges(&[], 0, 30), ranges(&[(0, 30)]));
    }

    #[test]
    fn invert_keeps_interior_empty_gaps() {
        assert_eq!(
            invert_ranges(&ranges(&[(0, 2), (2, 4)]), 0, 4),
            ranges(&[(2, 2)])
        );
    }

    #[test]
    fn rune_cursor_counts_multibyte() {
        let text = "héllo wörld";
        let mut cursor = RuneCursor::new(text);
        let w = text.find('w').unwrap();
        assert_eq!(cursor.rune_at(w), 6);
        assert_eq!(cursor.rune_at(text.len()), 11);
        // going backwards restarts
        assert_eq!(cursor.rune_at(3), 2);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        fn arb_ranges() -> impl Strategy<Value = Vec<Range>> {
            prop::collection::vec((0..100usize, 0..20usize), 0..20)
                .prop_map(|v| v.into_iter().map(|(s, l)| Range::new(s, s + l)).collect())
        }

        proptest! {
            #[test]
            fn union_is_idempotent(input in arb_ranges()) {
                let once = union_of_ranges(input);
                let twice = union_of_ranges(once.clone());
                prop_assert_eq!(once, twice);
            }

            #[test]
            fn union_is_order_independent(input in arb_ranges()) {
                let mut reversed = input.clone();
                reversed.reverse();
                prop_assert_eq!(union_of_ranges(input), union_of_ranges(reversed));
            }

            #[test]
            fn union_covers_every_point(input in arb_ranges()) {
                let merged = union_of_ranges(input.clone());
                for r in &input {
                    for p in r.start..r.end {
                        prop_assert!(merged.iter().any(|m| m.contains(p)));
                    }
                }
            }
        }
    }
}
