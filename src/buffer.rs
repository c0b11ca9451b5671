//! Rune-indexed working copy of the text being interpreted.

use std::borrow::Cow;
use std::fmt;

use ropey::Rope;

use crate::error::{Error, Result};
use crate::range::Range;

/// A text buffer addressed by rune offsets.
///
/// Address and operation stages read it; command stages apply the same edits
/// they report to the handler so later commands see current text.
#[derive(Debug, Clone, Default)]
pub struct Buffer {
    rope: Rope,
}

impl Buffer {
    /// Decode a byte buffer. Invalid UTF-8 is replaced, one rune per bad sequence.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self::from_text(&String::from_utf8_lossy(bytes))
    }

    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
        }
    }

    /// Length in runes.
    pub fn len(&self) -> usize {
        self.rope.len_chars()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The range covering the whole buffer.
    pub fn full(&self) -> Range {
        Range::new(0, self.len())
    }

    /// Clip a range to the buffer.
    pub fn clamp(&self, r: Range) -> Range {
        let len = self.len();
        Range::new(r.start.min(len), r.end.min(len))
    }

    /// The text inside `r`, borrowed when the rope stores it contiguously.
    pub fn text(&self, r: Range) -> Cow<'_, str> {
        let r = self.clamp(r);
        let slice = self.rope.slice(r.start..r.end);
        match slice.as_str() {
            Some(s) => Cow::Borrowed(s),
            None => Cow::Owned(slice.to_string()),
        }
    }

    /// Iterate the runes inside `r`.
    pub fn chars(&self, r: Range) -> ropey::iter::Chars<'_> {
        let r = self.clamp(r);
        self.rope.slice(r.start..r.end).chars()
    }

    /// A new buffer holding the runes of `r` in reverse order.
    pub fn reversed(&self, r: Range) -> Buffer {
        let text: String = self.text(r).chars().rev().collect();
        Buffer::from_text(&text)
    }

    pub fn delete(&mut self, r: Range) -> Result<()> {
        if r.end > self.len() {
            return Err(Error::internal(format!(
                "delete {} past end of buffer ({} runes)",
                r,
                self.len()
            )));
        }
        self.rope.remove(r.start..r.end);
        Ok(())
    }

    pub fn insert(&mut self, index: usize, text: &str) -> Result<()> {
        if index > self.len() {
            return Err(Error::internal(format!(
                "insert at {} past end of buffer ({} runes)",
                index,
                self.len()
            )));
        }
        self.rope.insert(index, text);
        Ok(())
    }
}

impl fmt::Display for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for chunk in self.rope.chunks() {
            f.write_str(chunk)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_counts_runes() {
        let buf = Buffer::from_text("héllo");
        assert_eq!(buf.len(), 5);
        assert_eq!(buf.full(), Range::new(0, 5));
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let buf = Buffer::from_bytes(b"a\xffb");
        assert_eq!(buf.to_string(), "a\u{fffd}b");
        assert_eq!(buf.len(), 3);
    }

    #[test]
    fn text_of_range() {
        let buf = Buffer::from_text("This is a test.");
        assert_eq!(buf.text(Range::new(5, 7)), "is");
        assert_eq!(buf.text(Range::new(10, 99)), "test.");
    }

    #[test]
    fn reversed_slice() {
        let buf = Buffer::from_text("abcdef");
        assert_eq!(buf.reversed(Range::new(1, 4)).to_string(), "dcb");
    }

    #[test]
    fn delete_and_insert() {
        let mut buf = Buffer::from_text("hello world");
        buf.delete(Range::new(0, 5)).unwrap();
        buf.insert(0, "goodbye").unwrap();
        assert_eq!(buf.to_string(), "goodbye world");
    }

    #[test]
    fn edits_past_end_are_internal_errors() {
        let mut buf = Buffer::from_text("abc");
        assert!(buf.delete(Range::new(1, 9)).unwrap_err().is_internal());
        assert!(buf.insert(9, "x").unwrap_err().is_internal());
    }
}
