//! The receiving end of a pipeline run.
//!
//! The interpreter never owns the document. It reports edits and displays to
//! a [`Handler`], with offsets already adjusted for every earlier edit in the
//! same run, and the handler decides what to do with them.

use serde::Serialize;

use crate::buffer::Buffer;
use crate::error::Result;
use crate::range::Range;

pub trait Handler {
    fn delete(&mut self, range: Range);
    fn insert(&mut self, index: usize, text: &str);
    /// `=`: show where a range is.
    fn display(&mut self, range: Range);
    /// `p`: show what a range holds, after `prefix`.
    fn display_contents(&mut self, range: Range, prefix: &str);
    /// A range selected by a command with no editing or display command.
    fn noop(&mut self, range: Range);
    fn done(&mut self);
}

/// One handler call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Event {
    Delete { range: Range },
    Insert { index: usize, text: String },
    Display { range: Range },
    DisplayContents { range: Range, prefix: String },
    Noop { range: Range },
    Done,
}

/// Records every call, in order.
#[derive(Debug, Default, Clone)]
pub struct Recorder {
    pub events: Vec<Event>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events other than `Done`.
    pub fn edits(&self) -> impl Iterator<Item = &Event> {
        self.events.iter().filter(|e| **e != Event::Done)
    }
}

impl Handler for Recorder {
    fn delete(&mut self, range: Range) {
        self.events.push(Event::Delete { range });
    }

    fn insert(&mut self, index: usize, text: &str) {
        self.events.push(Event::Insert {
            index,
            text: text.to_string(),
        });
    }

    fn display(&mut self, range: Range) {
        self.events.push(Event::Display { range });
    }

    fn display_contents(&mut self, range: Range, prefix: &str) {
        self.events.push(Event::DisplayContents {
            range,
            prefix: prefix.to_string(),
        });
    }

    fn noop(&mut self, range: Range) {
        self.events.push(Event::Noop { range });
    }

    fn done(&mut self) {
        self.events.push(Event::Done);
    }
}

/// Applies edits to its own copy of the document and collects display output.
///
/// Handler calls cannot fail, so the first edit that does not fit the
/// document is kept and reported by [`Editor::finish`].
#[derive(Debug, Default)]
pub struct Editor {
    buffer: Buffer,
    output: Vec<String>,
    error: Option<crate::error::Error>,
    finished: bool,
}

impl Editor {
    pub fn new(buffer: Buffer) -> Self {
        Self {
            buffer,
            ..Self::default()
        }
    }

    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    /// Display output from `p` and `=`, one entry per call.
    pub fn output(&self) -> &[String] {
        &self.output
    }

    /// Whether the run reached `done`.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// The edited document and the display output.
    pub fn finish(self) -> Result<(Buffer, Vec<String>)> {
        match self.error {
            Some(err) => Err(err),
            None => Ok((self.buffer, self.output)),
        }
    }

    fn record(&mut self, result: Result<()>) {
        if let Err(err) = result {
            self.error.get_or_insert(err);
        }
    }
}

impl Handler for Editor {
    fn delete(&mut self, range: Range) {
        let result = self.buffer.delete(range);
        self.record(result);
    }

    fn insert(&mut self, index: usize, text: &str) {
        let result = self.buffer.insert(index, text);
        self.record(result);
    }

    fn display(&mut self, range: Range) {
        self.output.push(format!("#{},#{}", range.start, range.end));
    }

    fn display_contents(&mut self, range: Range, prefix: &str) {
        let text = self.buffer.text(range);
        self.output.push(format!("{}{}", prefix, text));
    }

    fn noop(&mut self, _range: Range) {}

    fn done(&mut self) {
        self.finished = true;
    }
}
