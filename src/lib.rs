//! sx: structural regular expressions.
//!
//! A command such as `x/foo/ c/bar/` or `0/start/,/end/d` is parsed, compiled
//! into a [`Pipeline`] of stages, and run over a text buffer. The pipeline
//! does not edit the buffer itself; it reports edits to a
//! [`handler::Handler`].
//!
//! ```
//! use sx::{Config, Pipeline};
//! use sx::handler::{Event, Recorder};
//! use sx::range::Range;
//!
//! let pipeline = Pipeline::from_command("#6,#8d", Config::default()).unwrap();
//! let mut events = Recorder::new();
//! pipeline.execute_all(b"This is a test.", &mut events).unwrap();
//! assert_eq!(events.events[0], Event::Delete { range: Range::new(5, 8) });
//! ```

pub mod ast;
pub mod buffer;
pub mod config;
pub mod error;
pub mod handler;
pub mod interpreter;
pub mod parser;
pub mod range;
pub mod reverse;
pub mod scanner;
pub mod stages;
pub mod trace;

pub use config::Config;
pub use error::{Error, ErrorKind, Errors};
pub use interpreter::{Pipeline, compile};
