//! Error types for the sx interpreter.

use std::fmt;

/// What went wrong, broadly.
///
/// `Internal` marks a broken invariant inside the interpreter (a bug), as
/// opposed to bad input from the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The command or regex text could not be scanned or parsed.
    Syntax,
    /// A pattern failed to compile.
    Regex,
    /// Execution failed on otherwise valid input.
    Runtime,
    /// An interpreter invariant was violated.
    Internal,
}

/// An error with an optional source position.
#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    pub kind: ErrorKind,
    pub message: String,
    /// 1-based character position in the command or pattern text.
    pub position: Option<usize>,
}

impl Error {
    fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            position: None,
        }
    }

    /// Create a syntax error at a 0-based character offset.
    pub fn syntax(message: impl Into<String>, offset: usize) -> Self {
        Self::new(ErrorKind::Syntax, message).at_offset(offset)
    }

    /// Create a pattern compilation error.
    pub fn regex(pattern: &str, err: impl fmt::Display) -> Self {
        Self::new(
            ErrorKind::Regex,
            format!("invalid regex '{}': {}", pattern, err),
        )
    }

    /// Create a runtime error with just a message.
    pub fn runtime(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Runtime, message)
    }

    /// Create an internal (logic) error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Attach a 0-based character offset, stored 1-based.
    pub fn at_offset(mut self, offset: usize) -> Self {
        self.position = Some(offset + 1);
        self
    }

    pub fn is_internal(&self) -> bool {
        self.kind == ErrorKind::Internal
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.kind == ErrorKind::Internal {
            write!(f, "internal error: ")?;
        }
        write!(f, "{}", self.message)?;
        match self.position {
            Some(pos) => write!(f, " (at position {})", pos),
            None => Ok(()),
        }
    }
}

impl std::error::Error for Error {}

/// Errors accumulated by the scanners and parsers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Errors(Vec<Error>);

impl Errors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, err: Error) {
        self.0.push(err);
    }

    pub fn extend(&mut self, other: Errors) {
        self.0.extend(other.0);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Error> {
        self.0.iter()
    }

    /// True if any collected error is an internal one.
    pub fn has_internal(&self) -> bool {
        self.0.iter().any(Error::is_internal)
    }

    /// `Ok(value)` if nothing was collected, otherwise `Err(self)`.
    pub fn into_result<T>(self, value: T) -> std::result::Result<T, Errors> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

impl From<Error> for Errors {
    fn from(err: Error) -> Self {
        Errors(vec![err])
    }
}

impl IntoIterator for Errors {
    type Item = Error;
    type IntoIter = std::vec::IntoIter<Error>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl fmt::Display for Errors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for err in &self.0 {
            if !first {
                writeln!(f)?;
            }
            first = false;
            write!(f, "{}", err)?;
        }
        Ok(())
    }
}

impl std::error::Error for Errors {}

/// Result type for interpreter operations.
pub type Result<T> = std::result::Result<T, Error>;
