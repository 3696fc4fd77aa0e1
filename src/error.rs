//! Error handling: the bounded, best-effort `ParseErrorList` that the
//! tokenizer/tree builder append to while recovering from malformed markup,
//! and the `thiserror`-derived types raised synchronously at API boundaries
//! (bad arguments, selector syntax errors, I/O).

use std::fmt;

/// Byte offset plus 1-based line/column. Untracked positions use `(-1,-1,-1)`
/// marking where a token or error occurred in the source.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Position {
    pub offset: i64,
    pub line: i64,
    pub column: i64,
}

impl Position {
    pub const UNTRACKED: Position = Position {
        offset: -1,
        line: -1,
        column: -1,
    };

    pub fn is_tracked(&self) -> bool {
        *self != Self::UNTRACKED
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_tracked() {
            write!(f, "{}:{}", self.line, self.column)
        } else {
            write!(f, "?:?")
        }
    }
}

/// A single recovered parse error.
#[derive(Clone, Debug)]
pub struct ParseError {
    pub position: Position,
    pub message: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.position, self.message)
    }
}

/// Bounded accumulator of `ParseError`s. Tracking is off by default
/// (`max == 0`); `set_track_errors(max)` enables it with a cap.
#[derive(Clone, Debug, Default)]
pub struct ParseErrorList {
    errors: Vec<ParseError>,
    max: usize,
}

impl ParseErrorList {
    pub fn new() -> ParseErrorList {
        ParseErrorList {
            errors: Vec::new(),
            max: 0,
        }
    }

    pub fn with_max(max: usize) -> ParseErrorList {
        ParseErrorList {
            errors: Vec::new(),
            max,
        }
    }

    pub fn set_max(&mut self, max: usize) {
        self.max = max;
    }

    pub fn is_tracking(&self) -> bool {
        self.max > 0
    }

    /// Appends an error if tracking is enabled and the cap has not been hit.
    /// Invariant: `len() <= max` always holds.
    pub fn push(&mut self, position: Position, message: impl Into<String>) {
        if self.max == 0 || self.errors.len() >= self.max {
            return;
        }
        self.errors.push(ParseError {
            position,
            message: message.into(),
        });
    }

    pub fn as_slice(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ParseError> {
        self.errors.iter()
    }
}

/// Errors raised synchronously at the public API boundary. Malformed HTML
/// itself is never reported here — see `ParseErrorList` — only misuse of
/// the API (null/empty arguments) and selector compilation failures are.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("{field} must not be empty")]
    EmptyArgument { field: &'static str },

    #[error("{field} must be non-negative, got {value}")]
    NegativeArgument { field: &'static str, value: i64 },

    #[error("selector error: {0}")]
    Selector(#[from] crate::select::SelectorError),

    #[error("no element matched selector {query:?}")]
    NoMatch { query: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
