use std::error::Error as StdError;
use std::fmt;
use std::io;

use crate::path::Path;

/// Failures produced while turning template source text into an `Element`
/// tree.
#[derive(Debug)]
pub enum ParseError {
    /// A section's closing tag named a different path than its opening tag,
    /// e.g. `{{#one}}...{{/two}}`.
    InvalidSection(Path, Path),
    /// A `{{/name}}` appeared with no matching `{{#name}}`/`{{^name}}` open.
    UnmatchedClose(Path),
    /// Template source ended with a section still open.
    UnclosedSection(Path),
    /// The grammar rejected the input; the message is pest's own diagnostic.
    UnexpectedToken(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ParseError::InvalidSection(ref open, ref close) => {
                write!(f, "section open and close must match: {}, {}", open, close)
            }
            ParseError::UnmatchedClose(ref path) => {
                write!(f, "closing tag `{{{{/{}}}}}` has no matching open", path)
            }
            ParseError::UnclosedSection(ref path) => {
                write!(f, "section `{{{{#{}}}}}` was never closed", path)
            }
            ParseError::UnexpectedToken(ref message) => write!(f, "{}", message),
        }
    }
}

impl StdError for ParseError {}

/// The error surface returned by this crate's render/parse entry points.
/// Missing keys, broken dotted chains, empty sections, and falsey lambdas
/// are never surfaced as errors: they render as empty text.
#[derive(Debug)]
pub enum Error {
    /// Template source could not be parsed.
    Parse(ParseError),
    /// A file could not be read, or the output sink refused bytes.
    Io(io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::Parse(ref e) => write!(f, "{}", e),
            Error::Io(ref e) => write!(f, "{}", e),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match *self {
            Error::Parse(ref e) => Some(e),
            Error::Io(ref e) => Some(e),
        }
    }
}

impl From<ParseError> for Error {
    fn from(e: ParseError) -> Self {
        Error::Parse(e)
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}
