use std::{fmt, io, path::PathBuf};

/// An error that can occur when opening or saving a level or world
#[derive(Debug)]
pub struct Error(Box<ErrorKind>);

impl Error {
    pub(crate) fn new(kind: ErrorKind) -> Error {
        Error(Box::new(kind))
    }

    pub(crate) fn open(err: io::Error) -> Error {
        Error::new(ErrorKind::Open(err))
    }

    pub(crate) fn parse(message: impl Into<String>, line_data: impl Into<String>, line: i64) -> Error {
        Error::new(ErrorKind::Parse(ParseError::new(message, line_data, line)))
    }

    /// Return the specific type of error
    pub fn kind(&self) -> &ErrorKind {
        &self.0
    }

    /// Consume the error and return the specific type of error
    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }

    /// Returns the 1-based line that the error occurs on (if available)
    pub fn line_number(&self) -> Option<i64> {
        match *self.0 {
            ErrorKind::Parse(ref err) => Some(err.line_number()),
            _ => None,
        }
    }
}

/// Specific type of error
#[derive(Debug)]
pub enum ErrorKind {
    /// The file or buffer could not be opened, or re-opened under another
    /// text encoding
    Open(io::Error),

    /// Reading from or writing to an already opened source failed
    Io(io::Error),

    /// The document body does not follow the grammar of its detected format
    Parse(ParseError),

    /// The `.meta` sidecar next to the primary file could not be read or written
    Sidecar { path: PathBuf, source: Box<Error> },

    /// The primary file could not be written
    Save { path: PathBuf, source: io::Error },

    /// The requested format is not one of the supported formats
    UnsupportedFormat,
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match *self.0 {
            ErrorKind::Open(ref err) => Some(err),
            ErrorKind::Io(ref err) => Some(err),
            ErrorKind::Parse(ref err) => Some(err),
            ErrorKind::Sidecar { ref source, .. } => Some(source.as_ref()),
            ErrorKind::Save { ref source, .. } => Some(source),
            ErrorKind::UnsupportedFormat => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self.0 {
            ErrorKind::Open(ref err) => write!(f, "can't open file: {}", err),
            ErrorKind::Io(ref err) => write!(f, "io error: {}", err),
            ErrorKind::Parse(ref err) => write!(f, "{}", err),
            ErrorKind::Sidecar { ref path, ref source } => {
                write!(f, "meta-file {}: {}", path.display(), source)
            }
            ErrorKind::Save { ref path, ref source } => {
                write!(f, "cannot save file {}: {}", path.display(), source)
            }
            ErrorKind::UnsupportedFormat => write!(f, "unsupported file type"),
        }
    }
}

impl From<io::Error> for Error {
    fn from(error: io::Error) -> Self {
        Error::new(ErrorKind::Io(error))
    }
}

impl From<ParseError> for Error {
    fn from(error: ParseError) -> Self {
        Error::new(ErrorKind::Parse(error))
    }
}

/// Diagnostic reported by a format parser when the document body is malformed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    message: String,
    line_data: String,
    line_number: i64,
}

impl ParseError {
    /// Creates a parse diagnostic for the given raw line
    pub fn new(message: impl Into<String>, line_data: impl Into<String>, line_number: i64) -> Self {
        ParseError {
            message: message.into(),
            line_data: line_data.into(),
            line_number,
        }
    }

    /// Human readable description of what is wrong
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The raw text of the offending line
    pub fn line_data(&self) -> &str {
        &self.line_data
    }

    /// The 1-based number of the offending line
    pub fn line_number(&self) -> i64 {
        self.line_number
    }
}

impl std::error::Error for ParseError {}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} (line {})", self.message, self.line_number)
    }
}
