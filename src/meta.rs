use crate::{Error, ErrorKind, FileFormat};

/// Message recorded when the primary source cannot be opened
pub const CANT_OPEN_FILE: &str = "Can't open file";

/// Message recorded when the `.meta` sidecar cannot be loaded
pub const CANT_OPEN_META_FILE: &str = "Can't open meta-file";

/// Message recorded when a save is requested in an unknown format
pub const UNSUPPORTED_FILE_TYPE: &str = "Unsupported file type";

/// Validity and diagnostics of the last open or save of a document
///
/// When `read_file_valid` is false the error fields describe what went wrong
/// and the rest of the document is incomplete.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FileMeta {
    /// False once an open failed
    pub read_file_valid: bool,

    /// Human readable error, empty when there is none
    pub error_info: String,

    /// Raw text of the line an error was found on
    pub error_line_data: String,

    /// 1-based line an error was found on, -1 when not applicable
    pub error_line_number: i64,

    /// Format of the last successful open or save
    pub recent_format: FileFormat,

    /// Format version of the last successful open or save
    pub recent_format_version: u32,

    /// File name without extension
    pub filename: String,

    /// Directory containing the file
    pub path: String,
}

impl Default for FileMeta {
    fn default() -> Self {
        FileMeta {
            read_file_valid: true,
            error_info: String::new(),
            error_line_data: String::new(),
            error_line_number: -1,
            recent_format: FileFormat::default(),
            recent_format_version: 0,
            filename: String::new(),
            path: String::new(),
        }
    }
}

impl FileMeta {
    /// Records why an open failed
    pub fn record(&mut self, err: &Error) {
        self.read_file_valid = false;
        match err.kind() {
            ErrorKind::Parse(parse) => {
                self.error_info = parse.message().to_string();
                self.error_line_data = parse.line_data().to_string();
                self.error_line_number = parse.line_number();
            }
            ErrorKind::UnsupportedFormat => {
                self.error_info = String::from(UNSUPPORTED_FILE_TYPE);
                self.error_line_data.clear();
                self.error_line_number = -1;
            }
            ErrorKind::Open(_) | ErrorKind::Io(_) => {
                self.error_info = String::from(CANT_OPEN_FILE);
                self.error_line_data.clear();
                self.error_line_number = -1;
            }
            ErrorKind::Sidecar { .. } | ErrorKind::Save { .. } => {
                self.error_info = err.to_string();
                self.error_line_data.clear();
                self.error_line_number = -1;
            }
        }
    }
}

/// Editor data that the legacy formats cannot store, kept in a `.meta` file
/// next to the document
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MetaData {
    pub bookmarks: Vec<Bookmark>,
}

impl MetaData {
    /// Returns true if there is nothing worth writing to a sidecar
    pub fn is_empty(&self) -> bool {
        self.bookmarks.is_empty()
    }
}

/// A named camera position
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bookmark {
    pub name: String,
    pub x: f64,
    pub y: f64,
}
