//! Seekable text readers and writers over files or in-memory buffers.
//!
//! Every format parser and writer in this crate is written against the
//! [`TextInput`] and [`TextOutput`] traits so that a document can be loaded
//! from disk or from a byte buffer (eg: one embedded inside another container)
//! through the same code path.
//!
//! ```text
//! TextInput
//! ├── FileInput      (file on disk)
//! └── BufferInput    (borrowed byte slice)
//!
//! TextOutput
//! ├── FileOutput     (file on disk)
//! └── BufferOutput   (borrowed byte vector)
//! ```
//!
//! Offsets and lengths are measured in bytes of the underlying source, before
//! decoding. Both reader backends share one scanner so that identical bytes
//! always produce identical reads.

mod buffer;
mod file;
mod output;
mod scanner;

pub use buffer::*;
pub use file::*;
pub use output::*;
pub use std::io::SeekFrom;

use crate::TextEncoding;
use std::{io, path::Path};

/// What terminated a field returned by [`TextInput::read_field`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldEnd {
    /// An unquoted `,`
    Separator,

    /// A line terminator
    Line,

    /// The end of the source
    Eof,
}

/// A single comma separated field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Raw field text, quotes included
    pub value: String,

    /// What terminated the field
    pub end: FieldEnd,
}

impl Field {
    /// Returns true if this was the last field on its line
    pub fn ends_line(&self) -> bool {
        self.end != FieldEnd::Separator
    }
}

/// A seekable source of text
pub trait TextInput {
    /// Reads up to `len` bytes and decodes them
    fn read(&mut self, len: usize) -> io::Result<String>;

    /// Reads up to the next line terminator and moves past it. The terminator
    /// (`\n` or `\r\n`) is not part of the returned line.
    fn read_line(&mut self) -> io::Result<String>;

    /// Reads up to the next line terminator or unquoted `,`, whichever comes
    /// first, and moves past it
    fn read_field(&mut self) -> io::Result<Field>;

    /// Reads everything from the cursor to the end of the source
    fn read_all(&mut self) -> io::Result<String>;

    /// Returns true if the cursor is at the end of the source
    fn eof(&self) -> bool;

    /// Returns the cursor as a byte offset from the start of the source
    fn tell(&self) -> u64;

    /// Moves the cursor. Fails if the target lies before the start or past the
    /// end of the source.
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64>;

    /// The 1-based number of the line the last read touched, 0 before any read
    ///
    /// A seek does not recompute the counter, except that rewinding to offset
    /// zero resets it.
    fn line_number(&self) -> i64;

    /// The path of the file, or the virtual path given to a buffer
    fn path(&self) -> &Path;

    /// The encoding text is decoded with
    fn encoding(&self) -> TextEncoding;

    /// Closes the source and opens the same file or buffer again with another
    /// encoding. The returned reader starts at offset zero.
    fn reopen(self, encoding: TextEncoding) -> io::Result<Self>
    where
        Self: Sized;
}

/// A seekable sink for text
pub trait TextOutput {
    /// Encodes and writes the text at the cursor, returning the number of bytes
    /// written
    fn write(&mut self, text: &str) -> io::Result<usize>;

    /// Returns the cursor as a byte offset from the start of the sink
    fn tell(&self) -> u64;

    /// Moves the cursor. Fails if the target lies before the start.
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64>;

    /// The number of line terminators written so far plus one
    fn line_number(&self) -> i64;

    /// Pushes buffered data down to the underlying sink
    fn flush(&mut self) -> io::Result<()>;
}

pub(crate) fn out_of_range() -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, "seek target is out of range")
}
