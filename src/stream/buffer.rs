use super::{
    out_of_range, scanner::Scanner, Emitter, Field, OutputMode, SeekFrom, TextInput, TextOutput,
};
use crate::TextEncoding;
use std::{
    io::{self, Cursor},
    path::{Path, PathBuf},
};

/// Reads text from a borrowed byte buffer
///
/// The virtual path stands in for the location the data would have on disk
/// and is used to look up sidecar files.
///
/// ```
/// use pge_files::{BufferInput, TextEncoding, TextInput};
///
/// let data = b"HEAD\nHEAD_END\n";
/// let mut input = BufferInput::new(&data[..], "level.lvlx", TextEncoding::Utf8);
/// assert_eq!(input.read_line().unwrap(), "HEAD");
/// assert_eq!(input.read_line().unwrap(), "HEAD_END");
/// assert!(input.eof());
/// ```
#[derive(Debug)]
pub struct BufferInput<'a> {
    data: &'a [u8],
    path: PathBuf,
    scanner: Scanner<Cursor<&'a [u8]>>,
}

impl<'a> BufferInput<'a> {
    /// Wraps the buffer for reading with the given encoding
    pub fn new<P: Into<PathBuf>>(data: &'a [u8], path: P, encoding: TextEncoding) -> Self {
        BufferInput {
            data,
            path: path.into(),
            scanner: Scanner::new(Cursor::new(data), data.len() as u64, encoding),
        }
    }

    /// The wrapped buffer
    pub fn data(&self) -> &'a [u8] {
        self.data
    }
}

impl<'a> TextInput for BufferInput<'a> {
    fn read(&mut self, len: usize) -> io::Result<String> {
        self.scanner.read(len)
    }

    fn read_line(&mut self) -> io::Result<String> {
        self.scanner.read_line()
    }

    fn read_field(&mut self) -> io::Result<Field> {
        self.scanner.read_field()
    }

    fn read_all(&mut self) -> io::Result<String> {
        self.scanner.read_all()
    }

    fn eof(&self) -> bool {
        self.scanner.eof()
    }

    fn tell(&self) -> u64 {
        self.scanner.tell()
    }

    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.scanner.seek(pos)
    }

    fn line_number(&self) -> i64 {
        self.scanner.line_number()
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn encoding(&self) -> TextEncoding {
        self.scanner.encoding()
    }

    fn reopen(self, encoding: TextEncoding) -> io::Result<Self> {
        Ok(BufferInput::new(self.data, self.path, encoding))
    }
}

/// Writes text into a borrowed byte vector
///
/// ```
/// use pge_files::{OutputMode, TextOutput, TextOutputBuilder};
///
/// let mut data = b"head".to_vec();
/// let mut out = TextOutputBuilder::new()
///     .mode(OutputMode::Append)
///     .force_crlf(true)
///     .from_buffer(&mut data);
/// out.write("\ntail\n").unwrap();
/// assert_eq!(data, b"head\r\ntail\r\n");
/// ```
#[derive(Debug)]
pub struct BufferOutput<'a> {
    data: &'a mut Vec<u8>,
    pos: usize,
    emitter: Emitter,
}

impl<'a> BufferOutput<'a> {
    pub(crate) fn new(data: &'a mut Vec<u8>, mode: OutputMode, emitter: Emitter) -> Self {
        let pos = match mode {
            OutputMode::Truncate => {
                data.clear();
                0
            }
            OutputMode::Append => data.len(),
            OutputMode::Overwrite => 0,
        };

        BufferOutput { data, pos, emitter }
    }
}

impl<'a> TextOutput for BufferOutput<'a> {
    fn write(&mut self, text: &str) -> io::Result<usize> {
        let bytes = self.emitter.encode(text);
        if self.pos > self.data.len() {
            self.data.resize(self.pos, 0);
        }

        let overlap = (self.data.len() - self.pos).min(bytes.len());
        self.data[self.pos..self.pos + overlap].copy_from_slice(&bytes[..overlap]);
        self.data.extend_from_slice(&bytes[overlap..]);
        self.pos += bytes.len();
        Ok(bytes.len())
    }

    fn tell(&self) -> u64 {
        self.pos as u64
    }

    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(x) => Some(x),
            SeekFrom::Current(x) => (self.pos as u64).checked_add_signed(x),
            SeekFrom::End(x) => (self.data.len() as u64).checked_add_signed(x),
        };

        let target = target
            .and_then(|x| usize::try_from(x).ok())
            .ok_or_else(out_of_range)?;
        self.pos = target;
        Ok(target as u64)
    }

    fn line_number(&self) -> i64 {
        self.emitter.line_number()
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TextOutputBuilder;

    #[test]
    fn reopen_keeps_identity() {
        let data = b"\"Caf\xe9\"\n";
        let mut input = BufferInput::new(&data[..], "a.lvl", TextEncoding::Utf8);
        input.read_line().unwrap();

        let mut input = input.reopen(TextEncoding::Windows1252).unwrap();
        assert_eq!(input.tell(), 0);
        assert_eq!(input.line_number(), 0);
        assert_eq!(input.path(), Path::new("a.lvl"));
        assert_eq!(input.encoding(), TextEncoding::Windows1252);
        assert_eq!(input.read_line().unwrap(), "\"Café\"");

        let input = input.reopen(TextEncoding::Windows1252).unwrap();
        assert_eq!(input.encoding(), TextEncoding::Windows1252);
        assert!(std::ptr::eq(input.data(), &data[..]));
    }

    #[test]
    fn truncate_clears_buffer() {
        let mut data = b"stale".to_vec();
        let mut out = TextOutputBuilder::new().from_buffer(&mut data);
        assert_eq!(out.write("new").unwrap(), 3);
        assert_eq!(data, b"new");
    }

    #[test]
    fn overwrite_in_place() {
        let mut data = b"abcdef".to_vec();
        let mut out = TextOutputBuilder::new()
            .mode(OutputMode::Overwrite)
            .from_buffer(&mut data);
        out.write("XY").unwrap();
        out.seek(SeekFrom::End(-1)).unwrap();
        out.write("Z12").unwrap();
        assert_eq!(out.tell(), 8);
        assert_eq!(data, b"XYcdeZ12");
    }

    #[test]
    fn seek_past_end_pads() {
        let mut data = Vec::new();
        let mut out = TextOutputBuilder::new().from_buffer(&mut data);
        out.seek(SeekFrom::Start(2)).unwrap();
        out.write("a").unwrap();
        assert!(out.seek(SeekFrom::Current(-4)).is_err());
        assert_eq!(data, b"\0\0a");
    }

    #[test]
    fn windows1252_output() {
        let mut data = Vec::new();
        let mut out = TextOutputBuilder::new()
            .encoding(TextEncoding::Windows1252)
            .from_buffer(&mut data);
        assert_eq!(out.write("Café\n").unwrap(), 5);
        assert_eq!(out.line_number(), 2);
        assert_eq!(data, b"Caf\xe9\n");
    }
}
