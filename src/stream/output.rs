use super::{BufferOutput, FileOutput};
use crate::TextEncoding;
use std::{borrow::Cow, io, path::Path};

/// How a writer treats data already present in its target
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Discard existing data
    #[default]
    Truncate,

    /// Keep existing data and start writing after it
    Append,

    /// Keep existing data and start writing over it from the beginning
    Overwrite,
}

/// Construct a customized text writer
///
/// ```
/// use pge_files::{TextEncoding, TextOutput, TextOutputBuilder};
///
/// let mut out: Vec<u8> = Vec::new();
/// let mut writer = TextOutputBuilder::new()
///     .encoding(TextEncoding::Windows1252)
///     .force_crlf(true)
///     .from_buffer(&mut out);
/// writer.write("64\n\"Café\"\n").unwrap();
/// assert_eq!(&out, b"64\r\n\"Caf\xe9\"\r\n");
/// ```
#[derive(Debug, Default, Clone)]
pub struct TextOutputBuilder {
    encoding: TextEncoding,
    force_crlf: bool,
    mode: OutputMode,
}

impl TextOutputBuilder {
    /// Creates a builder for UTF-8 output with native line endings that
    /// truncates its target
    pub fn new() -> Self {
        TextOutputBuilder::default()
    }

    /// Sets the encoding text is written with
    pub fn encoding(mut self, encoding: TextEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// When set, every line terminator is written as `\r\n`
    pub fn force_crlf(mut self, force_crlf: bool) -> Self {
        self.force_crlf = force_crlf;
        self
    }

    /// Sets how existing data in the target is treated
    pub fn mode(mut self, mode: OutputMode) -> Self {
        self.mode = mode;
        self
    }

    /// Opens or creates the file for writing
    pub fn open<P: AsRef<Path>>(&self, path: P) -> io::Result<FileOutput> {
        FileOutput::open(path.as_ref(), self.mode, self.emitter())
    }

    /// Writes into the given byte vector
    pub fn from_buffer<'a>(&self, data: &'a mut Vec<u8>) -> BufferOutput<'a> {
        BufferOutput::new(data, self.mode, self.emitter())
    }

    fn emitter(&self) -> Emitter {
        Emitter {
            encoding: self.encoding,
            force_crlf: self.force_crlf,
            prev_cr: false,
            line: 1,
        }
    }
}

/// Line ending and encoding policy shared by the file and buffer writers
#[derive(Debug)]
pub(crate) struct Emitter {
    encoding: TextEncoding,
    force_crlf: bool,
    /// The last character written was `\r`
    prev_cr: bool,
    line: i64,
}

impl Emitter {
    pub fn encode<'a>(&mut self, text: &'a str) -> Cow<'a, [u8]> {
        let terminators = text.bytes().filter(|&b| b == b'\n').count();
        self.line += terminators as i64;

        let prev_cr = self.prev_cr;
        if !text.is_empty() {
            self.prev_cr = text.ends_with('\r');
        }

        let text = if self.force_crlf && terminators != 0 {
            Cow::Owned(to_crlf(text, prev_cr))
        } else {
            Cow::Borrowed(text)
        };

        match text {
            Cow::Borrowed(x) => self.encoding.encode(x),
            Cow::Owned(x) => Cow::Owned(self.encoding.encode(&x).into_owned()),
        }
    }

    pub fn line_number(&self) -> i64 {
        self.line
    }
}

fn to_crlf(text: &str, prev_cr: bool) -> String {
    let mut result = String::with_capacity(text.len() + text.len() / 8);
    let mut prev_cr = prev_cr;
    for c in text.chars() {
        if c == '\n' && !prev_cr {
            result.push('\r');
        }
        result.push(c);
        prev_cr = c == '\r';
    }
    result
}
