use super::{scanner::Scanner, Emitter, Field, OutputMode, SeekFrom, TextInput, TextOutput};
use crate::TextEncoding;
use std::{
    fs::{File, OpenOptions},
    io::{self, BufReader, BufWriter, Seek, Write},
    path::{Path, PathBuf},
};

/// Reads text from a file on disk
#[derive(Debug)]
pub struct FileInput {
    path: PathBuf,
    scanner: Scanner<BufReader<File>>,
}

impl FileInput {
    /// Opens the file for reading with the given encoding
    pub fn open<P: AsRef<Path>>(path: P, encoding: TextEncoding) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)?;
        let len = file.metadata()?.len();
        Ok(FileInput {
            path,
            scanner: Scanner::new(BufReader::new(file), len, encoding),
        })
    }
}

impl TextInput for FileInput {
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
        let FileInput { path, scanner } = self;

        // the handle is closed before the file is acquired again
        drop(scanner);
        FileInput::open(path, encoding)
    }
}

/// Writes text into a file on disk
///
/// Data is buffered; call [`TextOutput::flush`] before dropping to observe
/// write errors.
#[derive(Debug)]
pub struct FileOutput {
    path: PathBuf,
    writer: BufWriter<File>,
    pos: u64,
    emitter: Emitter,
}

impl FileOutput {
    pub(crate) fn open(path: &Path, mode: OutputMode, emitter: Emitter) -> io::Result<Self> {
        let mut options = OpenOptions::new();
        options.write(true).create(true);
        if mode == OutputMode::Truncate {
            options.truncate(true);
        }

        let mut file = options.open(path)?;
        let pos = match mode {
            OutputMode::Append => file.seek(SeekFrom::End(0))?,
            OutputMode::Truncate | OutputMode::Overwrite => 0,
        };

        Ok(FileOutput {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
            pos,
            emitter,
        })
    }

    /// The path of the file being written
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TextOutput for FileOutput {
    fn write(&mut self, text: &str) -> io::Result<usize> {
        let data = self.emitter.encode(text);
        self.writer.write_all(&data)?;
        self.pos += data.len() as u64;
        Ok(data.len())
    }

    fn tell(&self) -> u64 {
        self.pos
    }

    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.pos = self.writer.seek(pos)?;
        Ok(self.pos)
    }

    fn line_number(&self) -> i64 {
        self.emitter.line_number()
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}
