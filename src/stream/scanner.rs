use super::{out_of_range, Field, FieldEnd};
use crate::TextEncoding;
use std::io::{self, BufRead, Read, Seek, SeekFrom};

/// Cursor and line bookkeeping shared by the file and buffer readers
#[derive(Debug)]
pub(crate) struct Scanner<S> {
    src: S,
    pos: u64,
    len: u64,
    line: i64,
    at_line_start: bool,
    encoding: TextEncoding,
}

impl<S> Scanner<S>
where
    S: BufRead + Seek,
{
    pub fn new(src: S, len: u64, encoding: TextEncoding) -> Self {
        Scanner {
            src,
            pos: 0,
            len,
            line: 0,
            at_line_start: true,
            encoding,
        }
    }

    pub fn encoding(&self) -> TextEncoding {
        self.encoding
    }

    pub fn read(&mut self, len: usize) -> io::Result<String> {
        let mut buf = Vec::with_capacity(len.min(4096));
        (&mut self.src).take(len as u64).read_to_end(&mut buf)?;
        self.advance(&buf);
        Ok(self.decode(buf))
    }

    pub fn read_line(&mut self) -> io::Result<String> {
        let mut buf = Vec::new();
        self.src.read_until(b'\n', &mut buf)?;
        self.advance(&buf);
        if buf.last() == Some(&b'\n') {
            buf.pop();
            if buf.last() == Some(&b'\r') {
                buf.pop();
            }
        }
        Ok(self.decode(buf))
    }

    pub fn read_field(&mut self) -> io::Result<Field> {
        let mut buf = Vec::new();
        let mut quoted = false;
        let end = loop {
            let available = self.src.fill_buf()?;
            if available.is_empty() {
                break FieldEnd::Eof;
            }

            let mut consumed = 0;
            let mut end = None;
            for &b in available {
                consumed += 1;
                match b {
                    b'\n' => {
                        end = Some(FieldEnd::Line);
                        break;
                    }
                    b',' if !quoted => {
                        end = Some(FieldEnd::Separator);
                        break;
                    }
                    b'"' => {
                        quoted = !quoted;
                        buf.push(b);
                    }
                    _ => buf.push(b),
                }
            }

            let chunk = available[..consumed].to_vec();
            self.src.consume(consumed);
            self.advance(&chunk);
            if let Some(end) = end {
                break end;
            }
        };

        if end == FieldEnd::Line && buf.last() == Some(&b'\r') {
            buf.pop();
        }

        Ok(Field {
            value: self.decode(buf),
            end,
        })
    }

    pub fn read_all(&mut self) -> io::Result<String> {
        let mut buf = Vec::new();
        self.src.read_to_end(&mut buf)?;
        self.advance(&buf);
        Ok(self.decode(buf))
    }

    pub fn eof(&self) -> bool {
        self.pos >= self.len
    }

    pub fn tell(&self) -> u64 {
        self.pos
    }

    pub fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(x) => Some(x),
            SeekFrom::Current(x) => self.pos.checked_add_signed(x),
            SeekFrom::End(x) => self.len.checked_add_signed(x),
        };

        let target = target
            .filter(|&x| x <= self.len)
            .ok_or_else(out_of_range)?;

        self.src.seek(SeekFrom::Start(target))?;
        self.pos = target;
        if target == 0 {
            self.line = 0;
            self.at_line_start = true;
        }

        Ok(target)
    }

    pub fn line_number(&self) -> i64 {
        self.line
    }

    fn advance(&mut self, consumed: &[u8]) {
        self.pos += consumed.len() as u64;
        for &b in consumed {
            if self.at_line_start {
                self.line += 1;
                self.at_line_start = false;
            }

            if b == b'\n' {
                self.at_line_start = true;
            }
        }
    }

    fn decode(&self, buf: Vec<u8>) -> String {
        match self.encoding {
            TextEncoding::Utf8 => match String::from_utf8(buf) {
                Ok(s) => s,
                Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
            },
            encoding => encoding.decode(&buf).into_owned(),
        }
    }
}
