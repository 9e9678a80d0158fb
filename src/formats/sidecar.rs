//! The `.meta` sidecar stored next to legacy documents. It shares the PGE-X
//! grammar and holds editor data that the legacy formats have no room for.

use super::pgex::{write_section, EntryWriter, SectionReader};
use crate::{
    meta::{Bookmark, MetaData},
    stream::{TextInput, TextOutput},
    Error,
};
use std::io;

const BOOKMARKS: &str = "META_BOOKMARKS";

pub(crate) fn read_meta_data<R: TextInput>(input: &mut R, data: &mut MetaData) -> Result<(), Error> {
    let mut reader = SectionReader::new(input);
    while let Some(section) = reader.next_section()? {
        if section != BOOKMARKS {
            reader.skip_section(&section)?;
            continue;
        }

        while let Some(entry) = reader.next_entry(&section)? {
            let mut bookmark = Bookmark::default();
            for (key, value) in entry.pairs() {
                match key {
                    "BM" => bookmark.name = entry.string(key, value)?,
                    "X" => bookmark.x = entry.number(key, value)?,
                    "Y" => bookmark.y = entry.number(key, value)?,
                    _ => {}
                }
            }
            data.bookmarks.push(bookmark);
        }
    }

    Ok(())
}

pub(crate) fn write_meta_data<W: TextOutput>(out: &mut W, data: &MetaData) -> io::Result<()> {
    write_section(out, BOOKMARKS, &data.bookmarks, |x| {
        EntryWriter::new()
            .string("BM", &x.name)
            .float("X", x.x)
            .float("Y", x.y)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BufferInput, TextEncoding, TextOutputBuilder};

    #[test]
    fn bookmarks_survive() {
        let data = MetaData {
            bookmarks: vec![
                Bookmark {
                    name: String::from("boss room"),
                    x: -199_840.0,
                    y: -200_512.5,
                },
                Bookmark {
                    name: String::from("start"),
                    x: 0.0,
                    y: 0.0,
                },
            ],
        };

        let mut buf = Vec::new();
        let mut out = TextOutputBuilder::new().from_buffer(&mut buf);
        write_meta_data(&mut out, &data).unwrap();
        assert!(buf.starts_with(b"META_BOOKMARKS\nBM:\"boss room\";X:-199840;Y:-200512.5;\n"));

        let mut input = BufferInput::new(&buf[..], "", TextEncoding::Utf8);
        let mut parsed = MetaData::default();
        read_meta_data(&mut input, &mut parsed).unwrap();
        assert_eq!(parsed, data);
    }

    #[test]
    fn malformed_coordinate() {
        let data = b"META_BOOKMARKS\nBM:\"a\";X:left;Y:0;\nMETA_BOOKMARKS_END\n";
        let mut input = BufferInput::new(&data[..], "", TextEncoding::Utf8);
        let mut parsed = MetaData::default();
        let err = read_meta_data(&mut input, &mut parsed).unwrap_err();
        assert_eq!(err.line_number(), Some(2));
    }
}
