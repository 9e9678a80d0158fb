//! SMBX-38A: UTF-8 comma separated records, one per line, led by a tag naming
//! the kind of record. The first line is `SMBXFile` followed by the version.

use super::{push_int, push_quoted, unquote, Integer};
use crate::{
    detect::SMBX38A_MAGIC,
    level::{LevelBlock, LevelData, LevelNpc, LevelSection},
    stream::{TextInput, TextOutput},
    world::{WorldData, WorldLevel, WorldTile},
    Error,
};
use std::{io, str::FromStr};

/// Newest file format version
pub const SMBX38A_VERSION: u32 = 66;

#[derive(Debug)]
struct Record {
    fields: Vec<String>,
    line_number: i64,
}

impl Record {
    fn tag(&self) -> &str {
        self.fields[0].trim()
    }

    fn line(&self) -> String {
        self.fields.join(",")
    }

    fn error(&self, message: String) -> Error {
        Error::parse(message, self.line(), self.line_number)
    }

    fn expect(&self, count: usize) -> Result<(), Error> {
        if self.fields.len() != count {
            return Err(self.error(format!(
                "Wrong number of fields in {} record: expected {}, found {}",
                self.tag(),
                count,
                self.fields.len()
            )));
        }

        Ok(())
    }

    fn number<T: FromStr>(&self, index: usize, what: &str) -> Result<T, Error> {
        self.fields[index]
            .trim()
            .parse()
            .map_err(|_| self.error(format!("Invalid {}", what)))
    }

    fn flag(&self, index: usize, what: &str) -> Result<bool, Error> {
        match self.fields[index].trim() {
            "0" => Ok(false),
            "1" => Ok(true),
            _ => Err(self.error(format!("Invalid {}", what))),
        }
    }

    fn string(&self, index: usize, what: &str) -> Result<String, Error> {
        match unquote(self.fields[index].trim()) {
            Some(x) => Ok(x.to_string()),
            None => Err(self.error(format!("Invalid {}", what))),
        }
    }
}

struct RecordReader<'a, R> {
    input: &'a mut R,
}

impl<'a, R> RecordReader<'a, R>
where
    R: TextInput,
{
    fn new(input: &'a mut R) -> Self {
        RecordReader { input }
    }

    /// Reads the fields of the next non-blank line
    fn next(&mut self) -> Result<Option<Record>, Error> {
        while !self.input.eof() {
            let first = self.input.read_field()?;
            let line_number = self.input.line_number();
            let mut last = first.ends_line();
            let mut fields = vec![first.value];
            while !last {
                let field = self.input.read_field()?;
                last = field.ends_line();
                fields.push(field.value);
            }

            if fields.len() == 1 && fields[0].trim().is_empty() {
                continue;
            }

            return Ok(Some(Record {
                fields,
                line_number,
            }));
        }

        Ok(None)
    }

    fn version(&mut self) -> Result<u32, Error> {
        let record = self.next()?.ok_or_else(|| {
            Error::parse("Missing SMBX-38A file header", "", self.input.line_number())
        })?;

        let line = record.line();
        line.trim()
            .strip_prefix(SMBX38A_MAGIC)
            .and_then(|x| x.parse().ok())
            .ok_or_else(|| record.error(String::from("Invalid SMBX-38A file header")))
    }
}

fn read_level_head(record: &Record, data: &mut LevelData) -> Result<(), Error> {
    record.expect(3)?;
    data.stars = record.number(1, "star count")?;
    data.title = record.string(2, "level title")?;
    Ok(())
}

pub(crate) fn read_level<R: TextInput>(input: &mut R, data: &mut LevelData) -> Result<(), Error> {
    let mut records = RecordReader::new(input);
    data.meta.recent_format_version = records.version()?;

    while let Some(record) = records.next()? {
        match record.tag() {
            "A" => read_level_head(&record, data)?,
            "S" => {
                record.expect(8)?;
                data.sections.push(LevelSection {
                    id: record.number(1, "section id")?,
                    left: record.number(2, "section left edge")?,
                    top: record.number(3, "section top edge")?,
                    right: record.number(4, "section right edge")?,
                    bottom: record.number(5, "section bottom edge")?,
                    music_id: record.number(6, "section music")?,
                    background_id: record.number(7, "section background")?,
                });
            }
            "B" => {
                record.expect(7)?;
                data.blocks.push(LevelBlock {
                    id: record.number(1, "block id")?,
                    x: record.number(2, "block x position")?,
                    y: record.number(3, "block y position")?,
                    w: record.number(4, "block width")?,
                    h: record.number(5, "block height")?,
                    layer: record.string(6, "block layer")?,
                });
            }
            "N" => {
                record.expect(7)?;
                data.npcs.push(LevelNpc {
                    id: record.number(1, "npc id")?,
                    x: record.number(2, "npc x position")?,
                    y: record.number(3, "npc y position")?,
                    direction: record.number(4, "npc direction")?,
                    friendly: record.flag(5, "npc friendly flag")?,
                    layer: record.string(6, "npc layer")?,
                });
            }
            tag => log::trace!("skipping unknown {} record", tag),
        }
    }

    Ok(())
}

/// Reads the file header and the `A` record if it directly follows
pub(crate) fn read_level_header<R: TextInput>(
    input: &mut R,
    data: &mut LevelData,
) -> Result<(), Error> {
    let mut records = RecordReader::new(input);
    data.meta.recent_format_version = records.version()?;
    if let Some(record) = records.next()? {
        if record.tag() == "A" {
            read_level_head(&record, data)?;
        }
    }

    Ok(())
}

fn read_world_head(record: &Record, data: &mut WorldData) -> Result<(), Error> {
    record.expect(3)?;
    data.stars = record.number(1, "star count")?;
    data.title = record.string(2, "world title")?;
    Ok(())
}

pub(crate) fn read_world<R: TextInput>(input: &mut R, data: &mut WorldData) -> Result<(), Error> {
    let mut records = RecordReader::new(input);
    data.meta.recent_format_version = records.version()?;

    while let Some(record) = records.next()? {
        match record.tag() {
            "A" => read_world_head(&record, data)?,
            "T" => {
                record.expect(4)?;
                data.tiles.push(WorldTile {
                    id: record.number(1, "tile id")?,
                    x: record.number(2, "tile x position")?,
                    y: record.number(3, "tile y position")?,
                });
            }
            "L" => {
                record.expect(6)?;
                data.levels.push(WorldLevel {
                    id: record.number(1, "level entrance id")?,
                    x: record.number(2, "level entrance x position")?,
                    y: record.number(3, "level entrance y position")?,
                    file: record.string(4, "level file")?,
                    title: record.string(5, "level entrance title")?,
                });
            }
            tag => log::trace!("skipping unknown {} record", tag),
        }
    }

    Ok(())
}

pub(crate) fn read_world_header<R: TextInput>(
    input: &mut R,
    data: &mut WorldData,
) -> Result<(), Error> {
    let mut records = RecordReader::new(input);
    data.meta.recent_format_version = records.version()?;
    if let Some(record) = records.next()? {
        if record.tag() == "A" {
            read_world_head(&record, data)?;
        }
    }

    Ok(())
}

/// Builds one comma separated record
struct RecordWriter {
    line: String,
}

impl RecordWriter {
    fn new(tag: &str) -> Self {
        RecordWriter {
            line: String::from(tag),
        }
    }

    fn int<I: Integer>(mut self, value: I) -> Self {
        self.line.push(',');
        push_int(&mut self.line, value);
        self
    }

    fn string(mut self, value: &str) -> Self {
        self.line.push(',');
        push_quoted(&mut self.line, value);
        self
    }

    fn finish(mut self) -> String {
        self.line.push('\n');
        self.line
    }
}

fn header(version: u32) -> String {
    let version = match version {
        0 => SMBX38A_VERSION,
        x => x.min(SMBX38A_VERSION),
    };

    let mut line = String::from(SMBX38A_MAGIC);
    push_int(&mut line, version);
    line.push('\n');
    line
}

pub(crate) fn write_level<W: TextOutput>(
    out: &mut W,
    data: &LevelData,
    version: u32,
) -> io::Result<()> {
    out.write(&header(version))?;
    let head = RecordWriter::new("A").int(data.stars).string(&data.title);
    out.write(&head.finish())?;

    for x in &data.sections {
        let record = RecordWriter::new("S")
            .int(x.id)
            .int(x.left)
            .int(x.top)
            .int(x.right)
            .int(x.bottom)
            .int(x.music_id)
            .int(x.background_id);
        out.write(&record.finish())?;
    }

    for x in &data.blocks {
        let record = RecordWriter::new("B")
            .int(x.id)
            .int(x.x)
            .int(x.y)
            .int(x.w)
            .int(x.h)
            .string(&x.layer);
        out.write(&record.finish())?;
    }

    for x in &data.npcs {
        let record = RecordWriter::new("N")
            .int(x.id)
            .int(x.x)
            .int(x.y)
            .int(x.direction)
            .int(u8::from(x.friendly))
            .string(&x.layer);
        out.write(&record.finish())?;
    }

    Ok(())
}

pub(crate) fn write_world<W: TextOutput>(
    out: &mut W,
    data: &WorldData,
    version: u32,
) -> io::Result<()> {
    out.write(&header(version))?;
    let head = RecordWriter::new("A").int(data.stars).string(&data.title);
    out.write(&head.finish())?;

    for x in &data.tiles {
        let record = RecordWriter::new("T").int(x.id).int(x.x).int(x.y);
        out.write(&record.finish())?;
    }

    for x in &data.levels {
        let record = RecordWriter::new("L")
            .int(x.id)
            .int(x.x)
            .int(x.y)
            .string(&x.file)
            .string(&x.title);
        out.write(&record.finish())?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BufferInput, ErrorKind, TextEncoding, TextOutputBuilder};
    use rstest::*;

    fn parse_level(text: &str) -> Result<LevelData, Error> {
        let mut input = BufferInput::new(text.as_bytes(), "", TextEncoding::Utf8);
        let mut level = LevelData::default();
        read_level(&mut input, &mut level)?;
        Ok(level)
    }

    #[test]
    fn parse_records() {
        let text = "SMBXFile65\r\n\
            A,2,\"Commas, in a title\"\r\n\
            S,0,-200000,-200600,-199200,-200000,1,4\r\n\
            Q,some,future,record\r\n\
            \r\n\
            B,1,0,32,32,32,\"Default\"\r\n\
            N,97,64,0,-1,1,\"Stars\"\r\n";

        let level = parse_level(text).unwrap();
        assert_eq!(level.meta.recent_format_version, 65);
        assert_eq!(level.stars, 2);
        assert_eq!(level.title, "Commas, in a title");
        assert_eq!(level.sections[0].right, -199200);
        assert_eq!(level.blocks[0].w, 32);
        assert!(level.npcs[0].friendly);
        assert_eq!(level.npcs[0].layer, "Stars");
    }

    #[rstest]
    #[case("SMBXFile66\nB,1,0,32\n", "Wrong number of fields in B record: expected 7, found 4", 2)]
    #[case("SMBXFile66\nA,1,\"t\"\nN,1,0,0,0,2,\"x\"\n", "Invalid npc friendly flag", 3)]
    #[case("SMBXFileXX\n", "Invalid SMBX-38A file header", 1)]
    fn malformed(#[case] text: &str, #[case] message: &str, #[case] line: i64) {
        match parse_level(text).unwrap_err().into_kind() {
            ErrorKind::Parse(err) => {
                assert_eq!(err.message(), message);
                assert_eq!(err.line_number(), line);
            }
            x => panic!("unexpected error {:?}", x),
        }
    }

    #[test]
    fn header_ignores_body() {
        let text = "SMBXFile66\nA,3,\"Hills\"\nB,broken\n";
        let mut input = BufferInput::new(text.as_bytes(), "", TextEncoding::Utf8);
        let mut level = LevelData::default();
        read_level_header(&mut input, &mut level).unwrap();
        assert_eq!(level.title, "Hills");
        assert_eq!(level.stars, 3);
    }

    #[test]
    fn write_records() {
        let mut world = WorldData {
            title: String::from("Dry \"desert\""),
            ..WorldData::default()
        };
        world.tiles.push(WorldTile { id: 4, x: 0, y: 32 });
        world.levels.push(WorldLevel {
            id: 1,
            x: 64,
            y: 64,
            file: String::from("a.lvlb"),
            title: String::from("A"),
        });

        let mut buf = Vec::new();
        let mut out = TextOutputBuilder::new().from_buffer(&mut buf);
        write_world(&mut out, &world, 0).unwrap();
        assert_eq!(
            std::str::from_utf8(&buf).unwrap(),
            "SMBXFile66\nA,0,\"Dry 'desert'\"\nT,4,0,32\nL,1,64,64,\"a.lvlb\",\"A\"\n"
        );
    }
}
