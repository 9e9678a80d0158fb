//! SMBX64: the line based format of SMBX 1.3, one value per line, stored in
//! windows 1252 with CRLF line endings.
//!
//! The first line is the file format version, which gates the presence of
//! later header lines. Lists of objects are terminated by a `"next"` line.

use super::{push_int, push_quoted, unquote, Integer};
use crate::{
    detect::looks_like_smbx64,
    level::{LevelBlock, LevelData, LevelNpc, LevelSection, DEFAULT_LAYER, SMBX64_SECTIONS},
    stream::{TextInput, TextOutput},
    world::{WorldData, WorldLevel, WorldTile},
    Error,
};
use std::{io, str::FromStr};

/// Newest file format version
pub const SMBX64_VERSION: u32 = 64;

const TERMINATOR: &str = "\"next\"";

struct LineReader<'a, R> {
    input: &'a mut R,
}

impl<'a, R> LineReader<'a, R>
where
    R: TextInput,
{
    fn new(input: &'a mut R) -> Self {
        LineReader { input }
    }

    fn next(&mut self, what: &str) -> Result<String, Error> {
        if self.input.eof() {
            return Err(Error::parse(
                format!("Unexpected end of file, expected {}", what),
                "",
                self.input.line_number(),
            ));
        }

        Ok(self.input.read_line()?)
    }

    fn invalid(&self, what: &str, line: &str) -> Error {
        Error::parse(format!("Invalid {}", what), line, self.input.line_number())
    }

    fn parse<T: FromStr>(&self, line: &str, what: &str) -> Result<T, Error> {
        line.trim().parse().map_err(|_| self.invalid(what, line))
    }

    fn number<T: FromStr>(&mut self, what: &str) -> Result<T, Error> {
        let line = self.next(what)?;
        self.parse(&line, what)
    }

    fn string(&mut self, what: &str) -> Result<String, Error> {
        let line = self.next(what)?;
        match unquote(line.trim()) {
            Some(x) => Ok(x.to_string()),
            None => Err(self.invalid(what, &line)),
        }
    }

    /// Reads the first line of the next object, or none at the list terminator
    fn record(&mut self, what: &str) -> Result<Option<String>, Error> {
        let line = self.next(what)?;
        if line.trim() == TERMINATOR {
            Ok(None)
        } else {
            Ok(Some(line))
        }
    }

    fn version(&mut self) -> Result<u32, Error> {
        let line = self.next("file format version")?;
        if !looks_like_smbx64(&line) {
            return Err(self.invalid("file format version", &line));
        }

        self.parse(&line, "file format version")
    }
}

fn read_level_head<R: TextInput>(
    lines: &mut LineReader<R>,
    data: &mut LevelData,
) -> Result<(), Error> {
    let version = lines.version()?;
    data.meta.recent_format_version = version;
    if version >= 17 {
        data.stars = lines.number("star count")?;
    }

    if version >= 60 {
        data.title = lines.string("level title")?;
    }

    Ok(())
}

pub(crate) fn read_level<R: TextInput>(input: &mut R, data: &mut LevelData) -> Result<(), Error> {
    let mut lines = LineReader::new(input);
    read_level_head(&mut lines, data)?;

    for id in 0..SMBX64_SECTIONS {
        let left = lines.number("section left edge")?;
        let top = lines.number("section top edge")?;
        let bottom = lines.number("section bottom edge")?;
        let right = lines.number("section right edge")?;
        let music_id = lines.number("section music")?;
        let background_id = lines.number("section background")?;
        data.sections.push(LevelSection {
            id: id as u32,
            left,
            top,
            right,
            bottom,
            music_id,
            background_id,
        });
    }

    while let Some(line) = lines.record("block")? {
        let x = lines.parse(&line, "block x position")?;
        let y = lines.number("block y position")?;
        let h = lines.number("block height")?;
        let w = lines.number("block width")?;
        let id = lines.number("block id")?;
        data.blocks.push(LevelBlock {
            id,
            x,
            y,
            w,
            h,
            layer: String::from(DEFAULT_LAYER),
        });
    }

    while let Some(line) = lines.record("npc")? {
        let x = lines.parse(&line, "npc x position")?;
        let y = lines.number("npc y position")?;
        let direction = lines.number("npc direction")?;
        let id = lines.number("npc id")?;
        data.npcs.push(LevelNpc {
            id,
            x,
            y,
            direction,
            friendly: false,
            layer: String::from(DEFAULT_LAYER),
        });
    }

    Ok(())
}

pub(crate) fn read_level_header<R: TextInput>(
    input: &mut R,
    data: &mut LevelData,
) -> Result<(), Error> {
    read_level_head(&mut LineReader::new(input), data)
}

fn read_world_head<R: TextInput>(
    lines: &mut LineReader<R>,
    data: &mut WorldData,
) -> Result<(), Error> {
    let version = lines.version()?;
    data.meta.recent_format_version = version;
    if version >= 10 {
        data.title = lines.string("world title")?;
    }

    if version >= 17 {
        data.stars = lines.number("star count")?;
    }

    Ok(())
}

pub(crate) fn read_world<R: TextInput>(input: &mut R, data: &mut WorldData) -> Result<(), Error> {
    let mut lines = LineReader::new(input);
    read_world_head(&mut lines, data)?;

    while let Some(line) = lines.record("tile")? {
        let x = lines.parse(&line, "tile x position")?;
        let y = lines.number("tile y position")?;
        let id = lines.number("tile id")?;
        data.tiles.push(WorldTile { id, x, y });
    }

    while let Some(line) = lines.record("level entrance")? {
        let x = lines.parse(&line, "level entrance x position")?;
        let y = lines.number("level entrance y position")?;
        let id = lines.number("level entrance id")?;
        let file = lines.string("level file")?;
        let title = lines.string("level entrance title")?;
        data.levels.push(WorldLevel {
            id,
            x,
            y,
            file,
            title,
        });
    }

    Ok(())
}

pub(crate) fn read_world_header<R: TextInput>(
    input: &mut R,
    data: &mut WorldData,
) -> Result<(), Error> {
    read_world_head(&mut LineReader::new(input), data)
}

/// Zero requests the newest version
fn effective_version(version: u32) -> u32 {
    match version {
        0 => SMBX64_VERSION,
        x => x.min(SMBX64_VERSION),
    }
}

fn int_line<I: Integer>(out: &mut String, value: I) {
    push_int(out, value);
    out.push('\n');
}

fn string_line(out: &mut String, value: &str) {
    push_quoted(out, value);
    out.push('\n');
}

pub(crate) fn write_level<W: TextOutput>(
    out: &mut W,
    data: &LevelData,
    version: u32,
) -> io::Result<()> {
    let version = effective_version(version);
    let mut text = String::new();
    int_line(&mut text, version);
    if version >= 17 {
        int_line(&mut text, data.stars);
    }

    if version >= 60 {
        string_line(&mut text, &data.title);
    }

    for i in 0..SMBX64_SECTIONS {
        let section = data.sections.get(i).copied().unwrap_or_default();
        int_line(&mut text, section.left);
        int_line(&mut text, section.top);
        int_line(&mut text, section.bottom);
        int_line(&mut text, section.right);
        int_line(&mut text, section.music_id);
        int_line(&mut text, section.background_id);
    }

    for block in &data.blocks {
        int_line(&mut text, block.x);
        int_line(&mut text, block.y);
        int_line(&mut text, block.h);
        int_line(&mut text, block.w);
        int_line(&mut text, block.id);
    }
    text.push_str(TERMINATOR);
    text.push('\n');

    for npc in &data.npcs {
        int_line(&mut text, npc.x);
        int_line(&mut text, npc.y);
        int_line(&mut text, npc.direction);
        int_line(&mut text, npc.id);
    }
    text.push_str(TERMINATOR);
    text.push('\n');

    out.write(&text)?;
    Ok(())
}

pub(crate) fn write_world<W: TextOutput>(
    out: &mut W,
    data: &WorldData,
    version: u32,
) -> io::Result<()> {
    let version = effective_version(version);
    let mut text = String::new();
    int_line(&mut text, version);
    if version >= 10 {
        string_line(&mut text, &data.title);
    }

    if version >= 17 {
        int_line(&mut text, data.stars);
    }

    for tile in &data.tiles {
        int_line(&mut text, tile.x);
        int_line(&mut text, tile.y);
        int_line(&mut text, tile.id);
    }
    text.push_str(TERMINATOR);
    text.push('\n');

    for level in &data.levels {
        int_line(&mut text, level.x);
        int_line(&mut text, level.y);
        int_line(&mut text, level.id);
        string_line(&mut text, &level.file);
        string_line(&mut text, &level.title);
    }
    text.push_str(TERMINATOR);
    text.push('\n');

    out.write(&text)?;
    Ok(())
}
