//! PGE-X: UTF-8 text made of named sections
//!
//! ```text
//! HEAD
//! TL:"My level";SZ:1;
//! HEAD_END
//! BLOCK
//! ID:1;X:0;Y:32;W:32;H:32;LR:"Default";
//! BLOCK_END
//! ```
//!
//! Each line within a section is a sequence of `KEY:value;` pairs. Strings are
//! double quoted with `\"`, `\\` and `\n` escapes. Sections and keys that are
//! not recognized are skipped so that newer files still load.

use crate::{
    formats::{push_int, Integer},
    level::{LevelBlock, LevelData, LevelNpc, LevelSection},
    stream::{TextInput, TextOutput},
    world::{WorldData, WorldLevel, WorldTile},
    Error,
};
use std::{io, str::FromStr};

/// Walks the sections and entries of a PGE-X document
pub(crate) struct SectionReader<'a, R> {
    input: &'a mut R,
}

impl<'a, R> SectionReader<'a, R>
where
    R: TextInput,
{
    pub fn new(input: &'a mut R) -> Self {
        SectionReader { input }
    }

    fn read_line(&mut self) -> Result<String, Error> {
        let first = self.input.tell() == 0;
        let mut line = self.input.read_line()?;
        if first && line.starts_with('\u{feff}') {
            line.remove(0);
        }
        Ok(line)
    }

    /// Advances to the next section header and returns its name, or none at
    /// the end of the document
    pub fn next_section(&mut self) -> Result<Option<String>, Error> {
        while !self.input.eof() {
            let line = self.read_line()?;
            let name = line.trim();
            if name.is_empty() {
                continue;
            }

            if !is_identifier(name) || name.ends_with("_END") {
                return Err(Error::parse(
                    "Section header expected",
                    line.as_str(),
                    self.input.line_number(),
                ));
            }

            return Ok(Some(name.to_string()));
        }

        Ok(None)
    }

    /// Reads the next entry of the current section, or none once the section
    /// terminator is reached
    pub fn next_entry(&mut self, section: &str) -> Result<Option<Entry>, Error> {
        loop {
            if self.input.eof() {
                return Err(Error::parse(
                    format!("Section {} is not terminated", section),
                    "",
                    self.input.line_number(),
                ));
            }

            let line = self.read_line()?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            if trimmed.strip_suffix("_END") == Some(section) {
                return Ok(None);
            }

            let line_number = self.input.line_number();
            let pairs = split_pairs(trimmed)
                .map_err(|msg| Error::parse(msg, line.as_str(), line_number))?;

            return Ok(Some(Entry {
                pairs,
                line,
                line_number,
            }));
        }
    }

    /// Moves past the terminator of a section without interpreting it
    pub fn skip_section(&mut self, section: &str) -> Result<(), Error> {
        log::trace!("skipping unknown section {}", section);
        loop {
            if self.input.eof() {
                return Err(Error::parse(
                    format!("Section {} is not terminated", section),
                    "",
                    self.input.line_number(),
                ));
            }

            let line = self.input.read_line()?;
            if line.trim().strip_suffix("_END") == Some(section) {
                return Ok(());
            }
        }
    }
}

fn is_identifier(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|x| x.is_ascii_alphanumeric() || x == b'_')
}

/// Length of the quoted string at the start of the data, closing quote
/// included
fn quoted_len(data: &str) -> Option<usize> {
    let bytes = data.as_bytes();
    let mut i = 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => return Some(i + 1),
            _ => i += 1,
        }
    }

    None
}

fn split_pairs(line: &str) -> Result<Vec<(String, String)>, String> {
    let mut pairs = Vec::new();
    let mut rest = line;
    while !rest.is_empty() {
        let colon = rest
            .find(':')
            .ok_or_else(|| String::from("Missing ':' after field name"))?;
        let key = &rest[..colon];
        if !is_identifier(key) {
            return Err(format!("Invalid field name {:?}", key));
        }

        let remain = &rest[colon + 1..];
        let value_len = if remain.starts_with('"') {
            quoted_len(remain).ok_or_else(|| format!("Unterminated string in field {}", key))?
        } else {
            remain.find(';').unwrap_or(remain.len())
        };

        let (value, after) = remain.split_at(value_len);
        rest = after
            .strip_prefix(';')
            .ok_or_else(|| format!("Missing ';' after field {}", key))?;
        pairs.push((key.to_string(), value.to_string()));
    }

    Ok(pairs)
}

fn unescape(raw: &str) -> Option<String> {
    let inner = raw.strip_prefix('"')?.strip_suffix('"')?;
    let mut result = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }

        match chars.next()? {
            'n' => result.push('\n'),
            c => result.push(c),
        }
    }

    Some(result)
}

/// One line of `KEY:value;` pairs
#[derive(Debug)]
pub(crate) struct Entry {
    pairs: Vec<(String, String)>,
    line: String,
    line_number: i64,
}

impl Entry {
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn number<T: FromStr>(&self, key: &str, value: &str) -> Result<T, Error> {
        value.parse().map_err(|_| self.invalid(key))
    }

    pub fn string(&self, key: &str, value: &str) -> Result<String, Error> {
        unescape(value).ok_or_else(|| self.invalid(key))
    }

    pub fn flag(&self, key: &str, value: &str) -> Result<bool, Error> {
        match value {
            "0" => Ok(false),
            "1" => Ok(true),
            _ => Err(self.invalid(key)),
        }
    }

    fn invalid(&self, key: &str) -> Error {
        Error::parse(
            format!("Invalid value of field {}", key),
            self.line.as_str(),
            self.line_number,
        )
    }
}

/// Builds one line of `KEY:value;` pairs
#[derive(Debug, Default)]
pub(crate) struct EntryWriter {
    line: String,
}

impl EntryWriter {
    pub fn new() -> Self {
        EntryWriter::default()
    }

    fn key(&mut self, key: &str) {
        self.line.push_str(key);
        self.line.push(':');
    }

    pub fn int<I: Integer>(mut self, key: &str, value: I) -> Self {
        self.key(key);
        push_int(&mut self.line, value);
        self.line.push(';');
        self
    }

    pub fn float(mut self, key: &str, value: f64) -> Self {
        self.key(key);
        self.line.push_str(&value.to_string());
        self.line.push(';');
        self
    }

    pub fn string(mut self, key: &str, value: &str) -> Self {
        self.key(key);
        self.line.push('"');
        for c in value.chars() {
            match c {
                '"' => self.line.push_str("\\\""),
                '\\' => self.line.push_str("\\\\"),
                '\n' => self.line.push_str("\\n"),
                '\r' => {}
                c => self.line.push(c),
            }
        }
        self.line.push_str("\";");
        self
    }

    /// Includes the pair only when the condition holds
    pub fn int_if(self, cond: bool, key: &str, value: u8) -> Self {
        if cond {
            self.int(key, value)
        } else {
            self
        }
    }

    pub fn finish(mut self) -> String {
        self.line.push('\n');
        self.line
    }
}

/// Writes a section holding one entry per item, or nothing if there are no
/// items
pub(crate) fn write_section<W, T, F>(out: &mut W, name: &str, items: &[T], entry: F) -> io::Result<()>
where
    W: TextOutput,
    F: Fn(&T) -> EntryWriter,
{
    if items.is_empty() {
        return Ok(());
    }

    out.write(name)?;
    out.write("\n")?;
    for item in items {
        out.write(&entry(item).finish())?;
    }
    out.write(name)?;
    out.write("_END\n")?;
    Ok(())
}

fn read_level_head<R: TextInput>(
    reader: &mut SectionReader<R>,
    data: &mut LevelData,
) -> Result<(), Error> {
    while let Some(entry) = reader.next_entry("HEAD")? {
        for (key, value) in entry.pairs() {
            match key {
                "TL" => data.title = entry.string(key, value)?,
                "SZ" => data.stars = entry.number(key, value)?,
                _ => {}
            }
        }
    }

    Ok(())
}

fn level_section(entry: &Entry) -> Result<LevelSection, Error> {
    let mut section = LevelSection::default();
    for (key, value) in entry.pairs() {
        match key {
            "SC" => section.id = entry.number(key, value)?,
            "L" => section.left = entry.number(key, value)?,
            "T" => section.top = entry.number(key, value)?,
            "R" => section.right = entry.number(key, value)?,
            "B" => section.bottom = entry.number(key, value)?,
            "MZ" => section.music_id = entry.number(key, value)?,
            "BG" => section.background_id = entry.number(key, value)?,
            _ => {}
        }
    }

    Ok(section)
}

fn level_block(entry: &Entry) -> Result<LevelBlock, Error> {
    let mut block = LevelBlock::default();
    for (key, value) in entry.pairs() {
        match key {
            "ID" => block.id = entry.number(key, value)?,
            "X" => block.x = entry.number(key, value)?,
            "Y" => block.y = entry.number(key, value)?,
            "W" => block.w = entry.number(key, value)?,
            "H" => block.h = entry.number(key, value)?,
            "LR" => block.layer = entry.string(key, value)?,
            _ => {}
        }
    }

    Ok(block)
}

fn level_npc(entry: &Entry) -> Result<LevelNpc, Error> {
    let mut npc = LevelNpc::default();
    for (key, value) in entry.pairs() {
        match key {
            "ID" => npc.id = entry.number(key, value)?,
            "X" => npc.x = entry.number(key, value)?,
            "Y" => npc.y = entry.number(key, value)?,
            "D" => npc.direction = entry.number(key, value)?,
            "FD" => npc.friendly = entry.flag(key, value)?,
            "LR" => npc.layer = entry.string(key, value)?,
            _ => {}
        }
    }

    Ok(npc)
}

pub(crate) fn read_level<R: TextInput>(input: &mut R, data: &mut LevelData) -> Result<(), Error> {
    let mut reader = SectionReader::new(input);
    while let Some(section) = reader.next_section()? {
        match section.as_str() {
            "HEAD" => read_level_head(&mut reader, data)?,
            "SECTION" => {
                while let Some(entry) = reader.next_entry(&section)? {
                    data.sections.push(level_section(&entry)?);
                }
            }
            "BLOCK" => {
                while let Some(entry) = reader.next_entry(&section)? {
                    data.blocks.push(level_block(&entry)?);
                }
            }
            "NPC" => {
                while let Some(entry) = reader.next_entry(&section)? {
                    data.npcs.push(level_npc(&entry)?);
                }
            }
            _ => reader.skip_section(&section)?,
        }
    }

    Ok(())
}

/// Reads the `HEAD` section if the document begins with one
pub(crate) fn read_level_header<R: TextInput>(
    input: &mut R,
    data: &mut LevelData,
) -> Result<(), Error> {
    let mut reader = SectionReader::new(input);
    if reader.next_section()?.as_deref() == Some("HEAD") {
        read_level_head(&mut reader, data)?;
    }

    Ok(())
}

pub(crate) fn write_level<W: TextOutput>(out: &mut W, data: &LevelData) -> io::Result<()> {
    out.write("HEAD\n")?;
    let head = EntryWriter::new()
        .string("TL", &data.title)
        .int("SZ", data.stars);
    out.write(&head.finish())?;
    out.write("HEAD_END\n")?;

    write_section(out, "SECTION", &data.sections, |x| {
        EntryWriter::new()
            .int("SC", x.id)
            .int("L", x.left)
            .int("T", x.top)
            .int("R", x.right)
            .int("B", x.bottom)
            .int("MZ", x.music_id)
            .int("BG", x.background_id)
    })?;

    write_section(out, "BLOCK", &data.blocks, |x| {
        EntryWriter::new()
            .int("ID", x.id)
            .int("X", x.x)
            .int("Y", x.y)
            .int("W", x.w)
            .int("H", x.h)
            .string("LR", &x.layer)
    })?;

    write_section(out, "NPC", &data.npcs, |x| {
        EntryWriter::new()
            .int("ID", x.id)
            .int("X", x.x)
            .int("Y", x.y)
            .int("D", x.direction)
            .int_if(x.friendly, "FD", 1)
            .string("LR", &x.layer)
    })?;

    Ok(())
}

fn read_world_head<R: TextInput>(
    reader: &mut SectionReader<R>,
    data: &mut WorldData,
) -> Result<(), Error> {
    while let Some(entry) = reader.next_entry("HEAD")? {
        for (key, value) in entry.pairs() {
            match key {
                "TL" => data.title = entry.string(key, value)?,
                "SZ" => data.stars = entry.number(key, value)?,
                _ => {}
            }
        }
    }

    Ok(())
}

fn world_tile(entry: &Entry) -> Result<WorldTile, Error> {
    let mut tile = WorldTile::default();
    for (key, value) in entry.pairs() {
        match key {
            "ID" => tile.id = entry.number(key, value)?,
            "X" => tile.x = entry.number(key, value)?,
            "Y" => tile.y = entry.number(key, value)?,
            _ => {}
        }
    }

    Ok(tile)
}

fn world_level(entry: &Entry) -> Result<WorldLevel, Error> {
    let mut level = WorldLevel::default();
    for (key, value) in entry.pairs() {
        match key {
            "ID" => level.id = entry.number(key, value)?,
            "X" => level.x = entry.number(key, value)?,
            "Y" => level.y = entry.number(key, value)?,
            "LF" => level.file = entry.string(key, value)?,
            "LT" => level.title = entry.string(key, value)?,
            _ => {}
        }
    }

    Ok(level)
}

pub(crate) fn read_world<R: TextInput>(input: &mut R, data: &mut WorldData) -> Result<(), Error> {
    let mut reader = SectionReader::new(input);
    while let Some(section) = reader.next_section()? {
        match section.as_str() {
            "HEAD" => read_world_head(&mut reader, data)?,
            "TILES" => {
                while let Some(entry) = reader.next_entry(&section)? {
                    data.tiles.push(world_tile(&entry)?);
                }
            }
            "LEVELS" => {
                while let Some(entry) = reader.next_entry(&section)? {
                    data.levels.push(world_level(&entry)?);
                }
            }
            _ => reader.skip_section(&section)?,
        }
    }

    Ok(())
}

pub(crate) fn read_world_header<R: TextInput>(
    input: &mut R,
    data: &mut WorldData,
) -> Result<(), Error> {
    let mut reader = SectionReader::new(input);
    if reader.next_section()?.as_deref() == Some("HEAD") {
        read_world_head(&mut reader, data)?;
    }

    Ok(())
}

pub(crate) fn write_world<W: TextOutput>(out: &mut W, data: &WorldData) -> io::Result<()> {
    out.write("HEAD\n")?;
    let head = EntryWriter::new()
        .string("TL", &data.title)
        .int("SZ", data.stars);
    out.write(&head.finish())?;
    out.write("HEAD_END\n")?;

    write_section(out, "TILES", &data.tiles, |x| {
        EntryWriter::new().int("ID", x.id).int("X", x.x).int("Y", x.y)
    })?;

    write_section(out, "LEVELS", &data.levels, |x| {
        EntryWriter::new()
            .int("ID", x.id)
            .int("X", x.x)
            .int("Y", x.y)
            .string("LF", &x.file)
            .string("LT", &x.title)
    })?;

    Ok(())
}
