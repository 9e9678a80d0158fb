use crate::{
    document::Document,
    formats::{pgex, smbx38a, smbx64},
    stream::{TextInput, TextOutput},
    Error, FileFormat, FileMeta, MetaData,
};
use std::io;

/// Layer objects are placed on when a format has no notion of layers
pub const DEFAULT_LAYER: &str = "Default";

/// Number of sections every SMBX64 level has
pub const SMBX64_SECTIONS: usize = 21;

/// NPC ids that are collectible stars
pub const STAR_NPC_IDS: [u32; 2] = [97, 196];

/// A level, independent of the format it was loaded from
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LevelData {
    pub meta: FileMeta,
    pub meta_data: MetaData,
    pub title: String,

    /// Number of stars collectible in the level
    pub stars: u32,
    pub sections: Vec<LevelSection>,
    pub blocks: Vec<LevelBlock>,
    pub npcs: Vec<LevelNpc>,
}

/// A rectangular region of a level with its own music and background
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LevelSection {
    pub id: u32,
    pub left: i64,
    pub top: i64,
    pub right: i64,
    pub bottom: i64,
    pub music_id: u32,
    pub background_id: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LevelBlock {
    pub id: u32,
    pub x: i64,
    pub y: i64,
    pub w: i64,
    pub h: i64,
    pub layer: String,
}

impl Default for LevelBlock {
    fn default() -> Self {
        LevelBlock {
            id: 0,
            x: 0,
            y: 0,
            w: 32,
            h: 32,
            layer: String::from(DEFAULT_LAYER),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LevelNpc {
    pub id: u32,
    pub x: i64,
    pub y: i64,

    /// -1 faces left, 1 faces right, 0 picks randomly
    pub direction: i32,
    pub friendly: bool,
    pub layer: String,
}

impl Default for LevelNpc {
    fn default() -> Self {
        LevelNpc {
            id: 0,
            x: 0,
            y: 0,
            direction: -1,
            friendly: false,
            layer: String::from(DEFAULT_LAYER),
        }
    }
}

impl LevelNpc {
    /// Returns true if collecting this NPC awards a star
    pub fn is_star(&self) -> bool {
        STAR_NPC_IDS.contains(&self.id) && !self.friendly
    }
}

impl LevelData {
    /// Recomputes the star count from the star NPCs placed in the level
    ///
    /// ```
    /// use pge_files::{LevelData, LevelNpc};
    ///
    /// let mut level = LevelData::default();
    /// level.npcs.push(LevelNpc { id: 97, ..LevelNpc::default() });
    /// level.npcs.push(LevelNpc { id: 196, friendly: true, ..LevelNpc::default() });
    /// level.npcs.push(LevelNpc { id: 1, ..LevelNpc::default() });
    /// level.count_stars();
    /// assert_eq!(level.stars, 1);
    /// ```
    pub fn count_stars(&mut self) {
        self.stars = self.npcs.iter().filter(|x| x.is_star()).count() as u32;
    }

    /// Brings the level within what the SMBX64 format can represent: exactly
    /// [`SMBX64_SECTIONS`] sections identified by position, NPC directions
    /// within -1..=1, and blocks ordered by position.
    pub fn prepare_smbx64(&mut self) {
        self.sections
            .resize_with(SMBX64_SECTIONS, LevelSection::default);
        for (id, section) in self.sections.iter_mut().enumerate() {
            section.id = id as u32;
        }

        for npc in self.npcs.iter_mut() {
            npc.direction = npc.direction.clamp(-1, 1);
        }

        self.blocks.sort_by_key(|x| (x.x, x.y));
        self.count_stars();
    }
}

impl Document for LevelData {
    const KIND: &'static str = "level";

    fn meta_mut(&mut self) -> &mut FileMeta {
        &mut self.meta
    }

    fn meta_data(&self) -> &MetaData {
        &self.meta_data
    }

    fn meta_data_mut(&mut self) -> &mut MetaData {
        &mut self.meta_data
    }

    fn read_body<R: TextInput>(&mut self, format: FileFormat, input: &mut R) -> Result<(), Error> {
        match format {
            FileFormat::PgeX => pgex::read_level(input, self),
            FileFormat::Smbx64 => smbx64::read_level(input, self),
            FileFormat::Smbx38a => smbx38a::read_level(input, self),
        }
    }

    fn read_header<R: TextInput>(
        &mut self,
        format: FileFormat,
        input: &mut R,
    ) -> Result<(), Error> {
        match format {
            FileFormat::PgeX => pgex::read_level_header(input, self),
            FileFormat::Smbx64 => smbx64::read_level_header(input, self),
            FileFormat::Smbx38a => smbx38a::read_level_header(input, self),
        }
    }

    fn prepare(&mut self, format: FileFormat) {
        match format {
            FileFormat::PgeX => self.count_stars(),
            FileFormat::Smbx64 => self.prepare_smbx64(),
            FileFormat::Smbx38a => {}
        }
    }

    fn write<W: TextOutput>(
        &self,
        format: FileFormat,
        out: &mut W,
        version: u32,
    ) -> io::Result<()> {
        match format {
            FileFormat::PgeX => pgex::write_level(out, self),
            FileFormat::Smbx64 => smbx64::write_level(out, self, version),
            FileFormat::Smbx38a => smbx38a::write_level(out, self, version),
        }
    }
}
