use crate::{
    document::Document,
    formats::{pgex, smbx38a, smbx64},
    stream::{TextInput, TextOutput},
    Error, FileFormat, FileMeta, MetaData,
};
use std::io;

/// A world map, independent of the format it was loaded from
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorldData {
    pub meta: FileMeta,
    pub meta_data: MetaData,
    pub title: String,

    /// Total number of stars collectible in the world
    pub stars: u32,
    pub tiles: Vec<WorldTile>,
    pub levels: Vec<WorldLevel>,
}

/// A terrain tile of the world map
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorldTile {
    pub id: u32,
    pub x: i64,
    pub y: i64,
}

/// A level entrance on the world map
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorldLevel {
    pub id: u32,
    pub x: i64,
    pub y: i64,

    /// Level file the entrance leads to, relative to the world
    pub file: String,
    pub title: String,
}

impl Document for WorldData {
    const KIND: &'static str = "world";

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
            FileFormat::PgeX => pgex::read_world(input, self),
            FileFormat::Smbx64 => smbx64::read_world(input, self),
            FileFormat::Smbx38a => smbx38a::read_world(input, self),
        }
    }

    fn read_header<R: TextInput>(
        &mut self,
        format: FileFormat,
        input: &mut R,
    ) -> Result<(), Error> {
        match format {
            FileFormat::PgeX => pgex::read_world_header(input, self),
            FileFormat::Smbx64 => smbx64::read_world_header(input, self),
            FileFormat::Smbx38a => smbx38a::read_world_header(input, self),
        }
    }

    // worlds carry no derived fields
    fn prepare(&mut self, _format: FileFormat) {}

    fn write<W: TextOutput>(
        &self,
        format: FileFormat,
        out: &mut W,
        version: u32,
    ) -> io::Result<()> {
        match format {
            FileFormat::PgeX => pgex::write_world(out, self),
            FileFormat::Smbx64 => smbx64::write_world(out, self, version),
            FileFormat::Smbx38a => smbx38a::write_world(out, self, version),
        }
    }
}
