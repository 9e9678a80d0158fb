use crate::{
    stream::{TextInput, TextOutput},
    Error, FileFormat, FileMeta, MetaData,
};
use std::io;

/// Behavior shared by levels and worlds that the open and save routines are
/// generic over. Each method dispatches on the format with an exhaustive match.
pub(crate) trait Document: Default {
    /// Name used in log messages
    const KIND: &'static str;

    fn meta_mut(&mut self) -> &mut FileMeta;

    fn meta_data(&self) -> &MetaData;

    fn meta_data_mut(&mut self) -> &mut MetaData;

    /// Parses the entire document body
    fn read_body<R: TextInput>(&mut self, format: FileFormat, input: &mut R) -> Result<(), Error>;

    /// Parses only the header fields
    fn read_header<R: TextInput>(&mut self, format: FileFormat, input: &mut R)
        -> Result<(), Error>;

    /// Normalizes the document before it is written in the format
    fn prepare(&mut self, format: FileFormat);

    fn write<W: TextOutput>(&self, format: FileFormat, out: &mut W, version: u32)
        -> io::Result<()>;
}
