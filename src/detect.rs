use crate::{
    stream::{SeekFrom, TextInput},
    Error, ErrorKind, TextEncoding,
};
use std::{fmt, io};

/// The magic every SMBX-38A document starts with
pub(crate) const SMBX38A_MAGIC: &str = "SMBXFile";

/// Number of bytes inspected when detecting the format of a full document
pub const PREFIX_LEN: usize = 8;

/// The on-disk formats a level or world can be stored in
///
/// ```
/// use pge_files::FileFormat;
///
/// assert_eq!(FileFormat::detect("SMBXFile66"), FileFormat::Smbx38a);
/// assert_eq!(FileFormat::detect("64\r\n3\r\n\"M"), FileFormat::Smbx64);
/// assert_eq!(FileFormat::detect("HEAD\nTL:"), FileFormat::PgeX);
/// assert_eq!(FileFormat::detect(""), FileFormat::PgeX);
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FileFormat {
    /// The extensible, UTF-8, section based format (`.lvlx` / `.wldx`)
    #[default]
    PgeX,

    /// The line based format of SMBX 1.3, stored in windows 1252
    /// (`.lvl` / `.wld`)
    Smbx64,

    /// The comma separated format of SMBX-38A (`.lvlb` / `.wldb`)
    Smbx38a,
}

impl FileFormat {
    /// Classifies a document from the start of its text
    ///
    /// Detection is total: anything that is not recognized as one of the
    /// legacy formats is considered PGE-X.
    pub fn detect(prefix: &str) -> FileFormat {
        if prefix.starts_with(SMBX38A_MAGIC) {
            FileFormat::Smbx38a
        } else if looks_like_smbx64(prefix) {
            FileFormat::Smbx64
        } else {
            FileFormat::PgeX
        }
    }

    /// Creates a format from its numeric identifier
    pub fn from_id(id: u32) -> Option<FileFormat> {
        match id {
            0 => Some(FileFormat::PgeX),
            1 => Some(FileFormat::Smbx64),
            2 => Some(FileFormat::Smbx38a),
            _ => None,
        }
    }

    /// Returns the numeric identifier of this format
    pub fn id(&self) -> u32 {
        match self {
            FileFormat::PgeX => 0,
            FileFormat::Smbx64 => 1,
            FileFormat::Smbx38a => 2,
        }
    }

    /// Looks up the format conventionally associated with a level or world
    /// file extension
    pub fn from_extension(ext: &str) -> Option<FileFormat> {
        match ext.to_ascii_lowercase().as_str() {
            "lvlx" | "wldx" => Some(FileFormat::PgeX),
            "lvl" | "wld" => Some(FileFormat::Smbx64),
            "lvlb" | "wldb" => Some(FileFormat::Smbx38a),
            _ => None,
        }
    }

    /// The conventional extension of a level in this format
    pub fn level_extension(&self) -> &'static str {
        match self {
            FileFormat::PgeX => "lvlx",
            FileFormat::Smbx64 => "lvl",
            FileFormat::Smbx38a => "lvlb",
        }
    }

    /// The conventional extension of a world in this format
    pub fn world_extension(&self) -> &'static str {
        match self {
            FileFormat::PgeX => "wldx",
            FileFormat::Smbx64 => "wld",
            FileFormat::Smbx38a => "wldb",
        }
    }

    /// The text encoding documents of this format are stored in
    pub fn encoding(&self) -> TextEncoding {
        match self {
            FileFormat::Smbx64 => TextEncoding::Windows1252,
            FileFormat::PgeX | FileFormat::Smbx38a => TextEncoding::Utf8,
        }
    }

    /// Returns true if line terminators are always written as `\r\n`
    pub fn forces_crlf(&self) -> bool {
        matches!(self, FileFormat::Smbx64)
    }
}

impl TryFrom<u32> for FileFormat {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        FileFormat::from_id(value).ok_or_else(|| Error::new(ErrorKind::UnsupportedFormat))
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FileFormat::PgeX => write!(f, "PGE-X"),
            FileFormat::Smbx64 => write!(f, "SMBX64"),
            FileFormat::Smbx38a => write!(f, "SMBX-38A"),
        }
    }
}

/// Heuristic for the SMBX64 header: the first line holds nothing but the
/// file format version (1 to 3 digits).
///
/// The prefix may be a fixed number of bytes, in which case the version line
/// must be terminated within it, or an entire first line without its
/// terminator.
pub fn looks_like_smbx64(prefix: &str) -> bool {
    let data = prefix.as_bytes();
    let digits = data.iter().take_while(|x| x.is_ascii_digit()).count();
    if !(1..=3).contains(&digits) {
        return false;
    }

    matches!(&data[digits..], [] | [b'\r'] | [b'\n', ..] | [b'\r', b'\n', ..])
}

/// How much of a document is inspected for detection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Probe {
    /// The first [`PREFIX_LEN`] bytes
    Prefix,

    /// The entire first line
    Line,
}

/// Detects the format of the input and rewinds it to the start
pub(crate) fn sniff<R: TextInput>(input: &mut R, probe: Probe) -> io::Result<FileFormat> {
    let prefix = match probe {
        Probe::Prefix => input.read(PREFIX_LEN)?,
        Probe::Line => input.read_line()?,
    };
    input.seek(SeekFrom::Start(0))?;

    let format = FileFormat::detect(&prefix);
    log::debug!(
        "detected {} in {} ({:?} probe)",
        format,
        input.path().display(),
        probe
    );
    Ok(format)
}
