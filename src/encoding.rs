use encoding_rs::WINDOWS_1252;
use std::borrow::Cow;

/// The text encoding a source is decoded with or a sink is encoded with
///
/// PGE-X and SMBX-38A documents are UTF-8. SMBX64 documents predate that and
/// are stored in the local 8-bit code page, which for the files in the wild is
/// windows 1252.
///
/// ```
/// use pge_files::TextEncoding;
///
/// let encoding = TextEncoding::Windows1252;
/// assert_eq!(encoding.decode(b"Common Sense"), "Common Sense");
/// assert_eq!(encoding.decode(b"\xa7GRichard\xa7"), "§GRichard§");
/// assert_eq!(encoding.decode(b"\x8a"), "Š");
/// assert_eq!(encoding.encode("Šé").as_ref(), b"\x8a\xe9");
///
/// let encoding = TextEncoding::Utf8;
/// assert_eq!(encoding.decode(b"J\xc3\xa5hk\xc3\xa5m\xc3\xa5hkke"), "Jåhkåmåhkke");
/// assert_eq!(encoding.encode("å").as_ref(), b"\xc3\xa5");
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TextEncoding {
    /// UTF-8, invalid sequences are replaced when decoding
    #[default]
    Utf8,

    /// The windows 1252 code page
    Windows1252,
}

impl TextEncoding {
    /// Returns true if this is the UTF-8 encoding
    pub fn is_utf8(&self) -> bool {
        matches!(self, TextEncoding::Utf8)
    }

    /// Decodes bytes into a utf-8 string, allocating only if necessary
    pub fn decode<'a>(&self, data: &'a [u8]) -> Cow<'a, str> {
        match self {
            TextEncoding::Utf8 => String::from_utf8_lossy(data),
            TextEncoding::Windows1252 => WINDOWS_1252.decode_without_bom_handling(data).0,
        }
    }

    /// Encodes text into bytes, allocating only if necessary
    ///
    /// Characters that windows 1252 cannot represent are written as HTML
    /// numeric character references.
    pub fn encode<'a>(&self, text: &'a str) -> Cow<'a, [u8]> {
        match self {
            TextEncoding::Utf8 => Cow::Borrowed(text.as_bytes()),
            TextEncoding::Windows1252 => WINDOWS_1252.encode(text).0,
        }
    }
}
