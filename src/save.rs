use crate::{
    document::Document,
    formats::sidecar,
    meta::UNSUPPORTED_FILE_TYPE,
    open::sidecar_path,
    stream::{OutputMode, TextOutput, TextOutputBuilder},
    Error, ErrorKind, FileFormat, LevelData, WorldData,
};
use std::{io, path::Path};

fn output_builder(format: FileFormat) -> TextOutputBuilder {
    TextOutputBuilder::new()
        .encoding(format.encoding())
        .force_crlf(format.forces_crlf())
}

fn write_file<D: Document>(data: &D, path: &Path, format: FileFormat, version: u32) -> io::Result<()> {
    let mut out = output_builder(format).open(path)?;
    data.write(format, &mut out, version)?;
    out.flush()
}

fn write_sidecar<D: Document>(data: &D, path: &Path) -> io::Result<()> {
    let mut out = TextOutputBuilder::new().open(path)?;
    sidecar::write_meta_data(&mut out, data.meta_data())?;
    out.flush()
}

fn save_path<D: Document>(
    data: &mut D,
    path: &Path,
    format: Option<FileFormat>,
    version: u32,
) -> Result<(), Error> {
    data.meta_mut().error_info.clear();
    let Some(format) = format else {
        data.meta_mut().error_info = String::from(UNSUPPORTED_FILE_TYPE);
        return Err(Error::new(ErrorKind::UnsupportedFormat));
    };

    data.prepare(format);
    log::debug!("writing {} {} to {}", format, D::KIND, path.display());
    if let Err(source) = write_file(data, path, format, version) {
        let meta = data.meta_mut();
        meta.read_file_valid = false;
        meta.error_info
            .push_str(&format!("Cannot save file {}.", path.display()));
        return Err(Error::new(ErrorKind::Save {
            path: path.to_path_buf(),
            source,
        }));
    }

    if format == FileFormat::Smbx64 && !data.meta_data().is_empty() {
        let meta_path = sidecar_path(path);
        if let Err(err) = write_sidecar(data, &meta_path) {
            let meta = data.meta_mut();
            meta.read_file_valid = false;
            meta.error_info
                .push_str(&format!("Cannot save file {}.", meta_path.display()));
            return Err(Error::new(ErrorKind::Sidecar {
                path: meta_path,
                source: Box::new(Error::from(err)),
            }));
        }
    }

    let meta = data.meta_mut();
    meta.recent_format = format;
    meta.recent_format_version = version;
    meta.filename = path
        .file_stem()
        .map(|x| x.to_string_lossy().into_owned())
        .unwrap_or_default();
    meta.path = path
        .parent()
        .map(|x| x.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(())
}

fn save_buffer<D: Document>(
    data: &mut D,
    buffer: &mut Vec<u8>,
    format: Option<FileFormat>,
    version: u32,
) -> Result<(), Error> {
    data.meta_mut().error_info.clear();
    let Some(format) = format else {
        let err = Error::new(ErrorKind::UnsupportedFormat);
        data.meta_mut().record(&err);
        return Err(err);
    };

    data.prepare(format);
    let mut out = output_builder(format)
        .mode(OutputMode::Append)
        .from_buffer(buffer);
    let written = data
        .write(format, &mut out, version)
        .and_then(|_| out.flush());
    if let Err(err) = written {
        let err = Error::from(err);
        data.meta_mut().record(&err);
        return Err(err);
    }

    let meta = data.meta_mut();
    meta.recent_format = format;
    meta.recent_format_version = version;
    Ok(())
}

/// Writes a level to a file in the requested format
///
/// The format is a [`FileFormat`] or its numeric id. The version only matters
/// to the legacy formats, where zero requests the newest one. Saving may
/// normalize the level first: PGE-X recounts stars and SMBX64 applies
/// [`LevelData::prepare_smbx64`]. SMBX64 saves of a level with bookmarks also
/// write the `.meta` sidecar, and failing to do so fails the save.
///
/// An unknown format id is reported in `data.meta.error_info` but, unlike the
/// other failures, leaves `read_file_valid` untouched.
///
/// ```no_run
/// use pge_files::{open_level, save_level, FileFormat, LevelData};
///
/// let mut level = LevelData::default();
/// open_level("intro.lvl", &mut level)?;
/// save_level(&mut level, "intro.lvlx", FileFormat::PgeX, 0)?;
/// # Ok::<(), pge_files::Error>(())
/// ```
pub fn save_level<P, F>(data: &mut LevelData, path: P, format: F, version: u32) -> Result<(), Error>
where
    P: AsRef<Path>,
    F: TryInto<FileFormat>,
{
    save_path(data, path.as_ref(), format.try_into().ok(), version)
}

/// Appends a level to a byte buffer in the requested format. The sidecar is
/// never written.
pub fn save_level_to_buffer_into<F>(
    data: &mut LevelData,
    buffer: &mut Vec<u8>,
    format: F,
    version: u32,
) -> Result<(), Error>
where
    F: TryInto<FileFormat>,
{
    save_buffer(data, buffer, format.try_into().ok(), version)
}

/// Serializes a level into a new byte buffer
///
/// ```
/// use pge_files::{save_level_to_buffer, FileFormat, LevelData};
///
/// let mut level = LevelData::default();
/// level.title = String::from("Intro");
/// let data = save_level_to_buffer(&mut level, FileFormat::PgeX, 0)?;
/// assert_eq!(data, b"HEAD\nTL:\"Intro\";SZ:0;\nHEAD_END\n");
///
/// assert!(save_level_to_buffer(&mut level, 7u32, 0).is_err());
/// assert_eq!(level.meta.error_info, "Unsupported file type");
/// # Ok::<(), pge_files::Error>(())
/// ```
pub fn save_level_to_buffer<F>(data: &mut LevelData, format: F, version: u32) -> Result<Vec<u8>, Error>
where
    F: TryInto<FileFormat>,
{
    let mut buffer = Vec::new();
    save_level_to_buffer_into(data, &mut buffer, format, version)?;
    Ok(buffer)
}

/// Writes a world to a file in the requested format
pub fn save_world<P, F>(data: &mut WorldData, path: P, format: F, version: u32) -> Result<(), Error>
where
    P: AsRef<Path>,
    F: TryInto<FileFormat>,
{
    save_path(data, path.as_ref(), format.try_into().ok(), version)
}

/// Appends a world to a byte buffer in the requested format
pub fn save_world_to_buffer_into<F>(
    data: &mut WorldData,
    buffer: &mut Vec<u8>,
    format: F,
    version: u32,
) -> Result<(), Error>
where
    F: TryInto<FileFormat>,
{
    save_buffer(data, buffer, format.try_into().ok(), version)
}

pub fn save_world_to_buffer<F>(data: &mut WorldData, format: F, version: u32) -> Result<Vec<u8>, Error>
where
    F: TryInto<FileFormat>,
{
    let mut buffer = Vec::new();
    save_world_to_buffer_into(data, &mut buffer, format, version)?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LevelNpc;

    #[test]
    fn pgex_save_recounts_stars() {
        let mut level = LevelData {
            stars: 9,
            ..LevelData::default()
        };
        level.npcs.push(LevelNpc {
            id: 196,
            ..LevelNpc::default()
        });

        save_level_to_buffer(&mut level, FileFormat::PgeX, 0).unwrap();
        assert_eq!(level.stars, 1);
        assert_eq!(level.meta.recent_format, FileFormat::PgeX);
    }

    #[test]
    fn buffer_save_appends() {
        let mut world = WorldData::default();
        let mut buffer = b"prefix\n".to_vec();
        save_world_to_buffer_into(&mut world, &mut buffer, 2u32, 0).unwrap();
        assert_eq!(buffer, b"prefix\nSMBXFile66\nA,0,\"\"\n");
        assert_eq!(world.meta.recent_format, FileFormat::Smbx38a);
    }

    #[test]
    fn unsupported_buffer_save_invalidates() {
        let mut world = WorldData::default();
        let err = save_world_to_buffer(&mut world, 3u32, 0).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::UnsupportedFormat));
        assert!(!world.meta.read_file_valid);
        assert_eq!(world.meta.error_info, UNSUPPORTED_FILE_TYPE);
    }

    #[test]
    fn unsupported_path_save_keeps_validity() {
        let mut world = WorldData::default();
        let err = save_world(&mut world, "never-written.wld", 3u32, 0).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::UnsupportedFormat));
        assert!(world.meta.read_file_valid);
        assert_eq!(world.meta.error_info, UNSUPPORTED_FILE_TYPE);
        assert!(!Path::new("never-written.wld").exists());
    }
}
