use crate::{
    detect::{sniff, Probe},
    document::Document,
    formats::sidecar,
    meta::CANT_OPEN_META_FILE,
    stream::{BufferInput, FileInput, TextInput},
    Error, FileFormat, LevelData, MetaData, TextEncoding, WorldData,
};
use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};

/// Returns the path of the `.meta` sidecar belonging to a document
///
/// ```
/// use pge_files::sidecar_path;
/// use std::path::Path;
///
/// assert_eq!(sidecar_path("maps/intro.lvl"), Path::new("maps/intro.lvl.meta"));
/// ```
pub fn sidecar_path<P: AsRef<Path>>(path: P) -> PathBuf {
    let mut result = OsString::from(path.as_ref().as_os_str());
    result.push(".meta");
    PathBuf::from(result)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Full,
    Header,
}

/// SMBX64 is the only format read through a windows 1252 re-open. Other
/// formats are read from the source as given.
fn reopen_for<R: TextInput>(input: R, format: FileFormat) -> Result<R, Error> {
    match format {
        FileFormat::Smbx64 => {
            let encoding = TextEncoding::Windows1252;
            log::debug!("reopening {} as {:?}", input.path().display(), encoding);
            input.reopen(encoding).map_err(Error::open)
        }
        FileFormat::PgeX | FileFormat::Smbx38a => Ok(input),
    }
}

fn read_sidecar(path: &Path) -> Result<MetaData, Error> {
    let mut input = FileInput::open(path, TextEncoding::Utf8).map_err(Error::open)?;
    let mut data = MetaData::default();
    sidecar::read_meta_data(&mut input, &mut data)?;
    Ok(data)
}

/// Merges the sidecar into the document if there is one. A sidecar that can't
/// be loaded leaves the document valid.
fn merge_sidecar<D: Document>(path: &Path, data: &mut D) {
    if path.as_os_str().is_empty() {
        return;
    }

    let meta_path = sidecar_path(path);
    if !meta_path.try_exists().unwrap_or(true) {
        return;
    }

    match read_sidecar(&meta_path) {
        Ok(meta_data) => *data.meta_data_mut() = meta_data,
        Err(err) => {
            log::warn!("unable to load {}: {}", meta_path.display(), err);
            data.meta_mut().error_info = String::from(CANT_OPEN_META_FILE);
        }
    }
}

fn read_document<D, R>(mut input: R, data: &mut D, scope: Scope) -> Result<(), Error>
where
    D: Document,
    R: TextInput,
{
    let probe = match scope {
        Scope::Full => Probe::Prefix,
        Scope::Header => Probe::Line,
    };

    let format = sniff(&mut input, probe).map_err(Error::open)?;
    let mut input = reopen_for(input, format)?;
    log::debug!(
        "reading {} {} from {}",
        format,
        D::KIND,
        input.path().display()
    );

    match scope {
        Scope::Full => data.read_body(format, &mut input)?,
        Scope::Header => data.read_header(format, &mut input)?,
    }

    data.meta_mut().recent_format = format;
    if scope == Scope::Full {
        let path = input.path().to_path_buf();
        drop(input);
        merge_sidecar(&path, data);
    }

    Ok(())
}

fn open_document<D, R>(input: R, data: &mut D, scope: Scope) -> Result<(), Error>
where
    D: Document,
    R: TextInput,
{
    *data = D::default();
    let path = input.path();
    let meta = data.meta_mut();
    meta.filename = path
        .file_stem()
        .map(|x| x.to_string_lossy().into_owned())
        .unwrap_or_default();
    meta.path = path
        .parent()
        .map(|x| x.to_string_lossy().into_owned())
        .unwrap_or_default();

    let result = read_document(input, data, scope);
    if let Err(ref err) = result {
        data.meta_mut().record(err);
    }

    result
}

fn open_path<D: Document>(path: &Path, data: &mut D, scope: Scope) -> Result<(), Error> {
    match FileInput::open(path, TextEncoding::Utf8) {
        Ok(input) => open_document(input, data, scope),
        Err(err) => {
            let err = Error::open(err);
            *data = D::default();
            data.meta_mut().record(&err);
            Err(err)
        }
    }
}

/// Loads a level from a file, detecting its format from the contents
///
/// The document is reset before anything is read. On failure the error is
/// also recorded in `data.meta`, which is left with `read_file_valid` false.
///
/// ```no_run
/// use pge_files::{open_level, LevelData};
///
/// let mut level = LevelData::default();
/// match open_level("intro.lvlx", &mut level) {
///     Ok(()) => println!("{} blocks", level.blocks.len()),
///     Err(e) => eprintln!("{} (line {})", level.meta.error_info, level.meta.error_line_number),
/// }
/// ```
pub fn open_level<P: AsRef<Path>>(path: P, data: &mut LevelData) -> Result<(), Error> {
    open_path(path.as_ref(), data, Scope::Full)
}

/// Loads a level held in memory. The virtual path stands in for the file the
/// data came from and locates the sidecar, if any.
///
/// ```
/// use pge_files::{open_level_from_buffer, FileFormat, LevelData};
///
/// let data = b"HEAD\nTL:\"Intro\";\nHEAD_END\n";
/// let mut level = LevelData::default();
/// open_level_from_buffer(data, "", &mut level)?;
/// assert_eq!(level.title, "Intro");
/// assert_eq!(level.meta.recent_format, FileFormat::PgeX);
/// # Ok::<(), pge_files::Error>(())
/// ```
pub fn open_level_from_buffer<P: AsRef<Path>>(
    buffer: &[u8],
    virtual_path: P,
    data: &mut LevelData,
) -> Result<(), Error> {
    let input = BufferInput::new(buffer, virtual_path.as_ref(), TextEncoding::Utf8);
    open_document(input, data, Scope::Full)
}

/// Loads a level from any text source
pub fn open_level_from_input<R: TextInput>(input: R, data: &mut LevelData) -> Result<(), Error> {
    open_document(input, data, Scope::Full)
}

/// Loads only the header fields of a level file
pub fn open_level_header<P: AsRef<Path>>(path: P, data: &mut LevelData) -> Result<(), Error> {
    open_path(path.as_ref(), data, Scope::Header)
}

pub fn open_level_header_from_buffer<P: AsRef<Path>>(
    buffer: &[u8],
    virtual_path: P,
    data: &mut LevelData,
) -> Result<(), Error> {
    let input = BufferInput::new(buffer, virtual_path.as_ref(), TextEncoding::Utf8);
    open_document(input, data, Scope::Header)
}

pub fn open_level_header_from_input<R: TextInput>(
    input: R,
    data: &mut LevelData,
) -> Result<(), Error> {
    open_document(input, data, Scope::Header)
}

/// Loads a world from a file, detecting its format from the contents
pub fn open_world<P: AsRef<Path>>(path: P, data: &mut WorldData) -> Result<(), Error> {
    open_path(path.as_ref(), data, Scope::Full)
}

/// Loads a world held in memory
pub fn open_world_from_buffer<P: AsRef<Path>>(
    buffer: &[u8],
    virtual_path: P,
    data: &mut WorldData,
) -> Result<(), Error> {
    let input = BufferInput::new(buffer, virtual_path.as_ref(), TextEncoding::Utf8);
    open_document(input, data, Scope::Full)
}

pub fn open_world_from_input<R: TextInput>(input: R, data: &mut WorldData) -> Result<(), Error> {
    open_document(input, data, Scope::Full)
}

/// Loads only the header fields of a world file
pub fn open_world_header<P: AsRef<Path>>(path: P, data: &mut WorldData) -> Result<(), Error> {
    open_path(path.as_ref(), data, Scope::Header)
}

pub fn open_world_header_from_buffer<P: AsRef<Path>>(
    buffer: &[u8],
    virtual_path: P,
    data: &mut WorldData,
) -> Result<(), Error> {
    let input = BufferInput::new(buffer, virtual_path.as_ref(), TextEncoding::Utf8);
    open_document(input, data, Scope::Header)
}

pub fn open_world_header_from_input<R: TextInput>(
    input: R,
    data: &mut WorldData,
) -> Result<(), Error> {
    open_document(input, data, Scope::Header)
}
