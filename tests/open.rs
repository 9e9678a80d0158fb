use pge_files::stream::{Field, SeekFrom};
use pge_files::{
    BufferInput, ErrorKind, FileFormat, LevelData, TextEncoding, TextInput, WorldData,
    CANT_OPEN_FILE, CANT_OPEN_META_FILE,
};
use std::{cell::Cell, io, path::Path, rc::Rc};

/// Buffer reader that counts re-opens and can be made to fail them
struct Probe<'a> {
    inner: BufferInput<'a>,
    reopens: Rc<Cell<u32>>,
    fail_reopen: bool,
}

impl<'a> Probe<'a> {
    fn new(data: &'a [u8], fail_reopen: bool) -> (Self, Rc<Cell<u32>>) {
        Probe::with_encoding(data, TextEncoding::Utf8, fail_reopen)
    }

    fn with_encoding(
        data: &'a [u8],
        encoding: TextEncoding,
        fail_reopen: bool,
    ) -> (Self, Rc<Cell<u32>>) {
        let reopens = Rc::new(Cell::new(0));
        let probe = Probe {
            inner: BufferInput::new(data, "", encoding),
            reopens: Rc::clone(&reopens),
            fail_reopen,
        };
        (probe, reopens)
    }
}

impl<'a> TextInput for Probe<'a> {
    fn read(&mut self, len: usize) -> io::Result<String> {
        self.inner.read(len)
    }

    fn read_line(&mut self) -> io::Result<String> {
        self.inner.read_line()
    }

    fn read_field(&mut self) -> io::Result<Field> {
        self.inner.read_field()
    }

    fn read_all(&mut self) -> io::Result<String> {
        self.inner.read_all()
    }

    fn eof(&self) -> bool {
        self.inner.eof()
    }

    fn tell(&self) -> u64 {
        self.inner.tell()
    }

    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.inner.seek(pos)
    }

    fn line_number(&self) -> i64 {
        self.inner.line_number()
    }

    fn path(&self) -> &Path {
        self.inner.path()
    }

    fn encoding(&self) -> TextEncoding {
        self.inner.encoding()
    }

    fn reopen(self, encoding: TextEncoding) -> io::Result<Self> {
        let Probe {
            inner,
            reopens,
            fail_reopen,
        } = self;

        reopens.set(reopens.get() + 1);
        if fail_reopen {
            return Err(io::Error::new(io::ErrorKind::NotFound, "source vanished"));
        }

        Ok(Probe {
            inner: inner.reopen(encoding)?,
            reopens,
            fail_reopen,
        })
    }
}

const CLASSIC: &[u8] = include_bytes!("./fixtures/classic.lvl");
const INTRO: &[u8] = include_bytes!("./fixtures/intro.lvlx");
const DESERT: &[u8] = include_bytes!("./fixtures/desert.wldb");
const GRASSLAND: &[u8] = include_bytes!("./fixtures/grassland.wld");

#[test]
fn smbx38a_routes_without_reopen() {
    let (input, reopens) = Probe::new(DESERT, false);
    let mut world = WorldData::default();
    pge_files::open_world_from_input(input, &mut world).unwrap();
    assert_eq!(reopens.get(), 0);
    assert_eq!(world.meta.recent_format, FileFormat::Smbx38a);
    assert_eq!(world.meta.recent_format_version, 66);
    assert_eq!(world.title, "Dry desert");
    assert_eq!(world.stars, 3);
    assert_eq!(world.tiles.len(), 2);
    assert_eq!(world.levels[0].title, "Intro, part 1");
}

#[test]
fn smbx64_reopens_as_windows_1252() {
    let (input, reopens) = Probe::new(CLASSIC, false);
    let mut level = LevelData::default();
    pge_files::open_level_from_input(input, &mut level).unwrap();
    assert_eq!(reopens.get(), 1);
    assert_eq!(level.meta.recent_format, FileFormat::Smbx64);
    assert_eq!(level.title, "Café classic");
    assert_eq!(level.blocks.len(), 2);
    assert_eq!(level.npcs[0].id, 97);
}

#[test]
fn pgex_routes_without_reopen() {
    let (input, reopens) = Probe::new(INTRO, false);
    let mut level = LevelData::default();
    pge_files::open_level_from_input(input, &mut level).unwrap();
    assert_eq!(reopens.get(), 0);
    assert_eq!(level.title, "Intro \"stage\"");
    assert_eq!(level.blocks[1].layer, "Bridge");
    assert!(level.npcs[1].friendly);
}

#[test]
fn smbx38a_keeps_the_given_encoding() {
    let (input, reopens) = Probe::with_encoding(
        b"SMBXFile66\nA,1,\"x\"\n",
        TextEncoding::Windows1252,
        true,
    );
    let mut world = WorldData::default();
    pge_files::open_world_from_input(input, &mut world).unwrap();
    assert_eq!(reopens.get(), 0);
    assert_eq!(world.meta.recent_format, FileFormat::Smbx38a);
    assert_eq!(world.title, "x");
    assert_eq!(world.stars, 1);
}

#[test]
fn pgex_keeps_the_given_encoding() {
    let (input, reopens) = Probe::with_encoding(
        b"HEAD\nTL:\"Plain\";SZ:2;\nHEAD_END\n",
        TextEncoding::Windows1252,
        true,
    );
    let mut level = LevelData::default();
    pge_files::open_level_header_from_input(input, &mut level).unwrap();
    assert_eq!(reopens.get(), 0);
    assert_eq!(level.meta.recent_format, FileFormat::PgeX);
    assert_eq!(level.title, "Plain");
    assert_eq!(level.stars, 2);
}

#[test]
fn smbx64_reopens_whatever_the_given_encoding() {
    let (input, reopens) = Probe::with_encoding(CLASSIC, TextEncoding::Windows1252, false);
    let mut level = LevelData::default();
    pge_files::open_level_from_input(input, &mut level).unwrap();
    assert_eq!(reopens.get(), 1);
    assert_eq!(level.title, "Café classic");
}

#[test]
fn failed_reopen_fails_the_open() {
    let (input, reopens) = Probe::new(CLASSIC, true);
    let mut level = LevelData::default();
    let err = pge_files::open_level_from_input(input, &mut level).unwrap_err();
    assert_eq!(reopens.get(), 1);
    assert!(matches!(err.kind(), ErrorKind::Open(_)));
    assert!(!level.meta.read_file_valid);
    assert_eq!(level.meta.error_info, CANT_OPEN_FILE);
    assert_eq!(level.meta.error_line_data, "");
    assert_eq!(level.meta.error_line_number, -1);
    assert!(level.blocks.is_empty());
}

#[test]
fn header_open_reopens_too() {
    let (input, reopens) = Probe::new(GRASSLAND, false);
    let mut world = WorldData::default();
    pge_files::open_world_header_from_input(input, &mut world).unwrap();
    assert_eq!(reopens.get(), 1);
    assert_eq!(world.title, "Grass land");
    assert_eq!(world.stars, 12);
    assert!(world.tiles.is_empty());
    assert!(world.levels.is_empty());
}

#[test]
fn header_open_ignores_broken_body() {
    let mut data = INTRO.to_vec();
    data.extend_from_slice(b"BLOCK\nID:oops;\n");

    let mut level = LevelData::default();
    assert!(pge_files::open_level_from_buffer(&data, "", &mut level).is_err());

    pge_files::open_level_header_from_buffer(&data, "", &mut level).unwrap();
    assert!(level.meta.read_file_valid);
    assert!(level.meta.error_info.is_empty());
    assert_eq!(level.title, "Intro \"stage\"");
    assert_eq!(level.stars, 1);
    assert!(level.blocks.is_empty());
}

#[test]
fn sidecar_is_merged() {
    let mut level = LevelData::default();
    pge_files::open_level("tests/fixtures/classic.lvl", &mut level).unwrap();
    assert!(level.meta.error_info.is_empty());
    assert_eq!(level.meta.filename, "classic");
    assert_eq!(level.meta_data.bookmarks.len(), 2);
    assert_eq!(level.meta_data.bookmarks[1].name, "exit");
    assert_eq!(level.meta_data.bookmarks[1].x, -199300.5);
}

#[test]
fn header_open_skips_sidecar() {
    let mut level = LevelData::default();
    pge_files::open_level_header("tests/fixtures/classic.lvl", &mut level).unwrap();
    assert_eq!(level.title, "Café classic");
    assert!(level.meta_data.bookmarks.is_empty());
}

#[test]
fn missing_sidecar_leaves_meta_data_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("intro.lvlx");
    std::fs::write(&path, INTRO).unwrap();

    let mut level = LevelData::default();
    pge_files::open_level(&path, &mut level).unwrap();
    assert!(level.meta.read_file_valid);
    assert!(level.meta.error_info.is_empty());
    assert!(level.meta_data.is_empty());
}

#[test]
fn broken_sidecar_does_not_fail_the_open() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("classic.lvl");
    std::fs::write(&path, CLASSIC).unwrap();
    std::fs::write(
        pge_files::sidecar_path(&path),
        b"META_BOOKMARKS\nBM:\"spawn\";X:west;\n",
    )
    .unwrap();

    let mut level = LevelData::default();
    pge_files::open_level(&path, &mut level).unwrap();
    assert!(level.meta.read_file_valid);
    assert_eq!(level.meta.error_info, CANT_OPEN_META_FILE);
    assert_eq!(level.meta.error_line_number, -1);
    assert!(level.meta_data.is_empty());
    assert_eq!(level.blocks.len(), 2);
}

#[test]
fn unreadable_sidecar_does_not_fail_the_open() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("classic.lvl");
    std::fs::write(&path, CLASSIC).unwrap();
    std::fs::create_dir(pge_files::sidecar_path(&path)).unwrap();

    let mut level = LevelData::default();
    pge_files::open_level(&path, &mut level).unwrap();
    assert!(level.meta.read_file_valid);
    assert_eq!(level.meta.error_info, CANT_OPEN_META_FILE);
    assert!(level.meta_data.is_empty());
    assert_eq!(level.blocks.len(), 2);
}

#[test]
fn sidecar_found_through_virtual_path() {
    let mut level = LevelData::default();
    pge_files::open_level_from_buffer(CLASSIC, "tests/fixtures/classic.lvl", &mut level).unwrap();
    assert_eq!(level.meta_data.bookmarks.len(), 2);
}

#[test]
fn missing_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let mut level = LevelData::default();
    let err = pge_files::open_level(dir.path().join("absent.lvl"), &mut level).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::Open(_)));
    assert!(!level.meta.read_file_valid);
    assert_eq!(level.meta.error_info, CANT_OPEN_FILE);
    assert_eq!(level.meta.error_line_number, -1);
}

#[test]
fn parse_errors_point_at_the_line() {
    let text = String::from_utf8_lossy(GRASSLAND).replace("\"Intro\"", "Intro");
    let mut world = WorldData::default();
    let err = pge_files::open_world_from_buffer(text.as_bytes(), "", &mut world).unwrap_err();
    assert_eq!(err.line_number(), Some(15));
    assert!(!world.meta.read_file_valid);
    assert_eq!(world.meta.error_info, "Invalid level entrance title");
    assert_eq!(world.meta.error_line_data, "Intro");
    assert_eq!(world.meta.error_line_number, 15);
}

#[test]
fn empty_source_is_an_empty_pgex_document() {
    let mut world = WorldData::default();
    pge_files::open_world_from_buffer(b"", "", &mut world).unwrap();
    assert_eq!(world.meta.recent_format, FileFormat::PgeX);
    assert!(world.meta.read_file_valid);
}
