#![no_main]
use libfuzzer_sys::fuzz_target;
use pge_files::{FileFormat, LevelData};

fuzz_target!(|data: &[u8]| {
    let mut level = LevelData::default();
    if pge_files::open_level_from_buffer(data, "", &mut level).is_err() {
        assert!(!level.meta.read_file_valid);
        return;
    }

    for format in [FileFormat::PgeX, FileFormat::Smbx64, FileFormat::Smbx38a] {
        let out = pge_files::save_level_to_buffer(&mut level, format, 0).unwrap();
        let mut reloaded = LevelData::default();
        pge_files::open_level_from_buffer(&out, "", &mut reloaded).unwrap();
        assert_eq!(reloaded.meta.recent_format, format);
    }
});
