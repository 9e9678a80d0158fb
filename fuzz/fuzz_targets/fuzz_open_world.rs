#![no_main]
use libfuzzer_sys::fuzz_target;
use pge_files::WorldData;

fuzz_target!(|data: &[u8]| {
    let mut world = WorldData::default();
    let _ = pge_files::open_world_header_from_buffer(data, "", &mut world);
    if pge_files::open_world_from_buffer(data, "", &mut world).is_ok() {
        let _ = pge_files::save_world_to_buffer(&mut world, pge_files::FileFormat::PgeX, 0);
    }
});
