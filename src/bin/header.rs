//! Prints the header fields of levels and worlds without reading their bodies.

use pge_files::{LevelData, WorldData};
use std::{env, error, path::Path};

fn main() -> Result<(), Box<dyn error::Error>> {
    for arg in env::args().skip(1) {
        let path = Path::new(&arg);
        let is_world = path
            .extension()
            .map_or(false, |x| x.to_string_lossy().to_ascii_lowercase().starts_with("wld"));

        let (format, title, stars) = if is_world {
            let mut world = WorldData::default();
            pge_files::open_world_header(path, &mut world)?;
            (world.meta.recent_format, world.title, world.stars)
        } else {
            let mut level = LevelData::default();
            pge_files::open_level_header(path, &mut level)?;
            (level.meta.recent_format, level.title, level.stars)
        };

        println!("{}: {} {:?} ({} stars)", path.display(), format, title, stars);
    }

    Ok(())
}
