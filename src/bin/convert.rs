//! Converts a level or world between formats. The output format is chosen from
//! the extension of the output path.
//!
//! ```text
//! convert intro.lvl intro.lvlx
//! ```

use pge_files::{FileFormat, LevelData, WorldData};
use std::{env, error, path::Path, process};

fn extension(path: &Path) -> String {
    path.extension()
        .map(|x| x.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default()
}

/// A document can load with a sidecar that did not
fn warn_meta(error_info: &str) {
    if !error_info.is_empty() {
        eprintln!("warning: {}", error_info);
    }
}

fn main() -> Result<(), Box<dyn error::Error>> {
    let args: Vec<String> = env::args().collect();
    if args.len() != 3 {
        eprintln!("usage: convert <input> <output>");
        process::exit(1);
    }

    let input = Path::new(&args[1]);
    let output = Path::new(&args[2]);
    let ext = extension(output);
    let Some(format) = FileFormat::from_extension(&ext) else {
        eprintln!("unrecognized output extension: {}", output.display());
        process::exit(1);
    };

    if ext.starts_with("wld") {
        let mut world = WorldData::default();
        pge_files::open_world(input, &mut world)?;
        warn_meta(&world.meta.error_info);
        pge_files::save_world(&mut world, output, format, 0)?;
    } else {
        let mut level = LevelData::default();
        pge_files::open_level(input, &mut level)?;
        warn_meta(&level.meta.error_info);
        pge_files::save_level(&mut level, output, format, 0)?;
    }

    Ok(())
}
