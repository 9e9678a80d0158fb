use pge_files::{LevelData, WorldData};
use std::{env, error, io, path::Path, process};

fn main() -> Result<(), Box<dyn error::Error>> {
    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("usage: json <level or world>");
        process::exit(1);
    }

    let path = Path::new(&args[1]);
    let is_world = path
        .extension()
        .map_or(false, |x| x.to_string_lossy().to_ascii_lowercase().starts_with("wld"));

    let stdout = io::stdout().lock();
    if is_world {
        let mut world = WorldData::default();
        pge_files::open_world(path, &mut world)?;
        serde_json::to_writer_pretty(stdout, &world)?;
    } else {
        let mut level = LevelData::default();
        pge_files::open_level(path, &mut level)?;
        serde_json::to_writer_pretty(stdout, &level)?;
    }

    Ok(())
}
