/*!

Load and save platformer level and world files in any of the three formats
used by the [PGE](https://wohlsoft.ru/) toolchain and the SMBX engines it
descends from:

- PGE-X (`.lvlx` / `.wldx`): the extensible, section based UTF-8 format
- SMBX64 (`.lvl` / `.wld`): the line based format of SMBX 1.3, stored in
  windows 1252
- SMBX-38A (`.lvlb` / `.wldb`): the comma separated format of SMBX-38A

## Features

- ✔ Self describing: the format is detected from the contents, never the file
  extension
- ✔ Pluggable: documents load from files, in-memory buffers, or any other
  [`TextInput`]
- ✔ Forgiving: editor data the legacy formats can't hold is kept in a `.meta`
  sidecar, and a broken sidecar never prevents the document from loading
- ✔ Diagnosable: parse failures carry the message, text, and line of the
  offending input

## Quick Start

```rust
use pge_files::{open_level_from_buffer, save_level_to_buffer, FileFormat, LevelData};

let data = b"SMBXFile66\nA,1,\"Intro\"\nN,97,64,0,-1,0,\"Default\"\n";
let mut level = LevelData::default();
open_level_from_buffer(&data[..], "intro.lvlb", &mut level)?;
assert_eq!(level.meta.recent_format, FileFormat::Smbx38a);
assert_eq!(level.title, "Intro");
assert_eq!(level.npcs.len(), 1);

let out = save_level_to_buffer(&mut level, FileFormat::PgeX, 0)?;
assert!(out.starts_with(b"HEAD\nTL:\"Intro\";SZ:1;\nHEAD_END\n"));
# Ok::<(), pge_files::Error>(())
```

## Diagnostics

Every open and save reports failure twice: as the returned [`Error`] and in
the [`FileMeta`] of the document, whose fields mirror what an editor shows the
user.

```rust
use pge_files::{open_world_from_buffer, WorldData};

let mut world = WorldData::default();
let result = open_world_from_buffer(b"TILES\nID:1;X:0;\n", "", &mut world);
assert!(result.is_err());
assert!(!world.meta.read_file_valid);
assert_eq!(world.meta.error_info, "Section TILES is not terminated");
assert_eq!(world.meta.error_line_number, 2);
```

Only the sidecar is allowed to fail quietly: when a document loads but its
`.meta` file doesn't, the open succeeds and `error_info` reads
[`CANT_OPEN_META_FILE`].

*/

mod detect;
mod document;
mod encoding;
mod errors;
mod formats;
mod level;
mod meta;
mod open;
mod save;
pub mod stream;
mod world;

pub use self::detect::{looks_like_smbx64, FileFormat, PREFIX_LEN};
pub use self::encoding::TextEncoding;
pub use self::errors::*;
pub use self::formats::{smbx38a::SMBX38A_VERSION, smbx64::SMBX64_VERSION};
pub use self::level::*;
pub use self::meta::*;
pub use self::open::*;
pub use self::save::*;
pub use self::stream::{
    BufferInput, BufferOutput, FileInput, FileOutput, OutputMode, TextInput, TextOutput,
    TextOutputBuilder,
};
pub use self::world::*;
