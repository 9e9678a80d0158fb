#![no_main]
use libfuzzer_sys::fuzz_target;
use pge_files::{BufferInput, FileFormat, TextEncoding, TextInput};

fuzz_target!(|data: &[u8]| {
    let mut input = BufferInput::new(data, "", TextEncoding::Utf8);
    if let Ok(prefix) = input.read(pge_files::PREFIX_LEN) {
        let _ = FileFormat::detect(&prefix);
    }

    let _ = input.seek(pge_files::stream::SeekFrom::Start(0));
    while !input.eof() {
        if input.read_field().is_err() {
            break;
        }
    }
});
