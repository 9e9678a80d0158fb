use pge_files::{
    BufferInput, FileInput, OutputMode, TextEncoding, TextInput, TextOutput, TextOutputBuilder,
};
use pge_files::stream::SeekFrom;
use quickcheck_macros::quickcheck;
use std::io::Write;
use tempfile::NamedTempFile;

fn temp_file(data: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(data).unwrap();
    file.flush().unwrap();
    file
}

fn lines<R: TextInput>(input: &mut R) -> Vec<(String, i64, u64)> {
    let mut result = Vec::new();
    while !input.eof() {
        let line = input.read_line().unwrap();
        result.push((line, input.line_number(), input.tell()));
    }
    result
}

fn fields<R: TextInput>(input: &mut R) -> Vec<(String, bool, i64)> {
    let mut result = Vec::new();
    while !input.eof() {
        let field = input.read_field().unwrap();
        result.push((field.value.clone(), field.ends_line(), input.line_number()));
    }
    result
}

#[test]
fn file_and_buffer_agree_on_fixture() {
    let data = include_bytes!("./fixtures/classic.lvl");
    let mut file = FileInput::open("tests/fixtures/classic.lvl", TextEncoding::Windows1252).unwrap();
    let mut buffer = BufferInput::new(&data[..], "", TextEncoding::Windows1252);
    let expected = lines(&mut buffer);
    assert_eq!(lines(&mut file), expected);
    assert_eq!(expected[2].0, "\"Café classic\"");
    assert_eq!(expected.len(), 3 + 6 * 21 + 10 + 2 + 4);
}

#[quickcheck]
fn read_line_parity(data: Vec<u8>) -> bool {
    let file = temp_file(&data);
    let mut from_file = FileInput::open(file.path(), TextEncoding::Utf8).unwrap();
    let mut from_buffer = BufferInput::new(&data, file.path(), TextEncoding::Utf8);
    lines(&mut from_file) == lines(&mut from_buffer) && from_file.eof() && from_buffer.eof()
}

#[quickcheck]
fn read_field_parity(data: Vec<u8>) -> bool {
    let file = temp_file(&data);
    let mut from_file = FileInput::open(file.path(), TextEncoding::Windows1252).unwrap();
    let mut from_buffer = BufferInput::new(&data, "", TextEncoding::Windows1252);
    fields(&mut from_file) == fields(&mut from_buffer)
}

#[quickcheck]
fn seek_parity(data: Vec<u8>, offset: u16) -> bool {
    let file = temp_file(&data);
    let mut from_file = FileInput::open(file.path(), TextEncoding::Utf8).unwrap();
    let mut from_buffer = BufferInput::new(&data, "", TextEncoding::Utf8);
    let target = SeekFrom::Start(u64::from(offset));
    let a = from_file.seek(target).ok();
    let b = from_buffer.seek(target).ok();
    a == b
        && a.is_some() == (u64::from(offset) <= data.len() as u64)
        && from_file.read_all().ok() == from_buffer.read_all().ok()
}

#[test]
fn seek_past_end_fails() {
    let mut input = BufferInput::new(&b"abc"[..], "", TextEncoding::Utf8);
    assert!(input.seek(SeekFrom::Start(4)).is_err());
    assert!(input.seek(SeekFrom::Current(-1)).is_err());
    assert_eq!(input.seek(SeekFrom::End(-1)).unwrap(), 2);
    assert_eq!(input.read_all().unwrap(), "c");
}

#[test]
fn reopen_restarts_with_new_encoding() {
    let file = temp_file(b"caf\xe9\n");
    let mut input = FileInput::open(file.path(), TextEncoding::Utf8).unwrap();
    assert_eq!(input.read_line().unwrap(), "caf\u{fffd}");
    let mut input = input.reopen(TextEncoding::Windows1252).unwrap();
    assert_eq!(input.tell(), 0);
    assert_eq!(input.line_number(), 0);
    assert_eq!(input.encoding(), TextEncoding::Windows1252);
    assert_eq!(input.read_line().unwrap(), "café");

    let input = input.reopen(TextEncoding::Windows1252).unwrap();
    assert_eq!(input.path(), file.path());
}

#[test]
fn writer_parity() {
    let text = "64\n\"Café\"\r\n\"next\"\n";
    let builder = TextOutputBuilder::new()
        .encoding(TextEncoding::Windows1252)
        .force_crlf(true);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.lvl");
    let mut file = builder.open(&path).unwrap();
    let written = file.write(text).unwrap();
    assert_eq!(file.line_number(), 4);
    file.flush().unwrap();
    drop(file);

    let mut buffer = Vec::new();
    let mut out = builder.from_buffer(&mut buffer);
    assert_eq!(out.write(text).unwrap(), written);
    assert_eq!(out.tell(), written as u64);

    let on_disk = std::fs::read(&path).unwrap();
    assert_eq!(on_disk, buffer);
    assert_eq!(buffer, b"64\r\n\"Caf\xe9\"\r\n\"next\"\r\n");
}

#[test]
fn file_output_modes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("doc.txt");
    std::fs::write(&path, b"0123456789").unwrap();

    let mut out = TextOutputBuilder::new()
        .mode(OutputMode::Overwrite)
        .open(&path)
        .unwrap();
    out.write("ab").unwrap();
    out.flush().unwrap();
    drop(out);
    assert_eq!(std::fs::read(&path).unwrap(), b"ab23456789");

    let mut out = TextOutputBuilder::new()
        .mode(OutputMode::Append)
        .open(&path)
        .unwrap();
    assert_eq!(out.tell(), 10);
    out.write("!").unwrap();
    out.flush().unwrap();
    drop(out);
    assert_eq!(std::fs::read(&path).unwrap(), b"ab23456789!");

    let mut out = TextOutputBuilder::new().open(&path).unwrap();
    out.write("new").unwrap();
    out.flush().unwrap();
    drop(out);
    assert_eq!(std::fs::read(&path).unwrap(), b"new");
}
