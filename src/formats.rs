//! Readers and writers for each supported on-disk format, plus the `.meta`
//! sidecar. Every reader fills a document in place and reports the first
//! problem it finds as a parse error carrying the offending line.

pub(crate) mod pgex;
pub(crate) mod sidecar;
pub(crate) mod smbx38a;
pub(crate) mod smbx64;

#[cfg(feature = "faster_writer")]
pub(crate) use itoa::Integer;
#[cfg(not(feature = "faster_writer"))]
pub(crate) use std::fmt::Display as Integer;

/// Appends the decimal representation of an integer
#[cfg(feature = "faster_writer")]
pub(crate) fn push_int<I: Integer>(out: &mut String, value: I) {
    let mut buffer = itoa::Buffer::new();
    out.push_str(buffer.format(value));
}

/// Appends the decimal representation of an integer
#[cfg(not(feature = "faster_writer"))]
pub(crate) fn push_int<I: Integer>(out: &mut String, value: I) {
    use std::fmt::Write;
    let _ = write!(out, "{}", value);
}

/// Strips the surrounding double quotes of a legacy string field. Legacy
/// formats have no escape sequences.
pub(crate) fn unquote(raw: &str) -> Option<&str> {
    raw.strip_prefix('"')?.strip_suffix('"')
}

/// Appends a string as a legacy quoted field. Embedded double quotes can't be
/// represented, so they are replaced with single quotes.
pub(crate) fn push_quoted(out: &mut String, value: &str) {
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push('\''),
            '\r' | '\n' => out.push(' '),
            c => out.push(c),
        }
    }
    out.push('"');
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    #[rstest]
    #[case("\"abc\"", Some("abc"))]
    #[case("\"\"", Some(""))]
    #[case("\"", None)]
    #[case("abc", None)]
    #[case("\"abc", None)]
    fn unquoting(#[case] raw: &str, #[case] expected: Option<&str>) {
        assert_eq!(unquote(raw), expected);
    }

    #[test]
    fn quoting_replaces_double_quotes() {
        let mut out = String::new();
        push_quoted(&mut out, "say \"hi\"\n");
        assert_eq!(out, "\"say 'hi' \"");
    }

    #[test]
    fn integers() {
        let mut out = String::new();
        push_int(&mut out, -12i64);
        push_int(&mut out, 34u32);
        assert_eq!(out, "-1234");
    }
}
