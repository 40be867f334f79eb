//! Byte and text helpers shared by the resolvers and the layout engine.

use std::borrow::Cow;

use bstr::ByteSlice;

/// Decode bytes to a string, handling various encodings.
///
/// This function:
/// 1. First tries UTF-8 (handles BOM automatically via encoding_rs)
/// 2. If malformed, tries the hint encoding, or the one named by an
///    `<?xml encoding="..."?>` declaration
/// 3. Falls back to Windows-1252
///
/// Uses `Cow<str>` to avoid allocation when the input is valid UTF-8.
pub fn decode_text<'a>(bytes: &'a [u8], hint_encoding: Option<&str>) -> Cow<'a, str> {
    let (result, _encoding, malformed) = encoding_rs::UTF_8.decode(bytes);

    if !malformed {
        return result;
    }

    let declared = xml_declared_encoding(bytes);
    if let Some(name) = hint_encoding.or(declared.as_deref())
        && let Some(encoding) = encoding_rs::Encoding::for_label(name.as_bytes())
    {
        let (result, _, _) = encoding.decode(bytes);
        return result;
    }

    let (result, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
    result
}

/// The `encoding` named in a leading XML declaration, if any.
fn xml_declared_encoding(bytes: &[u8]) -> Option<String> {
    let decl_end = bytes.find("?>")?;
    let decl = bytes[..decl_end].trim_start();
    if !decl.starts_with(b"<?xml") {
        return None;
    }
    let start = decl.find("encoding=")? + "encoding=".len();
    let quote = *decl.get(start)?;
    let value = &decl[start + 1..];
    let end = memchr::memchr(quote, value)?;
    Some(value[..end].to_str_lossy().into_owned())
}

/// Collapse every run of two or more spaces into a single space.
pub fn collapse_spaces(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len());
    for &b in data {
        if b == b' ' && out.last() == Some(&b' ') {
            continue;
        }
        out.push(b);
    }
    out
}

/// Number of terminal columns `data` occupies: one per character, with
/// ANSI escape sequences counting as zero.
pub fn display_width(data: &[u8]) -> usize {
    let mut width = 0;
    let mut in_escape = false;
    for c in data.chars() {
        if in_escape {
            if c.is_ascii_alphabetic() {
                in_escape = false;
            }
            continue;
        }
        if c == '\x1b' {
            in_escape = true;
            continue;
        }
        width += 1;
    }
    width
}
