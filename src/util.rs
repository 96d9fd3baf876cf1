//! Input decoding helpers.

use std::borrow::Cow;

use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use tracing::debug;

/// Decode feed bytes to a string.
///
/// The encoding comes from the first of: a byte order mark, the caller's
/// label (an HTTP `charset` or a command-line flag), the document's own XML
/// declaration. Without any of those the bytes are read as UTF-8, and
/// malformed UTF-8 is re-read as Windows-1252, a superset of ISO-8859-1.
///
/// Returns a borrowed string when the input is valid UTF-8.
pub fn decode_text<'a>(bytes: &'a [u8], label: Option<&str>) -> Cow<'a, str> {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        return encoding
            .decode_without_bom_handling(&bytes[bom_len..])
            .0;
    }

    let chosen = label
        .and_then(|l| Encoding::for_label(l.as_bytes()))
        .or_else(|| {
            xml_declared_encoding(bytes)
                .and_then(|l| Encoding::for_label(l.as_bytes()))
                .map(Encoding::output_encoding)
        });

    match chosen {
        Some(encoding) if encoding != UTF_8 => {
            debug!(encoding = encoding.name(), "decoding with declared encoding");
            encoding.decode_without_bom_handling(bytes).0
        }
        _ => match UTF_8.decode_without_bom_handling_and_without_replacement(bytes) {
            Some(text) => text,
            None => {
                debug!("malformed UTF-8, falling back to windows-1252");
                WINDOWS_1252.decode_without_bom_handling(bytes).0
            }
        },
    }
}

/// Pull the `encoding` pseudo-attribute out of a leading XML declaration.
fn xml_declared_encoding(bytes: &[u8]) -> Option<&str> {
    let head = bytes.get(..bytes.len().min(200))?;
    let end = head.windows(2).position(|w| w == b"?>")?;
    let decl = std::str::from_utf8(head.get(..end)?).ok()?;
    let decl = decl.trim_start_matches('\u{feff}').strip_prefix("<?xml")?;

    let rest = &decl[decl.find("encoding")? + "encoding".len()..];
    let rest = rest.trim_start().strip_prefix('=')?.trim_start();
    let quote = rest.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let value = &rest[1..];
    Some(&value[..value.find(quote)?])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8_is_borrowed() {
        let out = decode_text("héllo".as_bytes(), None);
        assert!(matches!(out, Cow::Borrowed("héllo")));
    }

    #[test]
    fn test_hint_encoding() {
        // "Привет" in KOI8-R
        let bytes = [0xf0, 0xd2, 0xc9, 0xd7, 0xc5, 0xd4];
        assert_eq!(decode_text(&bytes, Some("koi8-r")), "Привет");
    }

    #[test]
    fn test_xml_declaration_picks_encoding() {
        // "Привет" in Windows-1251
        let mut doc = br#"<?xml version="1.0" encoding="windows-1251"?>"#.to_vec();
        doc.extend_from_slice(b"\xcf\xf0\xe8\xe2\xe5\xf2");
        assert!(decode_text(&doc, None).ends_with("?>Привет"));
    }

    #[test]
    fn test_bom_wins_over_label() {
        let bytes = b"\xef\xbb\xbfcaf\xc3\xa9";
        assert_eq!(decode_text(bytes, Some("koi8-r")), "café");
    }

    #[test]
    fn test_windows_1252_fallback() {
        assert_eq!(decode_text(b"caf\xe9", None), "café");
        assert_eq!(decode_text(b"caf\xe9", Some("no-such-encoding")), "café");
    }

    #[test]
    fn test_xml_declared_encoding() {
        let doc = br#"<?xml version="1.0" encoding="windows-1251"?><rss/>"#;
        assert_eq!(xml_declared_encoding(doc), Some("windows-1251"));
        assert_eq!(xml_declared_encoding(b"<?xml version='1.0' encoding='koi8-r'?>"), Some("koi8-r"));
        assert_eq!(xml_declared_encoding(b"<?xml version=\"1.0\"?>"), None);
        assert_eq!(xml_declared_encoding(b"<p>no declaration</p>"), None);
    }
}
