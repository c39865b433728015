//! Value encoding for `.reg` files.
use std::fmt::Write;

use crate::registry::{RegValue, kind, multi_utf16z, utf16z};

/// Line terminator expected by the registry importer.
pub const CRLF: &str = "\r\n";

/// Bytes per line before a hex value is continued.
pub const HEX_BYTES_PER_LINE: usize = 25;

/// Escape `\` and `"` for a quoted `.reg` string.
#[must_use]
pub fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Left-hand side of a value line: `@` for the default value, otherwise
/// the quoted, escaped name.
#[must_use]
pub fn value_name(name: &str) -> String {
    if name.is_empty() {
        "@".to_string()
    } else {
        format!("\"{}\"", escape(name))
    }
}

/// Comma-separated lowercase hex pairs, continued with `,\` and a
/// two-space indent after every [`HEX_BYTES_PER_LINE`] bytes.
#[must_use]
pub fn hex_bytes(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 3);
    for (i, byte) in bytes.iter().enumerate() {
        if i > 0 {
            out.push(',');
            if i % HEX_BYTES_PER_LINE == 0 {
                out.push('\\');
                out.push_str(CRLF);
                out.push_str("  ");
            }
        }
        let _ = write!(out, "{byte:02x}");
    }
    out
}

/// Right-hand side of a value line.
#[must_use]
pub fn value_data(value: &RegValue) -> String {
    match value {
        RegValue::String(text) => format!("\"{}\"", escape(text)),
        RegValue::Dword(n) => format!("dword:{n:08x}"),
        RegValue::Qword(n) => format!("qword:{n:016x}"),
        RegValue::Binary(bytes) => format!("hex:{}", hex_bytes(bytes)),
        RegValue::ExpandString(text) => {
            format!("hex({:x}):{}", kind::EXPAND_SZ, hex_bytes(&utf16z(text)))
        }
        RegValue::MultiString(items) => {
            format!("hex({:x}):{}", kind::MULTI_SZ, hex_bytes(&multi_utf16z(items)))
        }
        RegValue::Other { kind, bytes } => format!("hex({kind:x}):{}", hex_bytes(bytes)),
    }
}

/// A complete value line, terminated with CRLF.
#[must_use]
pub fn value_line(name: &str, value: &RegValue) -> String {
    format!("{}={}{CRLF}", value_name(name), value_data(value))
}

/// Encode text as UTF-16LE with a leading byte-order mark.
#[must_use]
pub fn utf16le_with_bom(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(2 + text.len() * 2);
    out.extend_from_slice(&[0xFF, 0xFE]);
    for unit in text.encode_utf16() {
        out.extend_from_slice(&unit.to_le_bytes());
    }
    out
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn escapes_backslash_and_quote() {
        assert_eq!(
            value_data(&RegValue::String(r#"C:\"Program""#.to_string())),
            r#""C:\\\"Program\"""#
        );
    }

    #[test]
    fn default_value_is_at_sign() {
        assert_eq!(value_name(""), "@");
        assert_eq!(value_name(r#"a"b"#), r#""a\"b""#);
    }

    #[test]
    fn integers_are_zero_padded_lowercase() {
        assert_eq!(value_data(&RegValue::Dword(0xBEEF)), "dword:0000beef");
        assert_eq!(
            value_data(&RegValue::Qword(0x1_0000_00AB)),
            "qword:00000001000000ab"
        );
    }

    #[test]
    fn thirty_bytes_wrap_after_twenty_five() {
        let bytes: Vec<u8> = (0u8..30).collect();
        let encoded = value_data(&RegValue::Binary(bytes));
        let (first, second) = encoded.split_once(",\\\r\n  ").unwrap();
        assert_eq!(first.trim_start_matches("hex:").split(',').count(), 25);
        assert_eq!(second, "19,1a,1b,1c,1d");
    }

    #[test]
    fn exact_multiple_does_not_add_trailing_continuation() {
        let encoded = hex_bytes(&[0xAB; 25]);
        assert!(!encoded.contains('\\'));
        assert!(hex_bytes(&[]).is_empty());
    }

    #[test]
    fn expand_string_is_utf16_with_terminator() {
        assert_eq!(
            value_data(&RegValue::ExpandString("%A%".to_string())),
            "hex(2):25,00,41,00,25,00,00,00"
        );
    }

    #[test]
    fn multi_string_has_double_terminator() {
        assert_eq!(
            value_data(&RegValue::MultiString(vec!["a".to_string(), "b".to_string()])),
            "hex(7):61,00,00,00,62,00,00,00,00,00"
        );
    }

    #[test]
    fn other_kind_keeps_raw_bytes() {
        assert_eq!(
            value_data(&RegValue::Other {
                kind: 0,
                bytes: vec![1, 2],
            }),
            "hex(0):01,02"
        );
    }

    #[test]
    fn utf16_output_has_bom() {
        assert_eq!(utf16le_with_bom("A\r\n"), [0xFF, 0xFE, b'A', 0, b'\r', 0, b'\n', 0]);
    }
}
