//! Small helpers shared by the error display code, the decorators and the tests.

use std::fmt::Write;

/// Renders bytes the way diagnostics quote them: printable ASCII as-is, everything
/// else as `\xHH`, wrapped in double quotes.
pub fn escape_bytes(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 4 + 2);
    out.push('"');
    for &b in bytes {
        match b {
            b'"' => out.push_str("\\\""),
            b'\\' => out.push_str("\\\\"),
            0x20..=0x7E => out.push(b as char),
            _ => {
                let _ = write!(out, "\\x{:02X}", b);
            }
        }
    }
    out.push('"');
    out
}

/// `U+XXXX` notation for a scalar value.
pub fn scalar_label(ch: &char) -> String {
    format!("U+{:04X}", *ch as u32)
}

/// Formats a scalar as an upper-case hexadecimal XML character reference.
pub fn hex_charref(ch: char) -> String {
    format!("&#x{:X};", ch as u32)
}
