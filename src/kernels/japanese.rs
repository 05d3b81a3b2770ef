//! EUC-JP and Shift_JIS codec kernels.
//!
//! Framing (which bytes form a unit) and error classification are done here.
//! The JIS X 0208/0212 character tables themselves come from `encoding_rs`,
//! which is asked about exactly one unit at a time.

use encoding_rs::{Encoding, EUC_JP, SHIFT_JIS};

use crate::traits::{Charset, CodecState, DecodeResult, EncodeResult};
use crate::types::EncodingDescriptor;

const HALFWIDTH_KATAKANA_BASE: u32 = 0xFF61;

fn invalid(error_len: usize) -> DecodeResult {
    DecodeResult::Invalid {
        error_len,
        readagain_len: 0,
    }
}

/// Decodes one complete unit through `encoding`, accepting only a single scalar.
fn decode_unit(encoding: &'static Encoding, unit: &[u8]) -> Option<char> {
    let text = encoding.decode_without_bom_handling_and_without_replacement(unit)?;
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => Some(ch),
        _ => None,
    }
}

/// Encodes one non-ASCII scalar through `encoding`. The result is accepted only
/// if it decodes back to the same scalar, which rejects the one-way mappings
/// of the web tables (U+00A5 to 0x5C, U+2212 to the full-width minus, ...).
fn encode_unit(encoding: &'static Encoding, ch: char) -> Option<Vec<u8>> {
    let mut buf = [0u8; 4];
    let (bytes, _, had_errors) = encoding.encode(ch.encode_utf8(&mut buf));
    if had_errors || bytes.is_empty() || bytes[0] < 0x80 {
        return None;
    }
    (decode_unit(encoding, &bytes) == Some(ch)).then(|| bytes.into_owned())
}

/// Writes `ch` through `encoding` only if `codec`'s own decoder reads the unit
/// back as exactly that scalar. The web tables carry single bytes (U+0080 as
/// 0x80 in Shift_JIS) that the native framing rejects.
fn encode_native(codec: &dyn Charset, encoding: &'static Encoding, ch: char, out: &mut Vec<u8>) -> EncodeResult {
    if ch.is_ascii() {
        out.push(ch as u8);
        return EncodeResult::Encoded;
    }
    let Some(bytes) = encode_unit(encoding, ch) else {
        return EncodeResult::Undefined;
    };
    match codec.decode_one(&mut CodecState::INITIAL, &bytes) {
        DecodeResult::Scalar { ch: back, consumed } if back == ch && consumed == bytes.len() => {
            out.extend_from_slice(&bytes);
            EncodeResult::Encoded
        }
        _ => EncodeResult::Undefined,
    }
}

/// Returns the EUC-JP code of a JIS X 0208 character (both bytes in 0xA1..=0xFE).
pub fn euc_jp_pair(ch: char) -> Option<[u8; 2]> {
    if ch.is_ascii() {
        return None;
    }
    match encode_unit(EUC_JP, ch)?.as_slice() {
        &[a @ 0xA1..=0xFE, b @ 0xA1..=0xFE] => Some([a, b]),
        _ => None,
    }
}

/// Decodes a JIS X 0208 pair given in EUC-JP form.
pub fn decode_euc_jp_pair(pair: [u8; 2]) -> Option<char> {
    decode_unit(EUC_JP, &pair)
}

//==================================================================================
// 1. EUC-JP
//==================================================================================

#[derive(Debug, Clone)]
pub struct EucJp {
    descriptor: EncodingDescriptor,
}

impl EucJp {
    pub fn new() -> Self {
        Self {
            descriptor: EncodingDescriptor::new("EUC-JP", true, false),
        }
    }
}

impl Default for EucJp {
    fn default() -> Self {
        Self::new()
    }
}

impl Charset for EucJp {
    fn descriptor(&self) -> &EncodingDescriptor {
        &self.descriptor
    }

    fn decode_one(&self, _state: &mut CodecState, input: &[u8]) -> DecodeResult {
        let lead = input[0];
        match lead {
            0x00..=0x7F => DecodeResult::Scalar {
                ch: lead as char,
                consumed: 1,
            },
            // SS2: half-width katakana
            0x8E => match input.get(1) {
                None => DecodeResult::Incomplete,
                Some(&trail @ 0xA1..=0xDF) => {
                    match char::from_u32(HALFWIDTH_KATAKANA_BASE + (trail - 0xA1) as u32) {
                        Some(ch) => DecodeResult::Scalar { ch, consumed: 2 },
                        None => invalid(2),
                    }
                }
                Some(_) => invalid(1),
            },
            // SS3: JIS X 0212
            0x8F => {
                for i in 1..3 {
                    match input.get(i) {
                        None => return DecodeResult::Incomplete,
                        Some(0xA1..=0xFE) => {}
                        Some(_) => return invalid(i),
                    }
                }
                match decode_unit(EUC_JP, &input[..3]) {
                    Some(ch) => DecodeResult::Scalar { ch, consumed: 3 },
                    None => invalid(3),
                }
            }
            0xA1..=0xFE => match input.get(1) {
                None => DecodeResult::Incomplete,
                Some(0xA1..=0xFE) => match decode_unit(EUC_JP, &input[..2]) {
                    Some(ch) => DecodeResult::Scalar { ch, consumed: 2 },
                    None => invalid(2),
                },
                Some(_) => invalid(1),
            },
            _ => invalid(1),
        }
    }

    fn encode_one(&self, _state: &mut CodecState, ch: char, out: &mut Vec<u8>) -> EncodeResult {
        encode_native(self, EUC_JP, ch, out)
    }
}

//==================================================================================
// 2. Shift_JIS
//==================================================================================

#[derive(Debug, Clone)]
pub struct ShiftJis {
    descriptor: EncodingDescriptor,
}

impl ShiftJis {
    pub fn new() -> Self {
        Self {
            descriptor: EncodingDescriptor::new("Shift_JIS", true, false),
        }
    }
}

impl Default for ShiftJis {
    fn default() -> Self {
        Self::new()
    }
}

impl Charset for ShiftJis {
    fn descriptor(&self) -> &EncodingDescriptor {
        &self.descriptor
    }

    fn decode_one(&self, _state: &mut CodecState, input: &[u8]) -> DecodeResult {
        let lead = input[0];
        match lead {
            0x00..=0x7F => DecodeResult::Scalar {
                ch: lead as char,
                consumed: 1,
            },
            0xA1..=0xDF => match char::from_u32(HALFWIDTH_KATAKANA_BASE + (lead - 0xA1) as u32) {
                Some(ch) => DecodeResult::Scalar { ch, consumed: 1 },
                None => invalid(1),
            },
            0x81..=0x9F | 0xE0..=0xFC => match input.get(1) {
                None => DecodeResult::Incomplete,
                Some(0x40..=0x7E | 0x80..=0xFC) => match decode_unit(SHIFT_JIS, &input[..2]) {
                    Some(ch) => DecodeResult::Scalar { ch, consumed: 2 },
                    None => invalid(2),
                },
                Some(_) => invalid(1),
            },
            _ => invalid(1),
        }
    }

    fn encode_one(&self, _state: &mut CodecState, ch: char, out: &mut Vec<u8>) -> EncodeResult {
        encode_native(self, SHIFT_JIS, ch, out)
    }
}
