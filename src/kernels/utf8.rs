//! UTF-8 codec kernel.
//!
//! Decoding follows the "maximal subpart" rule: when a sequence breaks, the
//! rejected bytes are the longest prefix that could still have started a valid
//! sequence, and the byte that broke it is left for the next call.

use crate::traits::{Charset, CodecState, DecodeResult, EncodeResult};
use crate::types::EncodingDescriptor;

#[derive(Debug, Clone)]
pub struct Utf8 {
    descriptor: EncodingDescriptor,
}

impl Utf8 {
    pub fn new() -> Self {
        Self {
            descriptor: EncodingDescriptor::new("UTF-8", true, false),
        }
    }
}

impl Default for Utf8 {
    fn default() -> Self {
        Self::new()
    }
}

/// Returns the sequence length and the legal range of the second byte for a lead byte.
fn lead_info(lead: u8) -> Option<(usize, u8, u8)> {
    match lead {
        0xC2..=0xDF => Some((2, 0x80, 0xBF)),
        0xE0 => Some((3, 0xA0, 0xBF)),
        0xE1..=0xEC | 0xEE..=0xEF => Some((3, 0x80, 0xBF)),
        0xED => Some((3, 0x80, 0x9F)),
        0xF0 => Some((4, 0x90, 0xBF)),
        0xF1..=0xF3 => Some((4, 0x80, 0xBF)),
        0xF4 => Some((4, 0x80, 0x8F)),
        _ => None,
    }
}

impl Charset for Utf8 {
    fn descriptor(&self) -> &EncodingDescriptor {
        &self.descriptor
    }

    fn decode_one(&self, _state: &mut CodecState, input: &[u8]) -> DecodeResult {
        let lead = input[0];
        if lead < 0x80 {
            return DecodeResult::Scalar {
                ch: lead as char,
                consumed: 1,
            };
        }
        let Some((len, second_lo, second_hi)) = lead_info(lead) else {
            return DecodeResult::Invalid {
                error_len: 1,
                readagain_len: 0,
            };
        };

        let mut cp = (lead as u32) & (0x7F >> len);
        for i in 1..len {
            let Some(&b) = input.get(i) else {
                return DecodeResult::Incomplete;
            };
            let (lo, hi) = if i == 1 { (second_lo, second_hi) } else { (0x80, 0xBF) };
            if b < lo || b > hi {
                return DecodeResult::Invalid {
                    error_len: i,
                    readagain_len: 0,
                };
            }
            cp = (cp << 6) | (b as u32 & 0x3F);
        }

        match char::from_u32(cp) {
            Some(ch) => DecodeResult::Scalar { ch, consumed: len },
            None => DecodeResult::Invalid {
                error_len: len,
                readagain_len: 0,
            },
        }
    }

    fn encode_one(&self, _state: &mut CodecState, ch: char, out: &mut Vec<u8>) -> EncodeResult {
        let mut buf = [0u8; 4];
        out.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
        EncodeResult::Encoded
    }

    fn is_representable(&self, _ch: char) -> bool {
        true
    }
}
