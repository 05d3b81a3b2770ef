//! UTF-16 (big- and little-endian) codec kernel.

use crate::traits::{Charset, CodecState, DecodeResult, EncodeResult};
use crate::types::EncodingDescriptor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Big,
    Little,
}

#[derive(Debug, Clone)]
pub struct Utf16 {
    descriptor: EncodingDescriptor,
    endian: Endian,
}

impl Utf16 {
    pub fn new(endian: Endian) -> Self {
        let name = match endian {
            Endian::Big => "UTF-16BE",
            Endian::Little => "UTF-16LE",
        };
        Self {
            descriptor: EncodingDescriptor::new(name, false, false),
            endian,
        }
    }

    fn unit(&self, a: u8, b: u8) -> u32 {
        match self.endian {
            Endian::Big => u16::from_be_bytes([a, b]) as u32,
            Endian::Little => u16::from_le_bytes([a, b]) as u32,
        }
    }

    fn push_unit(&self, unit: u16, out: &mut Vec<u8>) {
        match self.endian {
            Endian::Big => out.extend_from_slice(&unit.to_be_bytes()),
            Endian::Little => out.extend_from_slice(&unit.to_le_bytes()),
        }
    }
}

impl Charset for Utf16 {
    fn descriptor(&self) -> &EncodingDescriptor {
        &self.descriptor
    }

    fn decode_one(&self, _state: &mut CodecState, input: &[u8]) -> DecodeResult {
        if input.len() < 2 {
            return DecodeResult::Incomplete;
        }
        let first = self.unit(input[0], input[1]);
        match first {
            0xD800..=0xDBFF => {
                // The high-order byte of the next unit decides whether it can be
                // a low surrogate. Everything read up to it is offered again.
                let high_idx = match self.endian {
                    Endian::Big => 2,
                    Endian::Little => 3,
                };
                let Some(&high) = input.get(high_idx) else {
                    return DecodeResult::Incomplete;
                };
                if !(0xDC..=0xDF).contains(&high) {
                    return DecodeResult::Invalid {
                        error_len: 2,
                        readagain_len: high_idx - 1,
                    };
                }
                if input.len() < 4 {
                    return DecodeResult::Incomplete;
                }
                let second = self.unit(input[2], input[3]);
                let cp = 0x10000 + ((first - 0xD800) << 10) + (second - 0xDC00);
                match char::from_u32(cp) {
                    Some(ch) => DecodeResult::Scalar { ch, consumed: 4 },
                    None => DecodeResult::Invalid {
                        error_len: 4,
                        readagain_len: 0,
                    },
                }
            }
            0xDC00..=0xDFFF => DecodeResult::Invalid {
                error_len: 2,
                readagain_len: 0,
            },
            _ => match char::from_u32(first) {
                Some(ch) => DecodeResult::Scalar { ch, consumed: 2 },
                None => DecodeResult::Invalid {
                    error_len: 2,
                    readagain_len: 0,
                },
            },
        }
    }

    fn encode_one(&self, _state: &mut CodecState, ch: char, out: &mut Vec<u8>) -> EncodeResult {
        let mut units = [0u16; 2];
        for &unit in ch.encode_utf16(&mut units).iter() {
            self.push_unit(unit, out);
        }
        EncodeResult::Encoded
    }

    fn is_representable(&self, _ch: char) -> bool {
        true
    }
}
