//! UTF-32 (big- and little-endian) codec kernel.

use crate::kernels::utf16::Endian;
use crate::traits::{Charset, CodecState, DecodeResult, EncodeResult};
use crate::types::EncodingDescriptor;

#[derive(Debug, Clone)]
pub struct Utf32 {
    descriptor: EncodingDescriptor,
    endian: Endian,
}

impl Utf32 {
    pub fn new(endian: Endian) -> Self {
        let name = match endian {
            Endian::Big => "UTF-32BE",
            Endian::Little => "UTF-32LE",
        };
        Self {
            descriptor: EncodingDescriptor::new(name, false, false),
            endian,
        }
    }
}

impl Charset for Utf32 {
    fn descriptor(&self) -> &EncodingDescriptor {
        &self.descriptor
    }

    fn decode_one(&self, _state: &mut CodecState, input: &[u8]) -> DecodeResult {
        if input.len() < 4 {
            return DecodeResult::Incomplete;
        }
        let raw = [input[0], input[1], input[2], input[3]];
        let value = match self.endian {
            Endian::Big => u32::from_be_bytes(raw),
            Endian::Little => u32::from_le_bytes(raw),
        };
        match char::from_u32(value) {
            Some(ch) => DecodeResult::Scalar { ch, consumed: 4 },
            None => DecodeResult::Invalid {
                error_len: 4,
                readagain_len: 0,
            },
        }
    }

    fn encode_one(&self, _state: &mut CodecState, ch: char, out: &mut Vec<u8>) -> EncodeResult {
        let value = ch as u32;
        match self.endian {
            Endian::Big => out.extend_from_slice(&value.to_be_bytes()),
            Endian::Little => out.extend_from_slice(&value.to_le_bytes()),
        }
        EncodeResult::Encoded
    }

    fn is_representable(&self, _ch: char) -> bool {
        true
    }
}
