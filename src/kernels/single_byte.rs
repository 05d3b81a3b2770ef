//! Single-byte codec kernels: US-ASCII, ISO-8859-1 and the table-driven legacy
//! encodings whose upper halves come from the `encoding_rs` index tables.

use encoding_rs::Encoding;

use crate::traits::{Charset, CodecState, DecodeResult, EncodeResult};
use crate::types::EncodingDescriptor;

const INVALID_BYTE: DecodeResult = DecodeResult::Invalid {
    error_len: 1,
    readagain_len: 0,
};

//==================================================================================
// 1. US-ASCII
//==================================================================================

#[derive(Debug, Clone)]
pub struct Ascii {
    descriptor: EncodingDescriptor,
}

impl Ascii {
    pub fn new() -> Self {
        Self {
            descriptor: EncodingDescriptor::new("US-ASCII", true, false),
        }
    }
}

impl Default for Ascii {
    fn default() -> Self {
        Self::new()
    }
}

impl Charset for Ascii {
    fn descriptor(&self) -> &EncodingDescriptor {
        &self.descriptor
    }

    fn decode_one(&self, _state: &mut CodecState, input: &[u8]) -> DecodeResult {
        match input[0] {
            b @ 0x00..=0x7F => DecodeResult::Scalar {
                ch: b as char,
                consumed: 1,
            },
            _ => INVALID_BYTE,
        }
    }

    fn encode_one(&self, _state: &mut CodecState, ch: char, out: &mut Vec<u8>) -> EncodeResult {
        if ch.is_ascii() {
            out.push(ch as u8);
            EncodeResult::Encoded
        } else {
            EncodeResult::Undefined
        }
    }
}

//==================================================================================
// 2. ISO-8859-1
//==================================================================================

#[derive(Debug, Clone)]
pub struct Latin1 {
    descriptor: EncodingDescriptor,
}

impl Latin1 {
    pub fn new() -> Self {
        Self {
            descriptor: EncodingDescriptor::new("ISO-8859-1", true, false),
        }
    }
}

impl Default for Latin1 {
    fn default() -> Self {
        Self::new()
    }
}

impl Charset for Latin1 {
    fn descriptor(&self) -> &EncodingDescriptor {
        &self.descriptor
    }

    fn decode_one(&self, _state: &mut CodecState, input: &[u8]) -> DecodeResult {
        DecodeResult::Scalar {
            ch: input[0] as char,
            consumed: 1,
        }
    }

    fn encode_one(&self, _state: &mut CodecState, ch: char, out: &mut Vec<u8>) -> EncodeResult {
        match u8::try_from(ch as u32) {
            Ok(b) => {
                out.push(b);
                EncodeResult::Encoded
            }
            Err(_) => EncodeResult::Undefined,
        }
    }
}

//==================================================================================
// 3. Table-driven legacy encodings
//==================================================================================

/// An ASCII-compatible single-byte encoding whose bytes 0x80..=0xFF are looked
/// up in a table built once from an `encoding_rs` encoding.
#[derive(Debug, Clone)]
pub struct TableSingleByte {
    descriptor: EncodingDescriptor,
    upper: [Option<char>; 128],
}

impl TableSingleByte {
    /// Builds the table by decoding every upper-half byte once. Bytes the source
    /// table leaves unmapped decode as invalid.
    pub fn from_encoding(name: &str, encoding: &'static Encoding) -> Self {
        let mut upper = [None; 128];
        for (i, slot) in upper.iter_mut().enumerate() {
            let byte = [0x80 + i as u8];
            if let Some(text) = encoding.decode_without_bom_handling_and_without_replacement(&byte) {
                let mut chars = text.chars();
                if let (Some(ch), None) = (chars.next(), chars.next()) {
                    *slot = Some(ch);
                }
            }
        }
        log::trace!("built single-byte table for {}", name);
        Self {
            descriptor: EncodingDescriptor::new(name, true, false),
            upper,
        }
    }

    /// The number of mapped upper-half bytes.
    pub fn mapped_count(&self) -> usize {
        self.upper.iter().filter(|slot| slot.is_some()).count()
    }
}

impl Charset for TableSingleByte {
    fn descriptor(&self) -> &EncodingDescriptor {
        &self.descriptor
    }

    fn decode_one(&self, _state: &mut CodecState, input: &[u8]) -> DecodeResult {
        let b = input[0];
        if b < 0x80 {
            return DecodeResult::Scalar {
                ch: b as char,
                consumed: 1,
            };
        }
        match self.upper[(b - 0x80) as usize] {
            Some(ch) => DecodeResult::Scalar { ch, consumed: 1 },
            None => INVALID_BYTE,
        }
    }

    fn encode_one(&self, _state: &mut CodecState, ch: char, out: &mut Vec<u8>) -> EncodeResult {
        if ch.is_ascii() {
            out.push(ch as u8);
            return EncodeResult::Encoded;
        }
        match self.upper.iter().position(|slot| *slot == Some(ch)) {
            Some(i) => {
                out.push(0x80 + i as u8);
                EncodeResult::Encoded
            }
            None => EncodeResult::Undefined,
        }
    }
}
