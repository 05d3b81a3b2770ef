//! ISO-2022-JP codec kernel, the one stateful built-in encoding.
//!
//! The `CodecState` holds the currently designated character set. The decoder
//! reports escape sequences as `StateChange`; the encoder emits them on demand
//! and `finish` returns the stream to ASCII.

use crate::kernels::japanese::{decode_euc_jp_pair, euc_jp_pair};
use crate::traits::{Charset, CodecState, DecodeResult, EncodeResult};
use crate::types::EncodingDescriptor;

const ESC: u8 = 0x1B;
const SO: u8 = 0x0E;
const SI: u8 = 0x0F;

const STATE_ASCII: u32 = 0;
const STATE_ROMAN: u32 = 1;
const STATE_JIS0208: u32 = 2;

const TO_ASCII: &[u8] = b"\x1b(B";
const TO_JIS0208: &[u8] = b"\x1b$B";

#[derive(Debug, Clone)]
pub struct Iso2022Jp {
    descriptor: EncodingDescriptor,
}

impl Iso2022Jp {
    pub fn new() -> Self {
        Self {
            descriptor: EncodingDescriptor::new("ISO-2022-JP", false, true),
        }
    }

    fn decode_escape(&self, state: &mut CodecState, input: &[u8]) -> DecodeResult {
        let Some(&intermediate) = input.get(1) else {
            return DecodeResult::Incomplete;
        };
        if intermediate != b'(' && intermediate != b'$' {
            return DecodeResult::Invalid {
                error_len: 1,
                readagain_len: 0,
            };
        }
        let Some(&final_byte) = input.get(2) else {
            return DecodeResult::Incomplete;
        };
        let next = match (intermediate, final_byte) {
            (b'(', b'B') => STATE_ASCII,
            (b'(', b'J') => STATE_ROMAN,
            (b'$', b'@') | (b'$', b'B') => STATE_JIS0208,
            _ => {
                return DecodeResult::Invalid {
                    error_len: 2,
                    readagain_len: 0,
                }
            }
        };
        state.set(next);
        DecodeResult::StateChange { consumed: 3 }
    }
}

impl Default for Iso2022Jp {
    fn default() -> Self {
        Self::new()
    }
}

impl Charset for Iso2022Jp {
    fn descriptor(&self) -> &EncodingDescriptor {
        &self.descriptor
    }

    fn decode_one(&self, state: &mut CodecState, input: &[u8]) -> DecodeResult {
        let b = input[0];
        if b == ESC {
            return self.decode_escape(state, input);
        }
        if b == SO || b == SI || b >= 0x80 {
            return DecodeResult::Invalid {
                error_len: 1,
                readagain_len: 0,
            };
        }
        match state.get() {
            STATE_JIS0208 if (0x21..=0x7E).contains(&b) => match input.get(1) {
                None => DecodeResult::Incomplete,
                Some(&trail @ 0x21..=0x7E) => match decode_euc_jp_pair([b | 0x80, trail | 0x80]) {
                    Some(ch) => DecodeResult::Scalar { ch, consumed: 2 },
                    None => DecodeResult::Invalid {
                        error_len: 2,
                        readagain_len: 0,
                    },
                },
                Some(_) => DecodeResult::Invalid {
                    error_len: 1,
                    readagain_len: 0,
                },
            },
            STATE_ROMAN if b == 0x5C => DecodeResult::Scalar {
                ch: '\u{A5}',
                consumed: 1,
            },
            STATE_ROMAN if b == 0x7E => DecodeResult::Scalar {
                ch: '\u{203E}',
                consumed: 1,
            },
            _ => DecodeResult::Scalar {
                ch: b as char,
                consumed: 1,
            },
        }
    }

    fn encode_one(&self, state: &mut CodecState, ch: char, out: &mut Vec<u8>) -> EncodeResult {
        if ch.is_ascii() {
            let b = ch as u8;
            if b == ESC || b == SO || b == SI {
                return EncodeResult::Undefined;
            }
            if state.get() != STATE_ASCII {
                out.extend_from_slice(TO_ASCII);
                state.set(STATE_ASCII);
            }
            out.push(b);
            return EncodeResult::Encoded;
        }
        match euc_jp_pair(ch) {
            Some([a, b]) => {
                if state.get() != STATE_JIS0208 {
                    out.extend_from_slice(TO_JIS0208);
                    state.set(STATE_JIS0208);
                }
                out.push(a & 0x7F);
                out.push(b & 0x7F);
                EncodeResult::Encoded
            }
            None => EncodeResult::Undefined,
        }
    }

    fn finish(&self, state: &mut CodecState, out: &mut Vec<u8>) {
        if state.get() != STATE_ASCII {
            out.extend_from_slice(TO_ASCII);
        }
        *state = CodecState::INITIAL;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoder_switches_sets_and_finishes_in_ascii() {
        let codec = Iso2022Jp::new();
        let mut state = CodecState::INITIAL;
        let mut out = Vec::new();
        for ch in "aあい".chars() {
            assert_eq!(codec.encode_one(&mut state, ch, &mut out), EncodeResult::Encoded);
        }
        assert_eq!(codec.encode_one(&mut state, '♡', &mut out), EncodeResult::Undefined);
        codec.finish(&mut state, &mut out);
        assert_eq!(out, b"a\x1b$B$\"$$\x1b(B".to_vec());
        assert!(state.is_initial());

        // Finishing an ASCII-state stream emits nothing.
        let mut tail = Vec::new();
        codec.finish(&mut state, &mut tail);
        assert!(tail.is_empty());
    }

    #[test]
    fn test_decoder_tracks_escape_sequences() {
        let codec = Iso2022Jp::new();
        let mut state = CodecState::INITIAL;
        assert_eq!(
            codec.decode_one(&mut state, b"\x1b$B$\""),
            DecodeResult::StateChange { consumed: 3 }
        );
        assert_eq!(
            codec.decode_one(&mut state, b"$\""),
            DecodeResult::Scalar { ch: 'あ', consumed: 2 }
        );
        assert_eq!(
            codec.decode_one(&mut state, b"\x1b(J"),
            DecodeResult::StateChange { consumed: 3 }
        );
        assert_eq!(
            codec.decode_one(&mut state, b"\\"),
            DecodeResult::Scalar { ch: '¥', consumed: 1 }
        );
    }

    #[test]
    fn test_decoder_error_classification() {
        let codec = Iso2022Jp::new();
        let mut state = CodecState::INITIAL;
        assert_eq!(codec.decode_one(&mut state, b"\x1b"), DecodeResult::Incomplete);
        assert_eq!(codec.decode_one(&mut state, b"\x1b("), DecodeResult::Incomplete);
        assert_eq!(
            codec.decode_one(&mut state, b"\x1b(X"),
            DecodeResult::Invalid { error_len: 2, readagain_len: 0 }
        );
        assert_eq!(
            codec.decode_one(&mut state, &[0xA4]),
            DecodeResult::Invalid { error_len: 1, readagain_len: 0 }
        );
        // A failed escape leaves the designation untouched.
        assert!(state.is_initial());
    }
}
