//! This module defines the contract every per-encoding codec kernel implements.
//!
//! A `Charset` knows how to turn one logical unit of its bytes into a scalar
//! value and how to turn one scalar value back into bytes. It never buffers:
//! all running state lives in a caller-owned `CodecState` token, so the same
//! kernel instance can be shared by any number of engines at once.

use std::fmt::Debug;

use crate::types::EncodingDescriptor;

/// The opaque per-step state token of a codec.
///
/// Stateless encodings ignore it. Stateful encodings (ISO-2022-JP) keep their
/// current shift state in it; the meaning of the value belongs to the kernel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CodecState(u32);

impl CodecState {
    pub const INITIAL: CodecState = CodecState(0);

    pub fn get(self) -> u32 {
        self.0
    }

    pub fn set(&mut self, value: u32) {
        self.0 = value;
    }

    pub fn is_initial(self) -> bool {
        self.0 == 0
    }
}

/// What a single `decode_one` call found at the front of its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeResult {
    /// A complete unit decoded to `ch`, using `consumed` bytes.
    Scalar { ch: char, consumed: usize },
    /// A control sequence (e.g. an ISO-2022 escape) that only changed the state.
    StateChange { consumed: usize },
    /// The input is a proper prefix of a valid unit; more bytes are needed.
    Incomplete,
    /// The first `error_len` bytes are definitively rejected. The following
    /// `readagain_len` bytes were looked at and must be offered again.
    Invalid { error_len: usize, readagain_len: usize },
}

/// What a single `encode_one` call did with its scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeResult {
    Encoded,
    /// The scalar has no representation. Nothing was written.
    Undefined,
}

/// A per-encoding codec kernel.
pub trait Charset: Send + Sync + Debug {
    fn descriptor(&self) -> &EncodingDescriptor;

    /// Decodes the unit at the front of `input`. `input` is never empty.
    /// The state is only advanced when a unit is accepted.
    fn decode_one(&self, state: &mut CodecState, input: &[u8]) -> DecodeResult;

    /// Appends the encoding of `ch` to `out`, or returns `Undefined` without
    /// touching `out` or the state.
    fn encode_one(&self, state: &mut CodecState, ch: char, out: &mut Vec<u8>) -> EncodeResult;

    /// Appends whatever closing sequence the state requires and resets it.
    fn finish(&self, state: &mut CodecState, out: &mut Vec<u8>) {
        let _ = out;
        *state = CodecState::INITIAL;
    }

    /// Returns `true` if `ch` can be encoded from the initial state.
    fn is_representable(&self, ch: char) -> bool {
        let mut state = CodecState::INITIAL;
        let mut scratch = Vec::with_capacity(8);
        self.encode_one(&mut state, ch, &mut scratch) == EncodeResult::Encoded
    }
}
