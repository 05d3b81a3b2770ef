// In: src/pipeline/orchestrator/stage.rs

use std::collections::VecDeque;

use crate::pipeline::decorators::{feed_chain, finish_chain, Decorator};
use crate::registry::{CodecFns, CodecRegistry};
use crate::traits::{CodecState, EncodeResult};

/// One codec step of a running engine, with the decorators anchored to it.
///
/// A stage decodes units of its source encoding, runs each scalar through its
/// decorators into `staged`, and encodes `staged` into the next queue.
/// Scalars stay in `staged` only while the stage is paused on one of them.
#[derive(Debug)]
pub(crate) struct Stage {
    pub(crate) codec: CodecFns,
    /// The convpath index reported in outcomes raised by this stage.
    pub(crate) step_index: usize,
    pub(crate) decode_state: CodecState,
    pub(crate) encode_state: CodecState,
    pub(crate) decorators: Vec<Decorator>,
    staged: VecDeque<char>,
    /// Raw bytes of the unit the staged scalars came from.
    unit: Vec<u8>,
    scalars: Vec<char>,
}

impl Stage {
    pub(crate) fn new(codec: CodecFns, step_index: usize, decorators: Vec<Decorator>) -> Self {
        Self {
            codec,
            step_index,
            decode_state: CodecState::INITIAL,
            encode_state: CodecState::INITIAL,
            decorators,
            staged: VecDeque::new(),
            unit: Vec::new(),
            scalars: Vec::with_capacity(8),
        }
    }

    /// Accepts one decoded scalar and the bytes it was decoded from.
    pub(crate) fn accept(&mut self, ch: char, unit: &[u8], registry: &dyn CodecRegistry) {
        self.unit.clear();
        self.unit.extend_from_slice(unit);
        if self.decorators.is_empty() {
            self.staged.push_back(ch);
            return;
        }
        self.scalars.clear();
        feed_chain(&mut self.decorators, ch, registry, &mut self.scalars);
        self.staged.extend(self.scalars.drain(..));
    }

    /// Stages whatever the decorators emit at end of stream.
    pub(crate) fn finish_decorators(&mut self, registry: &dyn CodecRegistry) {
        self.scalars.clear();
        finish_chain(&mut self.decorators, registry, &mut self.scalars);
        self.staged.extend(self.scalars.drain(..));
    }

    /// Encodes staged scalars into `out` until one is undefined. That scalar is
    /// dropped from the stage and returned.
    pub(crate) fn encode_staged(&mut self, out: &mut VecDeque<u8>, scratch: &mut Vec<u8>) -> Option<char> {
        while let Some(ch) = self.staged.pop_front() {
            scratch.clear();
            match self.codec.encode_one(&mut self.encode_state, ch, scratch) {
                EncodeResult::Encoded => out.extend(scratch.iter().copied()),
                EncodeResult::Undefined => return Some(ch),
            }
        }
        None
    }

    /// Flushes the encoder's closing sequence into `out`.
    pub(crate) fn finish_encoder(&mut self, out: &mut VecDeque<u8>, scratch: &mut Vec<u8>) {
        scratch.clear();
        self.codec.finish(&mut self.encode_state, scratch);
        out.extend(scratch.iter().copied());
    }

    pub(crate) fn unit(&self) -> &[u8] {
        &self.unit
    }
}
