// In: src/pipeline/orchestrator/core.rs

//! The conversion engine.
//!
//! An `Engine` drives a resolved plan over caller-supplied chunks. It has one
//! `Stage` per codec step and `n + 1` byte queues for `n` stages:
//!
//! ```text
//!   source --> [queue 0] --stage 0--> [queue 1] --stage 1--> ... [queue n] --> dest
//!              pending +                 complete units only        staged output
//!              readagain
//! ```
//!
//! Only queue 0 may hold a partial unit. Every data error pauses the engine
//! and is recorded in its diagnostics cell; `primitive_convert` never applies
//! the error policy, `convert` and `finish` do.

use std::collections::VecDeque;
use std::sync::Arc;

use crate::config::{ConverterOptions, InvalidAction, UndefAction};
use crate::error::TranscodeError;
use crate::kernels::MAX_UNIT_LEN;
use crate::pipeline::decorators::Decorator;
use crate::pipeline::models::{
    ConversionOutcome, ConversionPlan, ConvertFlags, EngineState, PipelineStep,
};
use crate::pipeline::orchestrator::stage::Stage;
use crate::traits::{DecodeResult, EncodeResult};
use crate::types::EncodingDescriptor;
use crate::utils::hex_charref;

/// How far past the pending bytes stage 0 looks when it has to decode from a
/// copy of pending + source.
const WINDOW_EXTRA: usize = MAX_UNIT_LEN * 2;

/// What one attempt to decode from stage 0's input produced.
enum InputStep {
    Continue,
    Exhausted,
    Pause(ConversionOutcome),
}

/// Moves the first `n` bytes of pending + source out, advancing `source`.
fn take_input<'a>(pending: &mut VecDeque<u8>, source: &mut &'a [u8], n: usize) -> Vec<u8> {
    let from_pending = n.min(pending.len());
    let mut bytes: Vec<u8> = pending.drain(..from_pending).collect();
    let rest = n - from_pending;
    let s: &'a [u8] = *source;
    bytes.extend_from_slice(&s[..rest]);
    *source = &s[rest..];
    bytes
}

//==================================================================================
// 1. Construction
//==================================================================================

/// A stateful, resumable converter for one stream.
///
/// An engine is exclusively owned by its caller. It is `Send`, so independent
/// engines may run on separate threads, but one engine must not be driven from
/// two threads at once.
#[derive(Debug)]
pub struct Engine {
    plan: Arc<ConversionPlan>,
    options: ConverterOptions,
    replacement: String,
    stages: Vec<Stage>,
    queues: Vec<VecDeque<u8>>,
    state: EngineState,
    /// The diagnostics cell: the most recent pausing outcome.
    last_outcome: Option<ConversionOutcome>,
    /// The stage whose data error paused the engine last.
    paused_stage: Option<usize>,
    /// How many bytes at the front of queue 0 `putback` may return.
    putback_len: usize,
    window: Vec<u8>,
    scratch: Vec<u8>,
}

impl Engine {
    /// Creates an engine with default options (raise on every data error).
    pub fn new(plan: ConversionPlan) -> Self {
        let options = ConverterOptions::default();
        let replacement = default_replacement(plan.destination());
        Self::build(plan, options, replacement)
    }

    /// Creates an engine that applies `options` in `convert`/`finish`.
    ///
    /// Fails if an explicit replacement cannot be represented in the destination.
    pub fn with_options(plan: ConversionPlan, options: ConverterOptions) -> Result<Self, TranscodeError> {
        let default = default_replacement(plan.destination());
        let explicit = options.replace.clone();
        let mut engine = Self::build(plan, options, default);
        if let Some(text) = explicit {
            engine.set_replacement(&text)?;
        }
        Ok(engine)
    }

    fn build(plan: ConversionPlan, options: ConverterOptions, replacement: String) -> Self {
        let stages = build_stages(&plan);
        let queues = vec![VecDeque::new(); stages.len() + 1];
        log::debug!(
            "engine created for {} -> {} with {} stage(s)",
            plan.source(),
            plan.destination(),
            stages.len()
        );
        Self {
            plan: Arc::new(plan),
            options,
            replacement,
            stages,
            queues,
            state: EngineState::Ready,
            last_outcome: None,
            paused_stage: None,
            putback_len: 0,
            window: Vec::with_capacity(WINDOW_EXTRA * 2),
            scratch: Vec::with_capacity(16),
        }
    }
}

/// U+FFFD for Unicode destinations, `?` for everything else.
fn default_replacement(destination: &EncodingDescriptor) -> String {
    if destination.is_unicode() {
        "\u{FFFD}".to_string()
    } else {
        "?".to_string()
    }
}

/// One stage per codec step. Each decorator joins the stage of the codec step
/// before it, or the first stage if none precedes it.
fn build_stages(plan: &ConversionPlan) -> Vec<Stage> {
    let destination = plan.destination();
    let mut stages: Vec<Stage> = Vec::new();
    let mut leading: Vec<Decorator> = Vec::new();
    let mut codecs = plan.codecs().iter();

    for (index, step) in plan.steps().iter().enumerate() {
        match step {
            PipelineStep::CodecStep { .. } => {
                if let Some(codec) = codecs.next() {
                    let decorators = std::mem::take(&mut leading);
                    stages.push(Stage::new(codec.clone(), index, decorators));
                }
            }
            PipelineStep::DecoratorStep { kind } => {
                let decorator = Decorator::new(*kind, destination.clone());
                match stages.last_mut() {
                    Some(stage) => stage.decorators.push(decorator),
                    None => leading.push(decorator),
                }
            }
        }
    }

    if stages.is_empty() {
        if let Some(codec) = plan.passthrough() {
            stages.push(Stage::new(codec.clone(), 0, leading));
        }
    }
    stages
}

//==================================================================================
// 2. The Conversion Loop
//==================================================================================

impl Engine {
    /// Converts as much of `source` as possible into `dest`.
    ///
    /// `source` is advanced past every byte the engine accepted. Output is
    /// written from `dest_offset` (default: the end of `dest`; `dest` is
    /// truncated to it) and at most `dest_limit` bytes are written.
    pub fn primitive_convert(
        &mut self,
        source: &mut &[u8],
        dest: &mut Vec<u8>,
        dest_offset: Option<usize>,
        dest_limit: Option<usize>,
        flags: ConvertFlags,
    ) -> Result<ConversionOutcome, TranscodeError> {
        if self.state == EngineState::Finished {
            return Err(TranscodeError::EngineAlreadyFinished);
        }
        let offset = dest_offset.unwrap_or(dest.len());
        if offset > dest.len() {
            return Err(TranscodeError::InvalidArgument(format!(
                "destination offset {} is past the end of a {}-byte buffer",
                offset,
                dest.len()
            )));
        }
        dest.truncate(offset);
        let limit = dest_limit.map(|l| offset.saturating_add(l));

        self.state = EngineState::Ready;
        self.putback_len = 0;
        self.paused_stage = None;

        let outcome = self.run(source, dest, limit, flags)?;
        self.record(&outcome);
        Ok(outcome)
    }

    fn run(
        &mut self,
        source: &mut &[u8],
        dest: &mut Vec<u8>,
        limit: Option<usize>,
        flags: ConvertFlags,
    ) -> Result<ConversionOutcome, TranscodeError> {
        let start_len = dest.len();
        loop {
            if let Some(outcome) = self.pump()? {
                return Ok(outcome);
            }
            if !self.deliver(dest, limit) {
                return Ok(ConversionOutcome::DestinationFull);
            }
            let input_left = !source.is_empty() || !self.queues[0].is_empty();
            if flags.after_output && dest.len() > start_len && input_left {
                return Ok(ConversionOutcome::AfterOutput);
            }
            match self.decode_input(source, flags)? {
                InputStep::Continue => continue,
                InputStep::Pause(outcome) => return Ok(outcome),
                InputStep::Exhausted => {}
            }
            if flags.partial_input {
                return Ok(ConversionOutcome::SourceEmpty);
            }
            if let Some(outcome) = self.finish_stages()? {
                return Ok(outcome);
            }
            if !self.deliver(dest, limit) {
                return Ok(ConversionOutcome::DestinationFull);
            }
            return Ok(ConversionOutcome::Finished);
        }
    }

    /// Moves staged output into `dest`. Returns `false` if the limit left some behind.
    fn deliver(&mut self, dest: &mut Vec<u8>, limit: Option<usize>) -> bool {
        let Some(out) = self.queues.last_mut() else {
            return true;
        };
        let room = limit.map_or(usize::MAX, |l| l.saturating_sub(dest.len()));
        let n = room.min(out.len());
        dest.extend(out.drain(..n));
        out.is_empty()
    }

    /// Drives every stage until all inter-stage queues are empty.
    fn pump(&mut self) -> Result<Option<ConversionOutcome>, TranscodeError> {
        for i in 0..self.stages.len() {
            if let Some(outcome) = self.encode_staged(i) {
                return Ok(Some(outcome));
            }
            if i > 0 {
                if let Some(outcome) = self.drain_queue(i)? {
                    return Ok(Some(outcome));
                }
            }
        }
        Ok(None)
    }

    fn encode_staged(&mut self, i: usize) -> Option<ConversionOutcome> {
        let stage = &mut self.stages[i];
        let ch = stage.encode_staged(&mut self.queues[i + 1], &mut self.scratch)?;
        self.paused_stage = Some(i);
        Some(ConversionOutcome::UndefinedConversion {
            char_bytes: stage.unit().to_vec(),
            scalar: ch,
            step: stage.step_index,
        })
    }

    /// Decodes the complete units waiting in front of stage `i` (`i > 0`).
    fn drain_queue(&mut self, i: usize) -> Result<Option<ConversionOutcome>, TranscodeError> {
        while !self.queues[i].is_empty() {
            let registry = self.plan.registry().as_ref();
            let stage = &mut self.stages[i];
            let queue = &mut self.queues[i];
            match stage.codec.decode_one(&mut stage.decode_state, queue.make_contiguous()) {
                DecodeResult::Scalar { ch, consumed } => {
                    let unit: Vec<u8> = queue.drain(..consumed).collect();
                    stage.accept(ch, &unit, registry);
                    if let Some(outcome) = self.encode_staged(i) {
                        return Ok(Some(outcome));
                    }
                }
                DecodeResult::StateChange { consumed } => {
                    queue.drain(..consumed);
                }
                DecodeResult::Invalid {
                    error_len,
                    readagain_len,
                } => {
                    let error_bytes: Vec<u8> = queue.drain(..error_len).collect();
                    let readagain_bytes: Vec<u8> = queue.iter().take(readagain_len).copied().collect();
                    self.paused_stage = Some(i);
                    return Ok(Some(ConversionOutcome::InvalidByteSequence {
                        error_bytes,
                        readagain_bytes,
                        step: stage.step_index,
                    }));
                }
                DecodeResult::Incomplete => {
                    return Err(TranscodeError::InternalError(format!(
                        "partial unit queued in front of stage {}",
                        i
                    )));
                }
            }
        }
        Ok(None)
    }

    /// Decodes one unit from pending + source into stage 0.
    fn decode_input(&mut self, source: &mut &[u8], flags: ConvertFlags) -> Result<InputStep, TranscodeError> {
        let pending_len = self.queues[0].len();
        let total = pending_len + source.len();
        if total == 0 {
            return Ok(InputStep::Exhausted);
        }

        let registry = self.plan.registry().as_ref();
        let stage = &mut self.stages[0];
        let (result, window_len) = if pending_len == 0 {
            (stage.codec.decode_one(&mut stage.decode_state, *source), source.len())
        } else {
            self.window.clear();
            self.window.extend(self.queues[0].iter().copied());
            let extra = source.len().min(WINDOW_EXTRA);
            self.window.extend_from_slice(&source[..extra]);
            (
                stage.codec.decode_one(&mut stage.decode_state, &self.window),
                self.window.len(),
            )
        };

        let pending = &mut self.queues[0];
        match result {
            DecodeResult::Scalar { ch, consumed } => {
                let unit = take_input(pending, source, consumed);
                stage.accept(ch, &unit, registry);
                Ok(InputStep::Continue)
            }
            DecodeResult::StateChange { consumed } => {
                take_input(pending, source, consumed);
                Ok(InputStep::Continue)
            }
            DecodeResult::Invalid {
                error_len,
                readagain_len,
            } => {
                let mut error_bytes = take_input(pending, source, error_len + readagain_len);
                let readagain_bytes = error_bytes.split_off(error_len);
                for &b in readagain_bytes.iter().rev() {
                    pending.push_front(b);
                }
                self.putback_len = readagain_bytes.len();
                self.paused_stage = Some(0);
                Ok(InputStep::Pause(ConversionOutcome::InvalidByteSequence {
                    error_bytes,
                    readagain_bytes,
                    step: stage.step_index,
                }))
            }
            DecodeResult::Incomplete => {
                if window_len < total {
                    return Err(TranscodeError::InternalError(format!(
                        "{} decoder needs more than {} bytes for one unit",
                        stage.codec.source(),
                        window_len
                    )));
                }
                if flags.partial_input {
                    pending.extend(source.iter().copied());
                    *source = &[];
                    return Ok(InputStep::Exhausted);
                }
                let partial_bytes = take_input(pending, source, total);
                self.paused_stage = Some(0);
                Ok(InputStep::Pause(ConversionOutcome::IncompleteInput {
                    partial_bytes,
                    step: stage.step_index,
                }))
            }
        }
    }

    /// Runs end-of-stream processing through every stage, first to last.
    /// Safe to repeat: decorators and encoders emit their closing output once.
    fn finish_stages(&mut self) -> Result<Option<ConversionOutcome>, TranscodeError> {
        for i in 0..self.stages.len() {
            let registry = self.plan.registry().as_ref();
            self.stages[i].finish_decorators(registry);
            if let Some(outcome) = self.encode_staged(i) {
                return Ok(Some(outcome));
            }
            self.stages[i].finish_encoder(&mut self.queues[i + 1], &mut self.scratch);
            if i + 1 < self.stages.len() {
                if let Some(outcome) = self.drain_queue(i + 1)? {
                    return Ok(Some(outcome));
                }
            }
        }
        Ok(None)
    }

    /// Stores the outcome in the diagnostics cell and updates the lifecycle state.
    fn record(&mut self, outcome: &ConversionOutcome) {
        match outcome {
            ConversionOutcome::Finished => {
                self.state = EngineState::Finished;
                self.last_outcome = None;
            }
            ConversionOutcome::SourceEmpty => {
                self.state = EngineState::Ready;
                self.last_outcome = None;
            }
            _ => {
                self.state = EngineState::Paused;
                self.last_outcome = Some(outcome.clone());
                log_metric!(
                    "event" = "pause",
                    "outcome" = outcome.name(),
                    "step" = outcome.step().map_or_else(|| "-".to_string(), |s| s.to_string()),
                    "source" = self.plan.source(),
                    "destination" = self.plan.destination()
                );
            }
        }
        log::trace!("primitive_convert returned {}", outcome.name());
    }
}

//==================================================================================
// 3. Convenience Wrappers and Recovery
//==================================================================================

impl Engine {
    /// Converts one chunk of a longer stream, applying the configured error policy.
    ///
    /// A trailing partial sequence is kept for the next call. Data errors the
    /// policy says to raise are returned as errors.
    pub fn convert(&mut self, input: &[u8]) -> Result<Vec<u8>, TranscodeError> {
        self.drive(input, ConvertFlags::partial())
    }

    /// Ends the stream: reports pending partial input, flushes decorators and
    /// stateful encoders. Returns an empty vector on an already finished engine.
    pub fn finish(&mut self) -> Result<Vec<u8>, TranscodeError> {
        if self.state == EngineState::Finished {
            return Ok(Vec::new());
        }
        self.drive(&[], ConvertFlags::default())
    }

    fn drive(&mut self, input: &[u8], flags: ConvertFlags) -> Result<Vec<u8>, TranscodeError> {
        let mut source = input;
        let mut out = Vec::with_capacity(input.len());
        loop {
            let outcome = self.primitive_convert(&mut source, &mut out, None, None, flags)?;
            match outcome {
                ConversionOutcome::Finished | ConversionOutcome::SourceEmpty => return Ok(out),
                ConversionOutcome::DestinationFull | ConversionOutcome::AfterOutput => {}
                ConversionOutcome::InvalidByteSequence { .. } | ConversionOutcome::IncompleteInput { .. } => {
                    match self.options.invalid {
                        InvalidAction::Replace => {
                            let replacement = self.replacement.clone();
                            self.insert_output(&replacement)?;
                        }
                        InvalidAction::Raise => return Err(self.error_for(&outcome)),
                    }
                }
                ConversionOutcome::UndefinedConversion { scalar, .. } => {
                    match self.options.effective_undef() {
                        UndefAction::Replace => {
                            let replacement = self.replacement.clone();
                            self.insert_output(&replacement)?;
                        }
                        UndefAction::HexCharref => self.insert_output(&hex_charref(scalar))?,
                        UndefAction::Raise => return Err(self.error_for(&outcome)),
                    }
                }
            }
        }
    }

    /// Encodes `text` on the output side of the stage that paused last (the
    /// final stage if none did) and queues it ahead of the remaining input.
    ///
    /// Nothing is inserted if any scalar of `text` cannot be encoded.
    pub fn insert_output(&mut self, text: &str) -> Result<(), TranscodeError> {
        if self.state == EngineState::Finished {
            return Err(TranscodeError::EngineAlreadyFinished);
        }
        let Some(last) = self.stages.len().checked_sub(1) else {
            return Err(TranscodeError::InternalError("engine has no stages".to_string()));
        };
        let i = self.paused_stage.unwrap_or(last);
        let stage = &mut self.stages[i];
        let mut state = stage.encode_state;
        self.scratch.clear();
        for ch in text.chars() {
            if stage.codec.encode_one(&mut state, ch, &mut self.scratch) == EncodeResult::Undefined {
                return Err(TranscodeError::UnrepresentableReplacement {
                    replacement: text.to_string(),
                    encoding: stage.codec.destination().name().to_string(),
                });
            }
        }
        stage.encode_state = state;
        self.queues[i + 1].extend(self.scratch.drain(..));
        Ok(())
    }

    /// Returns and forgets up to `max_bytes` (default: all) of the readagain
    /// bytes of the last `InvalidByteSequence`, taken from their end.
    pub fn putback(&mut self, max_bytes: Option<usize>) -> Vec<u8> {
        let n = max_bytes.map_or(self.putback_len, |m| m.min(self.putback_len));
        let start = self.putback_len - n;
        let bytes: Vec<u8> = self.queues[0].drain(start..self.putback_len).collect();
        self.putback_len = start;
        bytes
    }

    /// The number of bytes `putback` can still return.
    pub fn putback_len(&self) -> usize {
        self.putback_len
    }

    /// Builds the error matching a data-error outcome, naming the encodings of
    /// the step that raised it.
    pub fn error_for(&self, outcome: &ConversionOutcome) -> TranscodeError {
        let (source_encoding, destination_encoding) = match outcome.step().and_then(|s| self.plan.steps().get(s)) {
            Some(PipelineStep::CodecStep { from, to }) => (from.name().to_string(), to.name().to_string()),
            _ => (
                self.plan.source().name().to_string(),
                self.plan.destination().name().to_string(),
            ),
        };
        match outcome {
            ConversionOutcome::InvalidByteSequence {
                error_bytes,
                readagain_bytes,
                ..
            } => TranscodeError::InvalidByteSequence {
                source_encoding,
                destination_encoding,
                error_bytes: error_bytes.clone(),
                readagain_bytes: readagain_bytes.clone(),
            },
            ConversionOutcome::IncompleteInput { partial_bytes, .. } => TranscodeError::IncompleteInput {
                source_encoding,
                destination_encoding,
                error_bytes: partial_bytes.clone(),
            },
            ConversionOutcome::UndefinedConversion { char_bytes, scalar, .. } => {
                TranscodeError::UndefinedConversion {
                    source_encoding,
                    destination_encoding,
                    error_bytes: char_bytes.clone(),
                    scalar: *scalar,
                }
            }
            other => TranscodeError::InternalError(format!("{} is not a data error", other.name())),
        }
    }
}

//==================================================================================
// 4. Accessors
//==================================================================================

impl Engine {
    /// The last outcome if it was a data error, `None` otherwise.
    pub fn last_error(&self) -> Option<ConversionOutcome> {
        self.last_outcome.clone().filter(|outcome| outcome.is_error())
    }

    /// The last pausing outcome of any kind.
    pub fn last_outcome(&self) -> Option<&ConversionOutcome> {
        self.last_outcome.as_ref()
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn convpath(&self) -> &[PipelineStep] {
        self.plan.steps()
    }

    pub fn plan(&self) -> &ConversionPlan {
        &self.plan
    }

    pub fn source_encoding(&self) -> &EncodingDescriptor {
        self.plan.source()
    }

    pub fn destination_encoding(&self) -> &EncodingDescriptor {
        self.plan.destination()
    }

    pub fn options(&self) -> &ConverterOptions {
        &self.options
    }

    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    /// Replaces the replacement string. It must be representable in the destination.
    pub fn set_replacement(&mut self, text: &str) -> Result<(), TranscodeError> {
        let destination = self.plan.destination();
        let registry = self.plan.registry();
        if let Some(ch) = text.chars().find(|&ch| !registry.is_representable(destination, ch)) {
            log::debug!("replacement scalar {:?} rejected for {}", ch, destination);
            return Err(TranscodeError::UnrepresentableReplacement {
                replacement: text.to_string(),
                encoding: destination.name().to_string(),
            });
        }
        self.replacement = text.to_string();
        Ok(())
    }
}
