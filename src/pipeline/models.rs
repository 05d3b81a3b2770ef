// In: src/pipeline/models.rs

//! The data model shared by the path resolver and the conversion engine:
//! pipeline steps, the resolved plan, and the closed set of outcomes a
//! conversion call can return.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TranscodeError;
use crate::registry::{CodecFns, RegistryRef};
use crate::types::EncodingDescriptor;

//==================================================================================
// 1. Pipeline Steps
//==================================================================================

/// A text-level transform that runs on decoded scalars.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DecoratorKind {
    /// CR and CRLF become LF.
    UniversalNewline,
    /// LF becomes CRLF.
    CrlfNewline,
    /// LF becomes CR.
    CrNewline,
    /// Escapes `&`, `<` and `>`.
    XmlText,
    /// Escapes `&`, `<`, `>` and `"`, and wraps the whole stream in double quotes.
    XmlAttr,
}

impl DecoratorKind {
    /// The conventional decorator name shown in convpath listings.
    pub fn name(&self) -> &'static str {
        match self {
            DecoratorKind::UniversalNewline => "universal_newline",
            DecoratorKind::CrlfNewline => "crlf_newline",
            DecoratorKind::CrNewline => "cr_newline",
            DecoratorKind::XmlText => "xml_text_escape",
            DecoratorKind::XmlAttr => "xml_attr_content_escape",
        }
    }
}

/// One step of a resolved conversion pipeline.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStep {
    CodecStep {
        from: EncodingDescriptor,
        to: EncodingDescriptor,
    },
    DecoratorStep {
        kind: DecoratorKind,
    },
}

impl fmt::Display for PipelineStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineStep::CodecStep { from, to } => write!(f, "{} -> {}", from, to),
            PipelineStep::DecoratorStep { kind } => f.write_str(kind.name()),
        }
    }
}

//==================================================================================
// 2. The Resolved Plan
//==================================================================================

/// A resolved pipeline together with the kernels bound to its codec steps.
///
/// Plans are immutable once built. An engine keeps its plan behind an `Arc`
/// for its whole lifetime.
#[derive(Clone)]
pub struct ConversionPlan {
    steps: Vec<PipelineStep>,
    source: EncodingDescriptor,
    destination: EncodingDescriptor,
    /// One entry per `CodecStep`, in pipeline order.
    codecs: Vec<CodecFns>,
    /// Set only for decorator-only pipelines (source == destination).
    passthrough: Option<CodecFns>,
    registry: RegistryRef,
}

impl ConversionPlan {
    pub(crate) fn new(
        steps: Vec<PipelineStep>,
        source: EncodingDescriptor,
        destination: EncodingDescriptor,
        codecs: Vec<CodecFns>,
        passthrough: Option<CodecFns>,
        registry: RegistryRef,
    ) -> Self {
        Self {
            steps,
            source,
            destination,
            codecs,
            passthrough,
            registry,
        }
    }

    /// The convpath.
    pub fn steps(&self) -> &[PipelineStep] {
        &self.steps
    }

    pub fn source(&self) -> &EncodingDescriptor {
        &self.source
    }

    pub fn destination(&self) -> &EncodingDescriptor {
        &self.destination
    }

    pub(crate) fn codecs(&self) -> &[CodecFns] {
        &self.codecs
    }

    pub(crate) fn passthrough(&self) -> Option<&CodecFns> {
        self.passthrough.as_ref()
    }

    pub fn registry(&self) -> &RegistryRef {
        &self.registry
    }

    /// The decorators of the pipeline, in order.
    pub fn decorators(&self) -> Vec<DecoratorKind> {
        self.steps
            .iter()
            .filter_map(|step| match step {
                PipelineStep::DecoratorStep { kind } => Some(*kind),
                PipelineStep::CodecStep { .. } => None,
            })
            .collect()
    }

    /// Serializes the convpath for introspection.
    pub fn to_json(&self) -> Result<String, TranscodeError> {
        Ok(serde_json::to_string(&self.steps)?)
    }
}

impl fmt::Debug for ConversionPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionPlan")
            .field("steps", &self.steps)
            .field("source", &self.source)
            .field("destination", &self.destination)
            .finish()
    }
}

//==================================================================================
// 3. Conversion Outcomes
//==================================================================================

/// Why a conversion call returned control.
///
/// `step` always indexes into the plan's convpath.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConversionOutcome {
    Finished,
    DestinationFull,
    SourceEmpty,
    InvalidByteSequence {
        error_bytes: Vec<u8>,
        readagain_bytes: Vec<u8>,
        step: usize,
    },
    IncompleteInput {
        partial_bytes: Vec<u8>,
        step: usize,
    },
    UndefinedConversion {
        char_bytes: Vec<u8>,
        scalar: char,
        step: usize,
    },
    AfterOutput,
}

impl ConversionOutcome {
    /// Returns `true` for the three data-level error outcomes.
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            ConversionOutcome::InvalidByteSequence { .. }
                | ConversionOutcome::IncompleteInput { .. }
                | ConversionOutcome::UndefinedConversion { .. }
        )
    }

    /// The convpath index of the failing step, for error outcomes.
    pub fn step(&self) -> Option<usize> {
        match self {
            ConversionOutcome::InvalidByteSequence { step, .. }
            | ConversionOutcome::IncompleteInput { step, .. }
            | ConversionOutcome::UndefinedConversion { step, .. } => Some(*step),
            _ => None,
        }
    }

    /// The snake_case name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            ConversionOutcome::Finished => "finished",
            ConversionOutcome::DestinationFull => "destination_buffer_full",
            ConversionOutcome::SourceEmpty => "source_buffer_empty",
            ConversionOutcome::InvalidByteSequence { .. } => "invalid_byte_sequence",
            ConversionOutcome::IncompleteInput { .. } => "incomplete_input",
            ConversionOutcome::UndefinedConversion { .. } => "undefined_conversion",
            ConversionOutcome::AfterOutput => "after_output",
        }
    }
}

/// Per-call switches of `primitive_convert`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ConvertFlags {
    /// More input will follow; a truncated trailing sequence is kept, not reported.
    pub partial_input: bool,
    /// Return `AfterOutput` as soon as this call has produced output and input remains.
    pub after_output: bool,
}

impl ConvertFlags {
    pub fn partial() -> Self {
        Self {
            partial_input: true,
            after_output: false,
        }
    }
}

/// The lifecycle state of an engine.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EngineState {
    Ready,
    Paused,
    Finished,
}
