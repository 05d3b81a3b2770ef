// In: src/pipeline/traits.rs

//! Defines the behavioral contract of pipeline steps.
//!
//! Every step declares what it does to the "current encoding" of the byte
//! stream flowing through the pipeline. The resolver walks a freshly built
//! convpath through this contract, so a chain that would hand a codec the
//! wrong encoding, or run a decorator on ASCII-incompatible bytes, is rejected
//! before any engine sees it.

use crate::error::TranscodeError;
use crate::pipeline::models::PipelineStep;
use crate::types::EncodingDescriptor;

/// Describes the effect a step has on the encoding of the stream.
#[derive(Debug, PartialEq, Eq)]
pub enum EncodingTransform {
    /// The step leaves the stream in the same encoding (decorators).
    Preserve,
    /// The step re-encodes the stream.
    Change(EncodingDescriptor),
}

/// A trait implemented by every pipeline step, declaring its impact on the stream.
pub trait StepBehavior {
    fn transform_encoding(&self, input: &EncodingDescriptor) -> Result<EncodingTransform, TranscodeError>;
}

impl StepBehavior for PipelineStep {
    fn transform_encoding(&self, input: &EncodingDescriptor) -> Result<EncodingTransform, TranscodeError> {
        match self {
            PipelineStep::CodecStep { from, to } => {
                if from != input {
                    return Err(TranscodeError::InternalError(format!(
                        "codec step {} -> {} placed on a {} stream",
                        from, to, input
                    )));
                }
                Ok(EncodingTransform::Change(to.clone()))
            }
            PipelineStep::DecoratorStep { kind } => {
                if !input.is_ascii_compatible() {
                    return Err(TranscodeError::InternalError(format!(
                        "decorator {} placed on ASCII-incompatible {}",
                        kind.name(),
                        input
                    )));
                }
                Ok(EncodingTransform::Preserve)
            }
        }
    }
}

/// Walks `steps` from `source` and checks that the chain ends at `destination`.
pub fn validate_chain(
    source: &EncodingDescriptor,
    steps: &[PipelineStep],
    destination: &EncodingDescriptor,
) -> Result<(), TranscodeError> {
    let mut current = source.clone();
    for step in steps {
        if let EncodingTransform::Change(next) = step.transform_encoding(&current)? {
            current = next;
        }
    }
    if &current != destination {
        return Err(TranscodeError::InternalError(format!(
            "convpath ends at {} instead of {}",
            current, destination
        )));
    }
    Ok(())
}
