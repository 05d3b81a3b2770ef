// In: src/pipeline/planner.rs

//! The path resolver.
//!
//! Given a source encoding, a destination encoding and the requested
//! decorators, the resolver builds the convpath the engine will drive:
//! 1. A direct codec when one exists and nothing has to be decorated.
//! 2. Otherwise a relay through the registry's pivot encoding, with the legs
//!    that would start or end at the pivot itself elided.
//! 3. Decorators are spliced in at the latest point where the stream is in an
//!    ASCII-compatible encoding.
//!
//! The resolved chain is validated step by step before a plan is returned.

use crate::error::TranscodeError;
use crate::pipeline::models::{ConversionPlan, DecoratorKind, PipelineStep};
use crate::pipeline::traits::validate_chain;
use crate::registry::{CodecFns, RegistryRef};
use crate::types::EncodingDescriptor;

//==================================================================================
// 1. Codec Leg Selection
//==================================================================================

fn no_path(source: &EncodingDescriptor, destination: &EncodingDescriptor) -> TranscodeError {
    TranscodeError::NoConversionPath {
        source_encoding: source.name().to_string(),
        destination_encoding: destination.name().to_string(),
    }
}

/// The `source -> pivot -> destination` relay, or `None` if a leg is missing.
fn relay_legs(
    registry: &RegistryRef,
    source: &EncodingDescriptor,
    destination: &EncodingDescriptor,
) -> Option<Vec<CodecFns>> {
    let pivot = registry.pivot_encoding();
    let mut legs = Vec::with_capacity(2);
    if source != &pivot {
        legs.push(registry.direct_codec(source, &pivot)?);
    }
    if destination != &pivot {
        legs.push(registry.direct_codec(&pivot, destination)?);
    }
    Some(legs)
}

fn select_codec_legs(
    registry: &RegistryRef,
    source: &EncodingDescriptor,
    destination: &EncodingDescriptor,
    decorated: bool,
) -> Result<Vec<CodecFns>, TranscodeError> {
    let direct = registry.direct_codec(source, destination);
    if !decorated {
        if let Some(codec) = direct {
            return Ok(vec![codec]);
        }
    }
    match relay_legs(registry, source, destination) {
        Some(legs) if !legs.is_empty() => Ok(legs),
        _ => direct
            .map(|codec| vec![codec])
            .ok_or_else(|| no_path(source, destination)),
    }
}

//==================================================================================
// 2. Decorator Placement
//==================================================================================

/// The index at which decorators are inserted into `codec_steps`.
///
/// After the last codec step whose output is ASCII-compatible; failing that,
/// before the final codec step, provided that step reads an ASCII-compatible
/// encoding.
fn decorator_insertion_point(codec_steps: &[PipelineStep]) -> Option<usize> {
    let last_ascii_output = codec_steps.iter().rposition(|step| match step {
        PipelineStep::CodecStep { to, .. } => to.is_ascii_compatible(),
        PipelineStep::DecoratorStep { .. } => false,
    });
    if let Some(i) = last_ascii_output {
        return Some(i + 1);
    }
    match codec_steps.last() {
        Some(PipelineStep::CodecStep { from, .. }) if from.is_ascii_compatible() => {
            Some(codec_steps.len() - 1)
        }
        _ => None,
    }
}

//==================================================================================
// 3. Public Resolver API
//==================================================================================

/// Resolves `(source, destination, decorators)` into a validated conversion plan.
pub fn resolve(
    registry: &RegistryRef,
    source: &EncodingDescriptor,
    destination: &EncodingDescriptor,
    decorators: &[DecoratorKind],
) -> Result<ConversionPlan, TranscodeError> {
    let decorator_steps = decorators
        .iter()
        .map(|&kind| PipelineStep::DecoratorStep { kind });

    let plan = if source == destination {
        // Only a decorated stream can be "converted" into its own encoding.
        if decorators.is_empty() || !source.is_ascii_compatible() {
            return Err(no_path(source, destination));
        }
        let charset = registry
            .charset(source)
            .ok_or_else(|| no_path(source, destination))?;
        let passthrough = CodecFns::new(charset.clone(), charset);
        ConversionPlan::new(
            decorator_steps.collect(),
            source.clone(),
            destination.clone(),
            Vec::new(),
            Some(passthrough),
            registry.clone(),
        )
    } else {
        let codecs = select_codec_legs(registry, source, destination, !decorators.is_empty())?;
        let mut steps: Vec<PipelineStep> = codecs
            .iter()
            .map(|codec| PipelineStep::CodecStep {
                from: codec.source().clone(),
                to: codec.destination().clone(),
            })
            .collect();
        if !decorators.is_empty() {
            let at = decorator_insertion_point(&steps).ok_or_else(|| no_path(source, destination))?;
            for (offset, step) in decorator_steps.enumerate() {
                steps.insert(at + offset, step);
            }
        }
        ConversionPlan::new(
            steps,
            source.clone(),
            destination.clone(),
            codecs,
            None,
            registry.clone(),
        )
    };

    validate_chain(source, plan.steps(), destination)?;

    log::debug!(
        "resolved convpath {} -> {}: [{}]",
        source,
        destination,
        plan.steps()
            .iter()
            .map(|step| step.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    );
    Ok(plan)
}

/// Looks both encodings up by name, then resolves.
pub fn resolve_by_name(
    registry: &RegistryRef,
    source_name: &str,
    destination_name: &str,
    decorators: &[DecoratorKind],
) -> Result<ConversionPlan, TranscodeError> {
    let source = registry.lookup(source_name)?;
    let destination = registry.lookup(destination_name)?;
    resolve(registry, &source, &destination, decorators)
}
