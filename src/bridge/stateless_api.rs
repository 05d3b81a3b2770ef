// In: src/bridge/stateless_api.rs

use crate::config::ConverterOptions;
use crate::error::TranscodeError;
use crate::pipeline::models::PipelineStep;
use crate::pipeline::planner;
use crate::pipeline::Engine;
use crate::registry::{BuiltinRegistry, CodecRegistry};
use crate::types::EncodingDescriptor;

/// Opens an engine converting `source_name` to `destination_name` over the
/// shared built-in registry.
pub fn open_engine(
    source_name: &str,
    destination_name: &str,
    options: &ConverterOptions,
) -> Result<Engine, TranscodeError> {
    let registry = BuiltinRegistry::shared();
    let plan = planner::resolve_by_name(&registry, source_name, destination_name, &options.decorators())?;
    Engine::with_options(plan, options.clone())
}

/// Converts a complete byte string in one call (`convert` followed by `finish`).
pub fn transcode(
    bytes: &[u8],
    source_name: &str,
    destination_name: &str,
    options: &ConverterOptions,
) -> Result<Vec<u8>, TranscodeError> {
    let mut engine = open_engine(source_name, destination_name, options)?;
    let mut out = engine.convert(bytes)?;
    out.extend(engine.finish()?);
    Ok(out)
}

/// The convpath an engine for these arguments would drive, without opening one.
pub fn search_convpath(
    source_name: &str,
    destination_name: &str,
    options: &ConverterOptions,
) -> Result<Vec<PipelineStep>, TranscodeError> {
    let registry = BuiltinRegistry::shared();
    let plan = planner::resolve_by_name(&registry, source_name, destination_name, &options.decorators())?;
    Ok(plan.steps().to_vec())
}

/// The ASCII-compatible encoding that text in `name` is decorated through, or
/// `None` when `name` is already ASCII-compatible.
pub fn asciicompat_encoding(name: &str) -> Result<Option<EncodingDescriptor>, TranscodeError> {
    let registry = BuiltinRegistry::shared();
    let encoding = registry.lookup(name)?;
    if encoding.is_ascii_compatible() {
        return Ok(None);
    }
    let pivot = registry.pivot_encoding();
    if registry.direct_codec(&encoding, &pivot).is_none() {
        return Ok(None);
    }
    Ok(Some(pivot))
}
