use std::sync::Arc;

use super::models::{DecoratorKind, PipelineStep};
use super::planner::{resolve, resolve_by_name};
use crate::error::TranscodeError;
use crate::registry::{BuiltinRegistry, CharsetRef, CodecFns, CodecRegistry, RegistryRef};
use crate::types::EncodingDescriptor;

fn codec(registry: &RegistryRef, from: &str, to: &str) -> PipelineStep {
    PipelineStep::CodecStep {
        from: registry.lookup(from).unwrap(),
        to: registry.lookup(to).unwrap(),
    }
}

fn decorator(kind: DecoratorKind) -> PipelineStep {
    PipelineStep::DecoratorStep { kind }
}

/// The built-in registry with every codec touching one encoding removed.
struct IsolatingRegistry {
    inner: BuiltinRegistry,
    isolated: &'static str,
}

impl CodecRegistry for IsolatingRegistry {
    fn lookup(&self, name: &str) -> Result<EncodingDescriptor, TranscodeError> {
        self.inner.lookup(name)
    }

    fn direct_codec(&self, from: &EncodingDescriptor, to: &EncodingDescriptor) -> Option<CodecFns> {
        if from.name() == self.isolated || to.name() == self.isolated {
            return None;
        }
        self.inner.direct_codec(from, to)
    }

    fn pivot_encoding(&self) -> EncodingDescriptor {
        self.inner.pivot_encoding()
    }

    fn is_representable(&self, encoding: &EncodingDescriptor, ch: char) -> bool {
        self.inner.is_representable(encoding, ch)
    }

    fn charset(&self, encoding: &EncodingDescriptor) -> Option<CharsetRef> {
        self.inner.charset(encoding)
    }
}

#[test]
fn test_direct_codec_without_decorators() {
    let registry = BuiltinRegistry::shared();
    let plan = resolve_by_name(&registry, "UTF-16BE", "UTF-8", &[]).unwrap();
    assert_eq!(plan.steps(), &[codec(&registry, "UTF-16BE", "UTF-8")]);

    // Japanese encodings convert among each other without the pivot.
    let plan = resolve_by_name(&registry, "EUC-JP", "Shift_JIS", &[]).unwrap();
    assert_eq!(plan.steps(), &[codec(&registry, "EUC-JP", "Shift_JIS")]);
}

#[test]
fn test_relay_through_pivot() {
    let registry = BuiltinRegistry::shared();
    let plan = resolve_by_name(&registry, "UTF-16BE", "UTF-32LE", &[]).unwrap();
    assert_eq!(
        plan.steps(),
        &[
            codec(&registry, "UTF-16BE", "UTF-8"),
            codec(&registry, "UTF-8", "UTF-32LE"),
        ]
    );
    assert!(plan.decorators().is_empty());
}

#[test]
fn test_decorator_goes_after_last_ascii_compatible_output() {
    let registry = BuiltinRegistry::shared();
    let plan = resolve_by_name(&registry, "ISO-8859-1", "EUC-JP", &[DecoratorKind::UniversalNewline]).unwrap();
    assert_eq!(
        plan.steps(),
        &[
            codec(&registry, "ISO-8859-1", "UTF-8"),
            codec(&registry, "UTF-8", "EUC-JP"),
            decorator(DecoratorKind::UniversalNewline),
        ]
    );
}

#[test]
fn test_decorator_goes_before_non_ascii_destination() {
    let registry = BuiltinRegistry::shared();
    let plan = resolve_by_name(&registry, "UTF-8", "UTF-16BE", &[DecoratorKind::CrlfNewline]).unwrap();
    assert_eq!(
        plan.steps(),
        &[
            decorator(DecoratorKind::CrlfNewline),
            codec(&registry, "UTF-8", "UTF-16BE"),
        ]
    );

    let plan = resolve_by_name(&registry, "ISO-8859-1", "ISO-2022-JP", &[DecoratorKind::XmlText]).unwrap();
    assert_eq!(
        plan.steps(),
        &[
            codec(&registry, "ISO-8859-1", "UTF-8"),
            decorator(DecoratorKind::XmlText),
            codec(&registry, "UTF-8", "ISO-2022-JP"),
        ]
    );
}

#[test]
fn test_decorators_force_relay_between_japanese_encodings() {
    let registry = BuiltinRegistry::shared();
    let kinds = [DecoratorKind::XmlText, DecoratorKind::CrlfNewline];
    let plan = resolve_by_name(&registry, "ISO-2022-JP", "Shift_JIS", &kinds).unwrap();
    assert_eq!(
        plan.steps(),
        &[
            codec(&registry, "ISO-2022-JP", "UTF-8"),
            codec(&registry, "UTF-8", "Shift_JIS"),
            decorator(DecoratorKind::XmlText),
            decorator(DecoratorKind::CrlfNewline),
        ]
    );
    assert_eq!(plan.decorators(), kinds.to_vec());
}

#[test]
fn test_same_encoding() {
    let registry = BuiltinRegistry::shared();
    let err = resolve_by_name(&registry, "UTF-8", "utf8", &[]).unwrap_err();
    assert_eq!(err.to_string(), "Code converter not found (UTF-8 to UTF-8)");

    let plan = resolve_by_name(&registry, "UTF-8", "UTF-8", &[DecoratorKind::UniversalNewline]).unwrap();
    assert_eq!(plan.steps(), &[decorator(DecoratorKind::UniversalNewline)]);

    // A decorator cannot run on an ASCII-incompatible stream that never leaves it.
    let err = resolve_by_name(&registry, "UTF-16LE", "UTF-16LE", &[DecoratorKind::CrNewline]).unwrap_err();
    assert!(matches!(err, TranscodeError::NoConversionPath { .. }));
}

#[test]
fn test_unknown_encoding() {
    let registry = BuiltinRegistry::shared();
    let err = resolve_by_name(&registry, "UTF-8", "KLINGON", &[]).unwrap_err();
    assert!(matches!(err, TranscodeError::UnknownEncoding(name) if name == "KLINGON"));
}

#[test]
fn test_missing_legs_report_no_conversion_path() {
    let registry: RegistryRef = Arc::new(IsolatingRegistry {
        inner: BuiltinRegistry::new(),
        isolated: "KOI8-R",
    });
    let source = registry.lookup("KOI8-R").unwrap();
    let destination = registry.lookup("UTF-8").unwrap();
    let err = resolve(&registry, &source, &destination, &[]).unwrap_err();
    assert_eq!(err.to_string(), "Code converter not found (KOI8-R to UTF-8)");

    let plan = resolve_by_name(&registry, "KOI8-U", "UTF-8", &[]).unwrap();
    assert_eq!(plan.steps().len(), 1);
}

#[test]
fn test_plan_serializes_its_convpath() {
    let registry = BuiltinRegistry::shared();
    let plan = resolve_by_name(&registry, "UTF-8", "US-ASCII", &[DecoratorKind::XmlAttr]).unwrap();
    let json = plan.to_json().unwrap();
    let steps: Vec<PipelineStep> = serde_json::from_str(&json).unwrap();
    assert_eq!(steps, plan.steps());
    assert!(json.contains("\"decorator_step\""));
    assert!(json.contains("\"xml_attr\""));
}
