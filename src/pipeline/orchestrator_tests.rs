use super::models::{ConversionOutcome, ConvertFlags, DecoratorKind, EngineState};
use super::orchestrator::Engine;
use super::planner::resolve_by_name;
use crate::config::{ConverterOptions, InvalidAction, UndefAction};
use crate::error::TranscodeError;
use crate::registry::BuiltinRegistry;

fn build(source: &str, destination: &str) -> Engine {
    let registry = BuiltinRegistry::shared();
    Engine::new(resolve_by_name(&registry, source, destination, &[]).unwrap())
}

fn build_with(source: &str, destination: &str, decorators: &[DecoratorKind], options: ConverterOptions) -> Engine {
    let registry = BuiltinRegistry::shared();
    let plan = resolve_by_name(&registry, source, destination, decorators).unwrap();
    Engine::with_options(plan, options).unwrap()
}

fn run_once(engine: &mut Engine, source: &mut &[u8], dest: &mut Vec<u8>, flags: ConvertFlags) -> ConversionOutcome {
    engine.primitive_convert(source, dest, None, None, flags).unwrap()
}

const HEART_RUN: &[u8] = &[
    0x1B, 0x24, 0x42, 0x24, 0x22, 0x1B, 0x28, 0x42, 0x3F, 0x1B, 0x24, 0x42, 0x24, 0x24, 0x1B, 0x28, 0x42,
];

//==================================================================================
// 1. Basic Conversion
//==================================================================================

#[test]
fn test_single_call_conversion() {
    let mut engine = build("UTF-8", "ISO-8859-1");
    let mut source: &[u8] = "café".as_bytes();
    let mut dest = Vec::new();

    let outcome = run_once(&mut engine, &mut source, &mut dest, ConvertFlags::default());
    assert_eq!(outcome, ConversionOutcome::Finished);
    assert_eq!(dest, vec![0x63, 0x61, 0x66, 0xE9]);
    assert!(source.is_empty());
    assert_eq!(engine.state(), EngineState::Finished);
    assert!(engine.last_error().is_none());
}

#[test]
fn test_relay_reports_failing_step() {
    let mut engine = build("ISO-8859-1", "US-ASCII");
    let mut source: &[u8] = b"caf\xE9!";
    let mut dest = Vec::new();

    let outcome = run_once(&mut engine, &mut source, &mut dest, ConvertFlags::default());
    assert_eq!(
        outcome,
        ConversionOutcome::UndefinedConversion {
            char_bytes: vec![0xC3, 0xA9],
            scalar: 'é',
            step: 1,
        }
    );
    assert_eq!(dest, b"caf".to_vec());
    assert_eq!(
        engine.error_for(&outcome).to_string(),
        "U+00E9 (\"\\xC3\\xA9\") from UTF-8 to US-ASCII"
    );

    engine.insert_output("?").unwrap();
    let outcome = run_once(&mut engine, &mut source, &mut dest, ConvertFlags::default());
    assert_eq!(outcome, ConversionOutcome::Finished);
    assert_eq!(dest, b"caf?!".to_vec());
}

//==================================================================================
// 2. Undefined Conversion in a Stateful Destination
//==================================================================================

#[test]
fn test_undefined_scalar_with_manual_recovery() {
    let mut engine = build("UTF-8", "ISO-2022-JP");
    assert_eq!(engine.convpath().len(), 1);

    let mut source: &[u8] = "あ♡い".as_bytes();
    let mut dest = Vec::new();
    let outcome = run_once(&mut engine, &mut source, &mut dest, ConvertFlags::default());
    assert_eq!(
        outcome,
        ConversionOutcome::UndefinedConversion {
            char_bytes: vec![0xE2, 0x99, 0xA1],
            scalar: '♡',
            step: 0,
        }
    );
    assert_eq!(engine.state(), EngineState::Paused);
    assert_eq!(engine.last_error(), Some(outcome));
    assert_eq!(dest, HEART_RUN[..5].to_vec());

    engine.insert_output("?").unwrap();
    let outcome = run_once(&mut engine, &mut source, &mut dest, ConvertFlags::default());
    assert_eq!(outcome, ConversionOutcome::Finished);
    assert_eq!(dest, HEART_RUN.to_vec());
    assert!(engine.last_error().is_none());
}

#[test]
fn test_undefined_scalar_with_replace_policy() {
    let options = ConverterOptions {
        undef: UndefAction::Replace,
        replace: Some("?".to_string()),
        ..ConverterOptions::default()
    };
    let mut engine = build_with("UTF-8", "ISO-2022-JP", &[], options);
    let converted = engine.convert("あ♡い".as_bytes()).unwrap();
    assert_eq!(converted, HEART_RUN[..HEART_RUN.len() - 3].to_vec());
    assert!(!converted.ends_with(b"\x1b(B"));

    // Only the end of the stream returns the encoder to ASCII.
    assert_eq!(engine.finish().unwrap(), b"\x1b(B".to_vec());
    assert!(engine.finish().unwrap().is_empty());
}

#[test]
fn test_undefined_scalar_raises_by_default() {
    let mut engine = build("UTF-8", "ISO-2022-JP");
    let err = engine.convert("あ♡".as_bytes()).unwrap_err();
    assert!(matches!(err, TranscodeError::UndefinedConversion { scalar: '♡', .. }));
    assert_eq!(
        err.to_string(),
        "U+2661 (\"\\xE2\\x99\\xA1\") from UTF-8 to ISO-2022-JP"
    );
}

#[test]
fn test_xml_decorator_inside_relay() {
    let options = ConverterOptions {
        undef: UndefAction::HexCharref,
        ..ConverterOptions::default()
    };
    let mut engine = build_with("ISO-8859-1", "ISO-2022-JP", &[DecoratorKind::XmlText], options);
    let mut out = engine.convert(b"a<\xE9").unwrap();
    out.extend(engine.finish().unwrap());
    assert_eq!(out, b"a&lt;&#xE9;".to_vec());
}

//==================================================================================
// 3. Invalid and Incomplete Input
//==================================================================================

#[test]
fn test_readagain_bytes_across_chunks() {
    let mut engine = build("UTF-16BE", "UTF-8");
    let mut dest = Vec::new();

    let mut first: &[u8] = b"\xD8\x00";
    let outcome = run_once(&mut engine, &mut first, &mut dest, ConvertFlags::partial());
    assert_eq!(outcome, ConversionOutcome::SourceEmpty);
    assert!(first.is_empty());

    let mut second: &[u8] = b"\x00@";
    let outcome = run_once(&mut engine, &mut second, &mut dest, ConvertFlags::partial());
    assert_eq!(
        outcome,
        ConversionOutcome::InvalidByteSequence {
            error_bytes: vec![0xD8, 0x00],
            readagain_bytes: vec![0x00],
            step: 0,
        }
    );
    assert_eq!(second, b"@");
    assert_eq!(
        engine.error_for(&outcome).to_string(),
        "\"\\xD8\\x00\" followed by \"\\x00\" on UTF-16BE"
    );

    // Resuming re-reads the readagain byte in front of the remaining source.
    let outcome = run_once(&mut engine, &mut second, &mut dest, ConvertFlags::default());
    assert_eq!(outcome, ConversionOutcome::Finished);
    assert_eq!(dest, b"@".to_vec());
}

#[test]
fn test_putback_returns_readagain_bytes() {
    let mut engine = build("UTF-16BE", "UTF-8");
    let mut dest = Vec::new();
    let mut source: &[u8] = b"\xD8\x00\x00@";
    let outcome = run_once(&mut engine, &mut source, &mut dest, ConvertFlags::partial());
    assert!(matches!(outcome, ConversionOutcome::InvalidByteSequence { .. }));
    assert_eq!(engine.putback_len(), 1);

    let mut put_back = engine.putback(None);
    assert_eq!(put_back, vec![0x00]);
    assert_eq!(engine.putback_len(), 0);
    assert!(engine.putback(None).is_empty());

    // The caller now owns those bytes and feeds them back itself.
    put_back.extend_from_slice(source);
    let mut resumed: &[u8] = &put_back;
    let outcome = run_once(&mut engine, &mut resumed, &mut dest, ConvertFlags::default());
    assert_eq!(outcome, ConversionOutcome::Finished);
    assert_eq!(dest, b"@".to_vec());
}

#[test]
fn test_putback_takes_from_the_tail() {
    // An unpaired LE high surrogate followed by a complete unit: two bytes to read again.
    let mut engine = build("UTF-16LE", "UTF-8");
    let mut dest = Vec::new();
    let mut source: &[u8] = b"\x00\xD8\x61\x00";
    let outcome = run_once(&mut engine, &mut source, &mut dest, ConvertFlags::partial());
    assert_eq!(
        outcome,
        ConversionOutcome::InvalidByteSequence {
            error_bytes: vec![0x00, 0xD8],
            readagain_bytes: vec![0x61, 0x00],
            step: 0,
        }
    );
    assert_eq!(engine.putback(Some(1)), vec![0x00]);
    assert_eq!(engine.putback_len(), 1);
    assert_eq!(engine.putback(Some(5)), vec![0x61]);
}

#[test]
fn test_invalid_replace_policy() {
    let options = ConverterOptions {
        invalid: InvalidAction::Replace,
        ..ConverterOptions::default()
    };
    let mut engine = build_with("UTF-8", "UTF-16BE", &[], options);
    let out = engine.convert(b"a\xFFb").unwrap();
    assert_eq!(out, vec![0x00, 0x61, 0xFF, 0xFD, 0x00, 0x62]);
}

#[test]
fn test_incomplete_input_at_finish() {
    let mut engine = build("UTF-8", "UTF-16LE");
    assert_eq!(engine.convert(b"a\xE3\x81").unwrap(), vec![0x61, 0x00]);
    let err = engine.finish().unwrap_err();
    assert_eq!(err.to_string(), "incomplete \"\\xE3\\x81\" on UTF-8");
    assert!(matches!(
        engine.last_error(),
        Some(ConversionOutcome::IncompleteInput { ref partial_bytes, step: 0 }) if partial_bytes == &vec![0xE3, 0x81]
    ));

    let options = ConverterOptions {
        invalid: InvalidAction::Replace,
        ..ConverterOptions::default()
    };
    let mut engine = build_with("UTF-8", "UTF-16LE", &[], options);
    let mut out = engine.convert(b"a\xE3\x81").unwrap();
    out.extend(engine.finish().unwrap());
    assert_eq!(out, vec![0x61, 0x00, 0xFD, 0xFF]);
}

//==================================================================================
// 4. Buffer Control
//==================================================================================

#[test]
fn test_destination_limit() {
    let mut engine = build("UTF-8", "UTF-16BE");
    let mut source: &[u8] = b"abc";
    let mut dest = Vec::new();

    let outcome = engine
        .primitive_convert(&mut source, &mut dest, None, Some(3), ConvertFlags::default())
        .unwrap();
    assert_eq!(outcome, ConversionOutcome::DestinationFull);
    assert_eq!(dest, vec![0x00, 0x61, 0x00]);
    assert!(engine.last_error().is_none());
    assert_eq!(engine.last_outcome(), Some(&ConversionOutcome::DestinationFull));

    let outcome = run_once(&mut engine, &mut source, &mut dest, ConvertFlags::default());
    assert_eq!(outcome, ConversionOutcome::Finished);
    assert_eq!(dest, vec![0x00, 0x61, 0x00, 0x62, 0x00, 0x63]);
}

#[test]
fn test_destination_offset() {
    let mut engine = build("UTF-8", "ISO-8859-1");
    let mut source: &[u8] = b"xy";
    let mut dest = vec![1, 2, 3];

    let err = engine
        .primitive_convert(&mut source, &mut dest, Some(4), None, ConvertFlags::default())
        .unwrap_err();
    assert!(matches!(err, TranscodeError::InvalidArgument(_)));
    assert_eq!(source, b"xy");

    let outcome = engine
        .primitive_convert(&mut source, &mut dest, Some(1), None, ConvertFlags::default())
        .unwrap();
    assert_eq!(outcome, ConversionOutcome::Finished);
    assert_eq!(dest, vec![1, b'x', b'y']);
}

#[test]
fn test_after_output() {
    let mut engine = build("UTF-8", "ISO-8859-1");
    let mut source: &[u8] = b"abc";
    let mut dest = Vec::new();
    let flags = ConvertFlags {
        partial_input: false,
        after_output: true,
    };

    let outcome = run_once(&mut engine, &mut source, &mut dest, flags);
    assert_eq!(outcome, ConversionOutcome::AfterOutput);
    assert_eq!(dest, b"a".to_vec());
    assert_eq!(source, b"bc");
    assert_eq!(engine.state(), EngineState::Paused);

    let outcome = run_once(&mut engine, &mut source, &mut dest, ConvertFlags::default());
    assert_eq!(outcome, ConversionOutcome::Finished);
    assert_eq!(dest, b"abc".to_vec());
}

#[test]
fn test_after_output_counts_bytes_waiting_to_be_read_again() {
    let mut engine = build("UTF-16LE", "UTF-8");
    let mut source: &[u8] = b"\x00\xD8\x61\x00";
    let mut dest = Vec::new();
    let outcome = run_once(&mut engine, &mut source, &mut dest, ConvertFlags::partial());
    assert!(matches!(outcome, ConversionOutcome::InvalidByteSequence { .. }));
    assert!(source.is_empty());

    // The caller's slice is drained, but "a" still waits in front of the decoder.
    engine.insert_output("?").unwrap();
    let flags = ConvertFlags {
        partial_input: false,
        after_output: true,
    };
    let outcome = run_once(&mut engine, &mut source, &mut dest, flags);
    assert_eq!(outcome, ConversionOutcome::AfterOutput);
    assert_eq!(dest, b"?".to_vec());

    let outcome = run_once(&mut engine, &mut source, &mut dest, ConvertFlags::default());
    assert_eq!(outcome, ConversionOutcome::Finished);
    assert_eq!(dest, b"?a".to_vec());
}

//==================================================================================
// 5. Lifecycle
//==================================================================================

#[test]
fn test_finished_engine() {
    let mut engine = build("UTF-8", "ISO-8859-1");
    assert_eq!(engine.convert(b"ok").unwrap(), b"ok".to_vec());
    assert!(engine.finish().unwrap().is_empty());
    assert_eq!(engine.state(), EngineState::Finished);
    assert!(engine.finish().unwrap().is_empty());

    let mut source: &[u8] = b"more";
    let mut dest = Vec::new();
    let err = engine
        .primitive_convert(&mut source, &mut dest, None, None, ConvertFlags::default())
        .unwrap_err();
    assert!(matches!(err, TranscodeError::EngineAlreadyFinished));
    assert!(matches!(engine.convert(b"x"), Err(TranscodeError::EngineAlreadyFinished)));
    assert!(matches!(engine.insert_output("x"), Err(TranscodeError::EngineAlreadyFinished)));
}

#[test]
fn test_errors_clear_after_successful_call() {
    let mut engine = build("UTF-8", "ISO-8859-1");
    let mut source: &[u8] = b"a\x80b";
    let mut dest = Vec::new();
    let outcome = run_once(&mut engine, &mut source, &mut dest, ConvertFlags::partial());
    assert!(outcome.is_error());
    assert!(engine.last_error().is_some());

    let outcome = run_once(&mut engine, &mut source, &mut dest, ConvertFlags::partial());
    assert_eq!(outcome, ConversionOutcome::SourceEmpty);
    assert!(engine.last_error().is_none());
    assert_eq!(dest, b"ab".to_vec());
}

#[test]
fn test_replacement_management() {
    let mut engine = build("UTF-8", "ISO-8859-1");
    assert_eq!(engine.replacement(), "?");
    let err = engine.set_replacement("♡").unwrap_err();
    assert!(matches!(err, TranscodeError::UnrepresentableReplacement { .. }));
    assert_eq!(engine.replacement(), "?");
    engine.set_replacement("¿").unwrap();
    assert_eq!(engine.replacement(), "¿");

    assert_eq!(build("UTF-8", "UTF-16LE").replacement(), "\u{FFFD}");
}

#[test]
fn test_insert_output_rejects_unencodable_text() {
    let mut engine = build("UTF-8", "ISO-8859-1");
    let err = engine.insert_output("♡").unwrap_err();
    assert!(matches!(err, TranscodeError::UnrepresentableReplacement { .. }));
    engine.insert_output("[").unwrap();
    assert_eq!(engine.convert(b"x").unwrap(), b"[x".to_vec());
}

//==================================================================================
// 6. Decorators Across Chunks
//==================================================================================

#[test]
fn test_universal_newline_across_chunks() {
    let mut engine = build_with(
        "UTF-8",
        "ISO-8859-1",
        &[DecoratorKind::UniversalNewline],
        ConverterOptions::default(),
    );
    let mut out = engine.convert(b"a\r").unwrap();
    assert_eq!(out, b"a\n".to_vec());
    out.extend(engine.convert(b"\nb\r\r").unwrap());
    out.extend(engine.finish().unwrap());
    assert_eq!(out, b"a\nb\n\n".to_vec());
}

#[test]
fn test_crlf_before_utf16() {
    let mut engine = build_with("UTF-8", "UTF-16BE", &[DecoratorKind::CrlfNewline], ConverterOptions::default());
    let out = engine.convert(b"a\n").unwrap();
    assert_eq!(out, vec![0x00, 0x61, 0x00, 0x0D, 0x00, 0x0A]);
}

#[test]
fn test_decorator_only_pipeline() {
    let mut engine = build_with(
        "ISO-8859-1",
        "ISO-8859-1",
        &[DecoratorKind::XmlAttr],
        ConverterOptions::default(),
    );
    let mut out = engine.convert(b"\xE9<").unwrap();
    out.extend(engine.finish().unwrap());
    assert_eq!(out, b"\"\xE9&lt;\"".to_vec());
}

//==================================================================================
// 7. Concurrency
//==================================================================================

#[test]
fn test_independent_engines_on_threads() {
    let handles: Vec<_> = (0..4)
        .map(|i| {
            std::thread::spawn(move || {
                let mut engine = build("UTF-8", "Shift_JIS");
                let text = format!("{}あい", i);
                let mut out = engine.convert(text.as_bytes()).unwrap();
                out.extend(engine.finish().unwrap());
                out
            })
        })
        .collect();
    for (i, handle) in handles.into_iter().enumerate() {
        let out = handle.join().unwrap();
        assert_eq!(out, vec![b'0' + i as u8, 0x82, 0xA0, 0x82, 0xA2]);
    }
}
