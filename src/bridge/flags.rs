// In: src/bridge/flags.rs

//! The legacy integer-flag spelling of converter options.
//!
//! The bit values are the classic converter constants. This adapter only maps
//! bits to `ConverterOptions`/`ConvertFlags`; it never reaches into an engine.

use crate::config::{ConverterOptions, InvalidAction, UndefAction, XmlMode};
use crate::pipeline::models::ConvertFlags;

pub const INVALID_MASK: u32 = 0x0000_000f;
pub const INVALID_REPLACE: u32 = 0x0000_0002;
pub const UNDEF_MASK: u32 = 0x0000_00f0;
pub const UNDEF_REPLACE: u32 = 0x0000_0020;
pub const UNDEF_HEX_CHARREF: u32 = 0x0000_0030;

pub const UNIVERSAL_NEWLINE_DECORATOR: u32 = 0x0000_0100;
pub const CRLF_NEWLINE_DECORATOR: u32 = 0x0000_1000;
pub const CR_NEWLINE_DECORATOR: u32 = 0x0000_2000;
pub const XML_TEXT_DECORATOR: u32 = 0x0000_8000;
pub const XML_ATTR_CONTENT_DECORATOR: u32 = 0x0001_0000;
pub const XML_ATTR_QUOTE_DECORATOR: u32 = 0x0010_0000;

pub const PARTIAL_INPUT: u32 = 0x0002_0000;
pub const AFTER_OUTPUT: u32 = 0x0004_0000;

/// Maps the option bits (error handlers and decorators) to `ConverterOptions`.
pub fn options_from_flags(bits: u32) -> ConverterOptions {
    let invalid = match bits & INVALID_MASK {
        INVALID_REPLACE => InvalidAction::Replace,
        _ => InvalidAction::Raise,
    };
    let undef = match bits & UNDEF_MASK {
        UNDEF_REPLACE => UndefAction::Replace,
        UNDEF_HEX_CHARREF => UndefAction::HexCharref,
        _ => UndefAction::Raise,
    };
    let xml = if bits & XML_ATTR_CONTENT_DECORATOR != 0 {
        Some(XmlMode::Attr)
    } else if bits & XML_TEXT_DECORATOR != 0 {
        Some(XmlMode::Text)
    } else {
        None
    };
    ConverterOptions {
        invalid,
        undef,
        universal_newline: bits & UNIVERSAL_NEWLINE_DECORATOR != 0,
        crlf_newline: bits & CRLF_NEWLINE_DECORATOR != 0,
        cr_newline: bits & CR_NEWLINE_DECORATOR != 0,
        xml,
        ..ConverterOptions::default()
    }
}

/// Maps the per-call bits to `ConvertFlags`.
pub fn convert_flags_from_bits(bits: u32) -> ConvertFlags {
    ConvertFlags {
        partial_input: bits & PARTIAL_INPUT != 0,
        after_output: bits & AFTER_OUTPUT != 0,
    }
}

/// The inverse of `options_from_flags`, for callers that store options as bits.
pub fn flags_from_options(options: &ConverterOptions) -> u32 {
    let mut bits = 0;
    if options.invalid == InvalidAction::Replace {
        bits |= INVALID_REPLACE;
    }
    bits |= match options.undef {
        UndefAction::Raise => 0,
        UndefAction::Replace => UNDEF_REPLACE,
        UndefAction::HexCharref => UNDEF_HEX_CHARREF,
    };
    for kind in options.decorators() {
        use crate::pipeline::models::DecoratorKind::*;
        bits |= match kind {
            UniversalNewline => UNIVERSAL_NEWLINE_DECORATOR,
            CrlfNewline => CRLF_NEWLINE_DECORATOR,
            CrNewline => CR_NEWLINE_DECORATOR,
            XmlText => XML_TEXT_DECORATOR,
            XmlAttr => XML_ATTR_CONTENT_DECORATOR | XML_ATTR_QUOTE_DECORATOR,
        };
    }
    bits
}
