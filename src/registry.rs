// In: src/registry.rs

//! The codec registry: the lookup service the path resolver and the engine
//! consume.
//!
//! `CodecRegistry` is the seam. The engine never names a concrete encoding; it
//! asks a registry for descriptors, for the direct codec between two of them
//! and for the pivot encoding used to relay everything else. `BuiltinRegistry`
//! is the implementation backed by the kernels in `crate::kernels`.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use encoding_rs::Encoding;

use crate::error::TranscodeError;
use crate::kernels::{
    Ascii, Endian, EucJp, Iso2022Jp, Latin1, ShiftJis, TableSingleByte, Utf16, Utf32, Utf8,
};
use crate::traits::{Charset, CodecState, DecodeResult, EncodeResult};
use crate::types::EncodingDescriptor;

/// A shared, immutable codec kernel.
pub type CharsetRef = Arc<dyn Charset>;

/// A shared registry handle.
pub type RegistryRef = Arc<dyn CodecRegistry>;

//==================================================================================
// 1. CodecFns: one direct conversion step
//==================================================================================

/// The pair of opaque operations a single conversion step needs: decode a unit
/// of the `from` encoding, encode a scalar into the `to` encoding.
#[derive(Clone)]
pub struct CodecFns {
    decoder: CharsetRef,
    encoder: CharsetRef,
}

impl CodecFns {
    pub fn new(decoder: CharsetRef, encoder: CharsetRef) -> Self {
        Self { decoder, encoder }
    }

    pub fn source(&self) -> &EncodingDescriptor {
        self.decoder.descriptor()
    }

    pub fn destination(&self) -> &EncodingDescriptor {
        self.encoder.descriptor()
    }

    pub fn decode_one(&self, state: &mut CodecState, input: &[u8]) -> DecodeResult {
        self.decoder.decode_one(state, input)
    }

    pub fn encode_one(&self, state: &mut CodecState, ch: char, out: &mut Vec<u8>) -> EncodeResult {
        self.encoder.encode_one(state, ch, out)
    }

    /// Flushes the encoder side's closing sequence, if its state needs one.
    pub fn finish(&self, state: &mut CodecState, out: &mut Vec<u8>) {
        self.encoder.finish(state, out)
    }
}

impl fmt::Debug for CodecFns {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CodecFns({} -> {})", self.source(), self.destination())
    }
}

//==================================================================================
// 2. The registry contract
//==================================================================================

pub trait CodecRegistry: Send + Sync {
    /// Resolves a name or alias (case-insensitively) to its descriptor.
    fn lookup(&self, name: &str) -> Result<EncodingDescriptor, TranscodeError>;

    /// The single-step codec between two encodings, if one exists.
    fn direct_codec(&self, from: &EncodingDescriptor, to: &EncodingDescriptor) -> Option<CodecFns>;

    /// The ASCII-compatible relay encoding.
    fn pivot_encoding(&self) -> EncodingDescriptor;

    fn is_representable(&self, encoding: &EncodingDescriptor, ch: char) -> bool;

    /// The kernel of a single encoding.
    fn charset(&self, encoding: &EncodingDescriptor) -> Option<CharsetRef>;
}

//==================================================================================
// 3. BuiltinRegistry
//==================================================================================

/// Encodings whose upper halves are taken from `encoding_rs` tables.
fn table_encodings() -> [(&'static str, &'static Encoding); 27] {
    [
        ("ISO-8859-2", encoding_rs::ISO_8859_2),
        ("ISO-8859-3", encoding_rs::ISO_8859_3),
        ("ISO-8859-4", encoding_rs::ISO_8859_4),
        ("ISO-8859-5", encoding_rs::ISO_8859_5),
        ("ISO-8859-6", encoding_rs::ISO_8859_6),
        ("ISO-8859-7", encoding_rs::ISO_8859_7),
        ("ISO-8859-8", encoding_rs::ISO_8859_8),
        ("ISO-8859-10", encoding_rs::ISO_8859_10),
        ("ISO-8859-13", encoding_rs::ISO_8859_13),
        ("ISO-8859-14", encoding_rs::ISO_8859_14),
        ("ISO-8859-15", encoding_rs::ISO_8859_15),
        ("ISO-8859-16", encoding_rs::ISO_8859_16),
        ("Windows-874", encoding_rs::WINDOWS_874),
        ("Windows-1250", encoding_rs::WINDOWS_1250),
        ("Windows-1251", encoding_rs::WINDOWS_1251),
        ("Windows-1252", encoding_rs::WINDOWS_1252),
        ("Windows-1253", encoding_rs::WINDOWS_1253),
        ("Windows-1254", encoding_rs::WINDOWS_1254),
        ("Windows-1255", encoding_rs::WINDOWS_1255),
        ("Windows-1256", encoding_rs::WINDOWS_1256),
        ("Windows-1257", encoding_rs::WINDOWS_1257),
        ("Windows-1258", encoding_rs::WINDOWS_1258),
        ("KOI8-R", encoding_rs::KOI8_R),
        ("KOI8-U", encoding_rs::KOI8_U),
        ("IBM866", encoding_rs::IBM866),
        ("macintosh", encoding_rs::MACINTOSH),
        ("x-mac-cyrillic", encoding_rs::X_MAC_CYRILLIC),
    ]
}

const ALIASES: &[(&str, &str)] = &[
    ("ASCII", "US-ASCII"),
    ("ANSI_X3.4-1968", "US-ASCII"),
    ("646", "US-ASCII"),
    ("ISO8859-1", "ISO-8859-1"),
    ("LATIN1", "ISO-8859-1"),
    ("CP65001", "UTF-8"),
    ("UTF8", "UTF-8"),
    ("CP1250", "Windows-1250"),
    ("CP1251", "Windows-1251"),
    ("CP1252", "Windows-1252"),
    ("CP1253", "Windows-1253"),
    ("CP1254", "Windows-1254"),
    ("CP1255", "Windows-1255"),
    ("CP1256", "Windows-1256"),
    ("CP1257", "Windows-1257"),
    ("CP1258", "Windows-1258"),
    ("CP874", "Windows-874"),
    ("CP866", "IBM866"),
    ("MacRoman", "macintosh"),
    ("MacCyrillic", "x-mac-cyrillic"),
    ("eucJP", "EUC-JP"),
    ("SJIS", "Shift_JIS"),
    ("ISO2022-JP", "ISO-2022-JP"),
];

/// Encodings that convert among each other directly, without the pivot.
const JAPANESE_FAMILY: &[&str] = &["EUC-JP", "Shift_JIS", "ISO-2022-JP"];

const PIVOT_NAME: &str = "UTF-8";

/// The registry of every encoding this crate ships a kernel for.
pub struct BuiltinRegistry {
    charsets: Vec<CharsetRef>,
    /// Lower-cased canonical names and aliases, mapped to `charsets` indices.
    by_name: HashMap<String, usize>,
    pivot: usize,
}

impl BuiltinRegistry {
    pub fn new() -> Self {
        let mut charsets: Vec<CharsetRef> = vec![
            Arc::new(Utf8::new()),
            Arc::new(Utf16::new(Endian::Big)),
            Arc::new(Utf16::new(Endian::Little)),
            Arc::new(Utf32::new(Endian::Big)),
            Arc::new(Utf32::new(Endian::Little)),
            Arc::new(Ascii::new()),
            Arc::new(Latin1::new()),
        ];
        for (name, encoding) in table_encodings() {
            charsets.push(Arc::new(TableSingleByte::from_encoding(name, encoding)));
        }
        charsets.push(Arc::new(EucJp::new()));
        charsets.push(Arc::new(ShiftJis::new()));
        charsets.push(Arc::new(Iso2022Jp::new()));

        let mut by_name: HashMap<String, usize> = charsets
            .iter()
            .enumerate()
            .map(|(i, cs)| (cs.descriptor().name().to_ascii_lowercase(), i))
            .collect();
        for (alias, canonical) in ALIASES {
            if let Some(&i) = by_name.get(&canonical.to_ascii_lowercase()) {
                by_name.insert(alias.to_ascii_lowercase(), i);
            }
        }
        let pivot = by_name.get(&PIVOT_NAME.to_ascii_lowercase()).copied().unwrap_or(0);

        log::debug!("built-in registry loaded {} encodings", charsets.len());
        Self {
            charsets,
            by_name,
            pivot,
        }
    }

    /// The process-wide registry instance. It is immutable once built.
    pub fn shared() -> RegistryRef {
        static SHARED: OnceLock<Arc<BuiltinRegistry>> = OnceLock::new();
        let registry = SHARED.get_or_init(|| Arc::new(BuiltinRegistry::new()));
        registry.clone()
    }

    /// Descriptors of every registered encoding, in registration order.
    pub fn encodings(&self) -> Vec<EncodingDescriptor> {
        self.charsets.iter().map(|cs| cs.descriptor().clone()).collect()
    }

    fn index_of(&self, encoding: &EncodingDescriptor) -> Option<usize> {
        self.by_name
            .get(&encoding.name().to_ascii_lowercase())
            .copied()
            .filter(|&i| self.charsets[i].descriptor() == encoding)
    }

    fn is_japanese(&self, encoding: &EncodingDescriptor) -> bool {
        JAPANESE_FAMILY.contains(&encoding.name())
    }
}

impl Default for BuiltinRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CodecRegistry for BuiltinRegistry {
    fn lookup(&self, name: &str) -> Result<EncodingDescriptor, TranscodeError> {
        self.by_name
            .get(&name.to_ascii_lowercase())
            .map(|&i| self.charsets[i].descriptor().clone())
            .ok_or_else(|| TranscodeError::UnknownEncoding(name.to_string()))
    }

    fn direct_codec(&self, from: &EncodingDescriptor, to: &EncodingDescriptor) -> Option<CodecFns> {
        if from == to {
            return None;
        }
        let pivot = self.charsets[self.pivot].descriptor();
        let connected = from == pivot
            || to == pivot
            || (self.is_japanese(from) && self.is_japanese(to));
        if !connected {
            return None;
        }
        let decoder = self.charset(from)?;
        let encoder = self.charset(to)?;
        Some(CodecFns::new(decoder, encoder))
    }

    fn pivot_encoding(&self) -> EncodingDescriptor {
        self.charsets[self.pivot].descriptor().clone()
    }

    fn is_representable(&self, encoding: &EncodingDescriptor, ch: char) -> bool {
        self.charset(encoding)
            .map(|cs| cs.is_representable(ch))
            .unwrap_or(false)
    }

    fn charset(&self, encoding: &EncodingDescriptor) -> Option<CharsetRef> {
        self.index_of(encoding).map(|i| self.charsets[i].clone())
    }
}
