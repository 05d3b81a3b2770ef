//! This module defines the canonical, type-safe identity of a character encoding.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The immutable description of one encoding known to a codec registry.
///
/// Descriptors are created once when the registry is built and are never
/// mutated afterwards. Everything else in the crate (pipeline steps, plans,
/// errors) carries clones of the registry's descriptors, so two descriptors
/// compare equal exactly when they name the same registry entry.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct EncodingDescriptor {
    name: String,
    ascii_compatible: bool,
    stateful: bool,
}

impl EncodingDescriptor {
    /// Creates a descriptor. Only registries are expected to call this.
    pub fn new(name: impl Into<String>, ascii_compatible: bool, stateful: bool) -> Self {
        Self {
            name: name.into(),
            ascii_compatible,
            stateful,
        }
    }

    /// The canonical name, e.g. `"UTF-8"` or `"Shift_JIS"`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `true` if bytes 0x00..=0x7F always mean the ASCII characters
    /// and never occur inside a multi-byte sequence for another character.
    pub fn is_ascii_compatible(&self) -> bool {
        self.ascii_compatible
    }

    /// Returns `true` if the byte-to-character mapping depends on a running
    /// shift state (e.g. ISO-2022-JP).
    pub fn is_stateful(&self) -> bool {
        self.stateful
    }

    /// Returns `true` for the UTF-* family, which can represent every scalar value.
    pub fn is_unicode(&self) -> bool {
        self.name.starts_with("UTF-")
    }
}

/// Provides the canonical string representation for an `EncodingDescriptor`.
impl fmt::Display for EncodingDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
