// In: src/config.rs

//! The single source of truth for converter configuration.
//!
//! `ConverterOptions` is created once at the boundary (from code, from JSON, or
//! from the legacy integer flags via `bridge::flags`) and handed to the engine,
//! which keeps it read-only for its whole lifetime. The path resolver only sees
//! the decorator list derived from it.

use serde::{Deserialize, Serialize};

use crate::error::TranscodeError;
use crate::pipeline::models::DecoratorKind;

//==================================================================================
// I. Error Policy Enums
//==================================================================================

/// What `convert`/`finish` do with an invalid or incomplete byte sequence.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InvalidAction {
    /// **Default:** return the matching error.
    #[default]
    Raise,
    /// Insert the replacement string and continue after the offending bytes.
    Replace,
}

/// What `convert`/`finish` do with a scalar the destination cannot represent.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UndefAction {
    /// **Default:** return the matching error.
    #[default]
    Raise,
    /// Insert the replacement string.
    Replace,
    /// Insert an XML character reference, `&#xHEX;`.
    HexCharref,
}

//==================================================================================
// II. Decorator Selection Enums
//==================================================================================

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NewlineMode {
    Universal,
    Crlf,
    Cr,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum XmlMode {
    /// Escape as XML character data.
    Text,
    /// Escape as a double-quoted XML attribute value.
    Attr,
}

//==================================================================================
// III. The Unified ConverterOptions
//==================================================================================

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct ConverterOptions {
    #[serde(default)]
    pub invalid: InvalidAction,

    #[serde(default)]
    pub undef: UndefAction,

    /// The replacement string. When absent, U+FFFD is used for Unicode
    /// destinations and `?` for everything else.
    #[serde(default)]
    pub replace: Option<String>,

    /// The newline decorator, selected by mode.
    #[serde(default)]
    pub newline: Option<NewlineMode>,

    // --- Boolean spellings of the newline decorators ---
    #[serde(default)]
    pub universal_newline: bool,

    #[serde(default)]
    pub crlf_newline: bool,

    #[serde(default)]
    pub cr_newline: bool,

    /// The XML escaping decorator. Also turns undefined scalars into character
    /// references unless `undef` says otherwise.
    #[serde(default)]
    pub xml: Option<XmlMode>,
}

impl Default for ConverterOptions {
    fn default() -> Self {
        Self {
            invalid: InvalidAction::default(),
            undef: UndefAction::default(),
            replace: None,
            newline: None,
            universal_newline: false,
            crlf_newline: false,
            cr_newline: false,
            xml: None,
        }
    }
}

impl ConverterOptions {
    /// Parses options from their JSON form. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, TranscodeError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, TranscodeError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Shorthand for replacing both invalid and undefined input.
    pub fn replacing(replacement: Option<&str>) -> Self {
        Self {
            invalid: InvalidAction::Replace,
            undef: UndefAction::Replace,
            replace: replacement.map(str::to_string),
            ..Self::default()
        }
    }

    /// The undefined-conversion policy actually applied: XML escaping upgrades
    /// `Raise` to `HexCharref`.
    pub fn effective_undef(&self) -> UndefAction {
        match (self.xml, self.undef) {
            (Some(_), UndefAction::Raise) => UndefAction::HexCharref,
            (_, undef) => undef,
        }
    }

    /// The requested decorators in canonical order: the XML decorator first,
    /// then universal, CRLF and CR newline decorators, each at most once.
    pub fn decorators(&self) -> Vec<DecoratorKind> {
        let mut kinds = Vec::new();
        match self.xml {
            Some(XmlMode::Text) => kinds.push(DecoratorKind::XmlText),
            Some(XmlMode::Attr) => kinds.push(DecoratorKind::XmlAttr),
            None => {}
        }
        let wants = |mode: NewlineMode, flag: bool| flag || self.newline == Some(mode);
        if wants(NewlineMode::Universal, self.universal_newline) {
            kinds.push(DecoratorKind::UniversalNewline);
        }
        if wants(NewlineMode::Crlf, self.crlf_newline) {
            kinds.push(DecoratorKind::CrlfNewline);
        }
        if wants(NewlineMode::Cr, self.cr_newline) {
            kinds.push(DecoratorKind::CrNewline);
        }
        kinds
    }
}
