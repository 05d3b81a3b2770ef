// In: src/error.rs

//! This module defines the single, unified error type for the entire transcode library.
//! It uses the `thiserror` crate to provide ergonomic, context-aware error handling.

use thiserror::Error;

use crate::utils::{escape_bytes, scalar_label};

#[derive(Error, Debug)]
pub enum TranscodeError {
    // =========================================================================
    // === Construction-Time Errors (fatal, raised while resolving a path)
    // =========================================================================
    #[error("Unknown encoding name: {0}")]
    UnknownEncoding(String),

    #[error("Code converter not found ({source_encoding} to {destination_encoding})")]
    NoConversionPath {
        source_encoding: String,
        destination_encoding: String,
    },

    // =========================================================================
    // === Data-Level Errors (pauses promoted to errors by `convert`/`finish`)
    // =========================================================================
    #[error(
        "{} followed by {} on {source_encoding}",
        escape_bytes(.error_bytes),
        escape_bytes(.readagain_bytes)
    )]
    InvalidByteSequence {
        source_encoding: String,
        destination_encoding: String,
        error_bytes: Vec<u8>,
        readagain_bytes: Vec<u8>,
    },

    #[error("incomplete {} on {source_encoding}", escape_bytes(.error_bytes))]
    IncompleteInput {
        source_encoding: String,
        destination_encoding: String,
        error_bytes: Vec<u8>,
    },

    #[error(
        "{} ({}) from {source_encoding} to {destination_encoding}",
        scalar_label(.scalar),
        escape_bytes(.error_bytes)
    )]
    UndefinedConversion {
        source_encoding: String,
        destination_encoding: String,
        error_bytes: Vec<u8>,
        scalar: char,
    },

    // =========================================================================
    // === Usage Errors (caller bugs)
    // =========================================================================
    #[error("Conversion engine already finished")]
    EngineAlreadyFinished,

    #[error("Replacement {replacement:?} cannot be represented in {encoding}")]
    UnrepresentableReplacement { replacement: String, encoding: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // =========================================================================
    // === External Error Wrappers (Using #[from] for automatic conversion)
    // =========================================================================
    /// Options could not be parsed from their JSON form.
    #[error("Invalid converter options: {0}")]
    InvalidOptions(#[from] serde_json::Error),

    #[error("Internal logic error (this is a bug): {0}")]
    InternalError(String),
}

impl TranscodeError {
    /// Returns `true` for the three resumable data-level conditions.
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            TranscodeError::InvalidByteSequence { .. }
                | TranscodeError::IncompleteInput { .. }
                | TranscodeError::UndefinedConversion { .. }
        )
    }
}
