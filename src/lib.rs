//! This file is the root of the `transcode_core` Rust crate.
//!
//! Its responsibilities are strictly limited to:
//! 1.  Declaring all the top-level modules of the library (`pipeline`, `kernels`, etc.)
//!     so the Rust compiler knows they exist.
//! 2.  Re-exporting the handful of types most callers need, so that
//!     `use transcode_core::{transcode, ConverterOptions}` is enough for the
//!     common case.

//==================================================================================
// 0. Constants
//==================================================================================
/// The crate version, automatically set from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
//==================================================================================
// 1. Module Declarations
//==================================================================================
#[macro_use]
pub mod observability; // Make macros available throughout the crate

pub mod bridge;
pub mod config;
pub mod error;
pub mod kernels;
pub mod pipeline;
pub mod registry;
pub mod traits;
pub mod types;

mod utils;

//==================================================================================
// 2. Public Surface
//==================================================================================
pub use bridge::{asciicompat_encoding, open_engine, search_convpath, transcode};
pub use config::{ConverterOptions, InvalidAction, NewlineMode, UndefAction, XmlMode};
pub use error::TranscodeError;
pub use observability::enable_verbose_logging;
pub use pipeline::{ConversionOutcome, ConversionPlan, ConvertFlags, DecoratorKind, Engine, EngineState, PipelineStep};
pub use registry::{BuiltinRegistry, CodecRegistry};
pub use types::EncodingDescriptor;
