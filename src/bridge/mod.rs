// In: src/bridge/mod.rs

// ====================================================================================
// ARCHITECTURAL OVERVIEW: The Bridge Layer
// ====================================================================================
//
// The `bridge` is the name-based public face of the library. Callers speak in
// encoding names and `ConverterOptions`; the bridge turns those into registry
// lookups, a resolved plan and a ready engine over the shared built-in registry.
//
// Data Flow:
//
//   1. [Stateless API (open_engine / transcode / search_convpath)]
//         |
//         `-> a. BuiltinRegistry::shared() looks the names up
//         |
//         `-> b. pipeline::planner resolves the convpath, decorators taken
//                from `ConverterOptions::decorators()`
//
//   2. [Conversion Engine (pipeline::orchestrator)] -> convert / finish / primitive_convert
//
// Legacy integer flags are translated into the same `ConverterOptions` by
// `flags`, which never touches the engine itself.
//
// ====================================================================================
pub mod flags;
pub mod stateless_api;

pub use flags::{convert_flags_from_bits, options_from_flags};
pub use stateless_api::{asciicompat_encoding, open_engine, search_convpath, transcode};
