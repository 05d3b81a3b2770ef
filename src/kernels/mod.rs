//! This module contains the pure, stateless codec kernels for every built-in
//! encoding.
//!
//! Each kernel implements the `Charset` trait: it decodes exactly one unit or
//! encodes exactly one scalar per call and keeps any running state in the
//! caller's `CodecState`. Kernels never allocate on the decode path and never
//! panic on malformed input; they classify it instead.

pub mod iso2022jp;
pub mod japanese;
pub mod single_byte;
pub mod utf16;
pub mod utf32;
pub mod utf8;

pub use iso2022jp::Iso2022Jp;
pub use japanese::{EucJp, ShiftJis};
pub use single_byte::{Ascii, Latin1, TableSingleByte};
pub use utf16::{Endian, Utf16};
pub use utf32::Utf32;
pub use utf8::Utf8;

/// The longest unit any built-in kernel can need to look at before it can
/// classify its input (a 4-byte UTF-8/UTF-16/UTF-32 unit).
pub const MAX_UNIT_LEN: usize = 4;
