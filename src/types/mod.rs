//! This module defines the core, strongly-typed value types shared by the
//! registry, the path resolver and the conversion engine.
//!
//! It currently holds the canonical `EncodingDescriptor`, the immutable identity
//! of an encoding that every other component refers to.

pub mod encoding_descriptor;

// Re-export the main type(s) for easier access.
pub use encoding_descriptor::EncodingDescriptor;
