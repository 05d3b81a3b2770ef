//! The conversion engine: stages, queues and the resumable conversion loop.

mod core;
mod stage;

pub use self::core::Engine;
