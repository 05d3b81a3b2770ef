// In: src/pipeline/mod.rs

//! The conversion pipeline: what a convpath is (`models`), how its steps
//! compose (`traits`), how one is resolved (`planner`), the text decorators
//! that can be spliced into it (`decorators`), and the engine that drives it
//! (`orchestrator`).

pub mod decorators;
pub mod models;
pub mod orchestrator;
pub mod planner;
pub mod traits;

pub use models::{ConversionOutcome, ConversionPlan, ConvertFlags, DecoratorKind, EngineState, PipelineStep};
pub use orchestrator::Engine;
pub use planner::{resolve, resolve_by_name};

#[cfg(test)]
mod orchestrator_tests;
#[cfg(test)]
mod planner_tests;
