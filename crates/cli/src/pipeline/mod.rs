//! Import orchestration module.

mod orchestrator;

pub use orchestrator::{ImportPipeline, PipelineConfig};
