//! Pipeline module.
//!
//! Runs Loader → Transformer → Visualizer → Scorer → report over one table.

mod builder;
pub mod progress;

pub use builder::{Pipeline, PipelineBuilder};
pub use progress::{ClosureProgressReporter, PipelineStage, ProgressReporter, ProgressUpdate};
