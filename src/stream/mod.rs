//! Landmark stream host: JSON lines in, event lines out.

pub mod codec;
pub mod dispatch;
pub mod pipeline;
pub mod watch;

pub use pipeline::{PipelineOptions, run_pipeline};
