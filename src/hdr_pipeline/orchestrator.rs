//! Run orchestration module
//!
//! Sequences capture, persistence, and the two independent reconstruction
//! paths, and owns output naming/placement.

mod pipeline;


pub use pipeline::{HdrPipeline, HdrReconstructor, RunConfig, RunConfigBuilder, RunSummary};
