//! Camera acquisition module
//!
//! The sensor itself is an external collaborator behind the [`SensorDevice`]
//! trait; this module owns the exposure sequencing state machine and the
//! raw-to-RGB color conversion seam.

mod convert;
mod device;
mod sequencer;

#[cfg(test)]
mod tests;

pub use convert::{BayerConverter, ColorConverter};
pub use device::{RawFrame, SensorDevice};
pub use sequencer::{CaptureConfig, CaptureConfigBuilder, ExposureSequencer};
