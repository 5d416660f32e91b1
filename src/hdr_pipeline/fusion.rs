//! Exposure fusion module
//!
//! Blends a bracket directly in image space using perceptual quality
//! weights and multi-resolution pyramids, without recovering radiance.

mod blend;
mod pyramid;


pub use blend::{ExposureFusionBlender, FusionConfig};
