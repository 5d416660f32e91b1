//! Frame and bracket data model
//!
//! Captured frames carry an exposure time and a capture index; a bracket is
//! an ordered, dimension-checked set of frames of the same static scene.

mod store;
pub mod types;

#[cfg(test)]
mod tests;

pub use store::FrameStore;
pub use types::{Bracket, ExposureTime, Frame, RgbImage};
