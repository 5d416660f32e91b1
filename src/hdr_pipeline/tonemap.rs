//! Tonemapping module
//!
//! Compresses a recovered radiance map into a displayable 8-bit image.

mod drago;

pub use drago::{DragoToneMapper, TonemapConfig};
