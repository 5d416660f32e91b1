//! Radiometric recovery module
//!
//! Recovers the per-channel camera response curve from an exposure bracket
//! by weighted least squares, then fuses the bracket into a floating-point
//! radiance map.

mod recover;
mod response;
mod sample;


pub use recover::{RadianceMap, RadianceRecoverer, RecoveryConfig};
