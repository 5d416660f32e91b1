use std::time::Duration;

use crate::hdr_pipeline::common::error::Result;

/// A raw frame as delivered by the sensor: one 8-bit sample per photosite,
/// still in the sensor's Bayer mosaic layout.
#[derive(Debug, Clone)]
pub struct RawFrame {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

/// Exclusive handle to an image sensor.
///
/// One process, one open handle; all device operations go through this
/// trait. Implementations wrap a vendor SDK and are expected to return
/// [`HdrError::FrameTimeout`](crate::hdr_pipeline::HdrError::FrameTimeout)
/// when `get_frame` expires and
/// [`HdrError::FrameDropped`](crate::hdr_pipeline::HdrError::FrameDropped)
/// when the sensor reports an incomplete frame; both are recoverable for
/// the sequencer.
pub trait SensorDevice {
    /// Set the exposure parameter for subsequent frames, in microseconds.
    fn set_exposure_us(&mut self, exposure_us: f64) -> Result<()>;

    /// Start the acquisition stream.
    fn stream_on(&mut self) -> Result<()>;

    /// Stop the acquisition stream. Must be safe to call when not streaming.
    fn stream_off(&mut self) -> Result<()>;

    /// Block until a frame arrives. With `Some(timeout)` the call returns
    /// a timeout error on expiry; with `None` it blocks until a frame
    /// arrives.
    fn get_frame(&mut self, timeout: Option<Duration>) -> Result<RawFrame>;

    /// Release the device handle.
    fn close(&mut self) -> Result<()>;
}
