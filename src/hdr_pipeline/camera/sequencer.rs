use std::time::Duration;

use tracing::{debug, info, instrument, warn};

use crate::hdr_pipeline::camera::convert::ColorConverter;
use crate::hdr_pipeline::camera::device::SensorDevice;
use crate::hdr_pipeline::common::error::{HdrError, Result};
use crate::hdr_pipeline::frame::{ExposureTime, Frame};

/// Configuration for bracket acquisition.
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Exposure times to capture, in microseconds.
    pub exposures_us: Vec<f64>,
    /// Grab and discard one frame after changing exposure so the sensor
    /// pipeline settles under the new value. Only needed when automatic
    /// exposure/gain is active on the device.
    pub settle_discard: bool,
    /// Bounded blocking per frame. `None` blocks until a frame arrives
    /// (batch capture); `Some` returns a recoverable timeout on expiry.
    pub frame_timeout: Option<Duration>,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            exposures_us: Vec::new(),
            settle_discard: true,
            frame_timeout: None,
        }
    }
}

impl CaptureConfig {
    pub fn builder() -> CaptureConfigBuilder {
        CaptureConfigBuilder::default()
    }
}

/// Builder for CaptureConfig
#[derive(Default)]
pub struct CaptureConfigBuilder {
    exposures_us: Option<Vec<f64>>,
    settle_discard: Option<bool>,
    frame_timeout: Option<Option<Duration>>,
}

impl CaptureConfigBuilder {
    pub fn exposures_us(mut self, exposures_us: Vec<f64>) -> Self {
        self.exposures_us = Some(exposures_us);
        self
    }

    pub fn settle_discard(mut self, settle_discard: bool) -> Self {
        self.settle_discard = Some(settle_discard);
        self
    }

    pub fn frame_timeout(mut self, frame_timeout: Option<Duration>) -> Self {
        self.frame_timeout = Some(frame_timeout);
        self
    }

    pub fn build(self) -> CaptureConfig {
        let default = CaptureConfig::default();
        CaptureConfig {
            exposures_us: self.exposures_us.unwrap_or(default.exposures_us),
            settle_discard: self.settle_discard.unwrap_or(default.settle_discard),
            frame_timeout: self.frame_timeout.unwrap_or(default.frame_timeout),
        }
    }
}

/// Acquisition phase for one exposure: Idle -> Streaming -> Captured -> Idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CapturePhase {
    Idle,
    Streaming,
    Captured,
}

/// Stops the stream on every exit path, including unwinding.
struct StreamGuard<'a, D: SensorDevice> {
    device: &'a mut D,
}

impl<'a, D: SensorDevice> StreamGuard<'a, D> {
    fn start(device: &'a mut D) -> Result<Self> {
        device.stream_on()?;
        Ok(Self { device })
    }

    fn device(&mut self) -> &mut D {
        self.device
    }
}

impl<D: SensorDevice> Drop for StreamGuard<'_, D> {
    fn drop(&mut self) {
        if let Err(e) = self.device.stream_off() {
            warn!("Failed to stop stream: {}", e);
        }
    }
}

/// Drives the device through one stream-on/capture/stream-off cycle per
/// requested exposure time.
///
/// A timed-out or dropped frame skips that exposure with a diagnostic and
/// the sequence continues; whether the remaining frames are enough is the
/// concern of the consuming reconstruction path.
pub struct ExposureSequencer<D: SensorDevice, C: ColorConverter> {
    device: D,
    converter: C,
    config: CaptureConfig,
    phase: CapturePhase,
}

impl<D: SensorDevice, C: ColorConverter> ExposureSequencer<D, C> {
    pub fn new(device: D, converter: C, config: CaptureConfig) -> Self {
        Self {
            device,
            converter,
            config,
            phase: CapturePhase::Idle,
        }
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    /// Capture one frame per configured exposure, skipping exposures whose
    /// frame never arrives. Frames are indexed by their position in the
    /// exposure list, starting at 1.
    #[instrument(skip(self), fields(exposures = self.config.exposures_us.len()))]
    pub fn capture_bracket(&mut self) -> Result<Vec<Frame>> {
        let exposures = self.config.exposures_us.clone();
        if exposures.is_empty() {
            warn!("No exposure times configured");
            return Ok(Vec::new());
        }

        let mut frames = Vec::new();
        for (i, &exposure_us) in exposures.iter().enumerate() {
            match self.capture_one(exposure_us, i + 1)? {
                Some(frame) => frames.push(frame),
                None => warn!(exposure_us, "Skipping exposure, no frame acquired"),
            }
        }

        info!("Captured {}/{} frame(s)", frames.len(), exposures.len());
        Ok(frames)
    }

    /// Consume the sequencer and release the device handle.
    pub fn close(mut self) -> Result<()> {
        self.device.close()
    }

    fn capture_one(&mut self, exposure_us: f64, index: usize) -> Result<Option<Frame>> {
        debug_assert_eq!(self.phase, CapturePhase::Idle);
        let exposure = ExposureTime::from_micros(exposure_us)?;
        let timeout = self.config.frame_timeout;
        let settle_discard = self.config.settle_discard;

        self.device.set_exposure_us(exposure_us)?;
        info!("Capturing frame with exposure time: {} us", exposure_us);

        let acquired = {
            let mut stream = StreamGuard::start(&mut self.device)?;
            self.phase = CapturePhase::Streaming;
            debug!(phase = ?self.phase, index, "Stream started");

            if settle_discard {
                match stream.device().get_frame(timeout) {
                    Ok(_) => debug!("Discarded settle frame"),
                    Err(HdrError::FrameTimeout(_) | HdrError::FrameDropped(_)) => {
                        warn!("Settle frame did not arrive")
                    }
                    Err(e) => return Err(e),
                }
            }

            stream.device().get_frame(timeout)
        };
        self.phase = CapturePhase::Idle;

        let raw = match acquired {
            Ok(raw) => raw,
            Err(HdrError::FrameTimeout(ms)) => {
                warn!("Frame timed out after {} ms", ms);
                return Ok(None);
            }
            Err(HdrError::FrameDropped(reason)) => {
                warn!("Frame dropped: {}", reason);
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let image = self.converter.convert(&raw)?;
        self.phase = CapturePhase::Captured;
        debug!(phase = ?self.phase, index, "Frame converted");

        self.phase = CapturePhase::Idle;
        Ok(Some(Frame::new(image, exposure, index)))
    }
}
