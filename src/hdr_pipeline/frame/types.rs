//! Core image and bracket types

use crate::hdr_pipeline::common::error::{HdrError, Result};

/// Exposure duration of a single capture.
///
/// Stored in microseconds, the unit the sensor API and filenames use;
/// converted to seconds for numerical work.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExposureTime {
    micros: f64,
}

impl ExposureTime {
    pub fn from_micros(micros: f64) -> Result<Self> {
        if !micros.is_finite() || micros <= 0.0 {
            return Err(HdrError::InvalidExposure(micros));
        }
        Ok(Self { micros })
    }

    pub fn micros(&self) -> f64 {
        self.micros
    }

    pub fn seconds(&self) -> f64 {
        self.micros / 1e6
    }
}

/// Interleaved 8-bit RGB image buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct RgbImage {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl RgbImage {
    pub fn new(width: usize, height: usize, data: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(HdrError::InvalidDimensions(width, height));
        }
        if data.len() != width * height * 3 {
            return Err(HdrError::DecodeError(format!(
                "RGB buffer is {} bytes, expected {} for {}x{}",
                data.len(),
                width * height * 3,
                width,
                height
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Constant-color image, mainly useful for synthetic test brackets.
    pub fn filled(width: usize, height: usize, rgb: [u8; 3]) -> Result<Self> {
        let mut data = Vec::with_capacity(width * height * 3);
        for _ in 0..width * height {
            data.extend_from_slice(&rgb);
        }
        Self::new(width, height, data)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn pixel(&self, x: usize, y: usize) -> [u8; 3] {
        let i = (y * self.width + x) * 3;
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }
}

/// A single captured (or reloaded) frame of the bracket.
#[derive(Debug, Clone)]
pub struct Frame {
    image: RgbImage,
    exposure: ExposureTime,
    index: usize,
}

impl Frame {
    pub fn new(image: RgbImage, exposure: ExposureTime, index: usize) -> Self {
        Self {
            image,
            exposure,
            index,
        }
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    pub fn exposure(&self) -> ExposureTime {
        self.exposure
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn into_image(self) -> RgbImage {
        self.image
    }
}

/// Ordered set of frames of the same scene at distinct exposure times.
///
/// Construction validates the invariants every downstream consumer relies
/// on: at least one frame, identical dimensions, distinct exposures, sorted
/// ascending by exposure time.
#[derive(Debug, Clone)]
pub struct Bracket {
    frames: Vec<Frame>,
}

impl Bracket {
    pub fn new(mut frames: Vec<Frame>) -> Result<Self> {
        if frames.is_empty() {
            return Err(HdrError::InsufficientBracket { need: 1, got: 0 });
        }

        let width = frames[0].image().width();
        let height = frames[0].image().height();
        for frame in &frames {
            if frame.image().width() != width || frame.image().height() != height {
                return Err(HdrError::DimensionMismatch {
                    width,
                    height,
                    got_width: frame.image().width(),
                    got_height: frame.image().height(),
                });
            }
        }

        frames.sort_by(|a, b| a.exposure().micros().total_cmp(&b.exposure().micros()));
        for pair in frames.windows(2) {
            if pair[0].exposure().micros() == pair[1].exposure().micros() {
                return Err(HdrError::DuplicateExposure(pair[0].exposure().micros()));
            }
        }

        Ok(Self { frames })
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn width(&self) -> usize {
        self.frames[0].image().width()
    }

    pub fn height(&self) -> usize {
        self.frames[0].image().height()
    }

    /// Exposure times in seconds, ascending.
    pub fn exposure_seconds(&self) -> Vec<f64> {
        self.frames.iter().map(|f| f.exposure().seconds()).collect()
    }
}
