use std::io::Cursor;

use bayer::{BayerDepth, CFA, Demosaic, RasterDepth, RasterMut};
use tracing::debug;

use crate::hdr_pipeline::camera::device::RawFrame;
use crate::hdr_pipeline::common::error::{HdrError, Result};
use crate::hdr_pipeline::frame::RgbImage;

/// Converts a raw sensor mosaic buffer into interleaved 8-bit RGB.
///
/// Color conversion is a collaborator concern; the pipeline only requires
/// this seam so reconstruction can be exercised without a live sensor.
pub trait ColorConverter {
    fn convert(&self, raw: &RawFrame) -> Result<RgbImage>;
}

/// CPU demosaicing converter for Bayer-pattern sensors.
pub struct BayerConverter {
    cfa: CFA,
}

impl BayerConverter {
    /// Converter for the RGGB layout most color sensors stream by default.
    pub fn new() -> Self {
        Self { cfa: CFA::RGGB }
    }

    pub fn with_cfa(cfa: CFA) -> Self {
        Self { cfa }
    }
}

impl Default for BayerConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl ColorConverter for BayerConverter {
    fn convert(&self, raw: &RawFrame) -> Result<RgbImage> {
        debug!(
            width = raw.width,
            height = raw.height,
            "Demosaicing raw frame"
        );

        if raw.data.len() != raw.width * raw.height {
            return Err(HdrError::DecodeError(format!(
                "mosaic buffer is {} bytes, expected {} for {}x{}",
                raw.data.len(),
                raw.width * raw.height,
                raw.width,
                raw.height
            )));
        }

        let mut rgb = vec![0u8; raw.width * raw.height * 3];
        let mut cursor = Cursor::new(&raw.data[..]);
        let mut raster = RasterMut::new(raw.width, raw.height, RasterDepth::Depth8, &mut rgb);

        bayer::run_demosaic(
            &mut cursor,
            BayerDepth::Depth8,
            self.cfa,
            Demosaic::Linear,
            &mut raster,
        )
        .map_err(|e| HdrError::DecodeError(format!("demosaic failed: {:?}", e)))?;

        RgbImage::new(raw.width, raw.height, rgb)
    }
}
