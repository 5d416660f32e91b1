use std::path::Path;

use crate::hdr_pipeline::common::error::Result;
use crate::hdr_pipeline::frame::RgbImage;

/// Writes an 8-bit RGB image losslessly at a path.
pub trait ImageWriter {
    fn write_image(&self, image: &RgbImage, path: &Path) -> Result<()>;

    /// File extension for paths produced with this writer, without the dot.
    fn extension(&self) -> &'static str;
}
