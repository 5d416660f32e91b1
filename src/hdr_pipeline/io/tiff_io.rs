use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use tracing::debug;

use crate::hdr_pipeline::common::error::{HdrError, Result};
use crate::hdr_pipeline::frame::RgbImage;
use crate::hdr_pipeline::io::writer::ImageWriter;

/// TIFF compression methods
#[derive(Debug, Clone, Copy, Default)]
pub enum TiffCompression {
    /// No compression (fastest, largest file)
    None,
    /// LZW compression (slow, good compression)
    #[default]
    Lzw,
    /// Deflate compression (good speed/size balance)
    Deflate,
}

/// Lossless TIFF writer for outputs consumed by TIFF-based tooling.
pub struct TiffImageWriter {
    compression: TiffCompression,
}

impl TiffImageWriter {
    pub fn new(compression: TiffCompression) -> Self {
        Self { compression }
    }
}

impl Default for TiffImageWriter {
    fn default() -> Self {
        Self::new(TiffCompression::default())
    }
}

impl ImageWriter for TiffImageWriter {
    fn write_image(&self, image: &RgbImage, path: &Path) -> Result<()> {
        debug!(path = %path.display(), "Encoding TIFF image: {}x{}", image.width(), image.height());

        let compression = match self.compression {
            TiffCompression::None => tiff::encoder::Compression::Uncompressed,
            TiffCompression::Lzw => tiff::encoder::Compression::Lzw,
            TiffCompression::Deflate => tiff::encoder::Compression::Deflate(
                tiff::encoder::compression::DeflateLevel::Balanced,
            ),
        };

        let file = File::create(path)?;
        let mut encoder = tiff::encoder::TiffEncoder::new(BufWriter::new(file))
            .map_err(|e| HdrError::EncodeError(e.to_string()))?
            .with_compression(compression);

        encoder
            .write_image::<tiff::encoder::colortype::RGB8>(
                image.width() as u32,
                image.height() as u32,
                image.data(),
            )
            .map_err(|e| HdrError::EncodeError(e.to_string()))?;

        Ok(())
    }

    fn extension(&self) -> &'static str {
        "tiff"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_a_decodable_tiff() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hdr_image_42.tiff");

        let data: Vec<u8> = (0..2 * 2 * 3).map(|v| (v * 11) as u8).collect();
        let image = RgbImage::new(2, 2, data.clone()).unwrap();
        TiffImageWriter::default().write_image(&image, &path).unwrap();

        let file = File::open(&path).unwrap();
        let mut decoder = tiff::decoder::Decoder::new(file).unwrap();
        assert_eq!(decoder.dimensions().unwrap(), (2, 2));
        match decoder.read_image().unwrap() {
            tiff::decoder::DecodingResult::U8(decoded) => assert_eq!(decoded, data),
            _ => panic!("expected 8-bit decoding result"),
        }
    }
}
