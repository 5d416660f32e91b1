use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use tracing::debug;

use crate::hdr_pipeline::common::error::{HdrError, Result};
use crate::hdr_pipeline::frame::RgbImage;
use crate::hdr_pipeline::io::writer::ImageWriter;

/// Lossless PNG writer, the default output format of the pipeline.
pub struct PngImageWriter;

impl ImageWriter for PngImageWriter {
    fn write_image(&self, image: &RgbImage, path: &Path) -> Result<()> {
        debug!(path = %path.display(), "Encoding PNG image: {}x{}", image.width(), image.height());

        let file = File::create(path)?;
        let mut encoder = png::Encoder::new(
            BufWriter::new(file),
            image.width() as u32,
            image.height() as u32,
        );
        encoder.set_color(png::ColorType::Rgb);
        encoder.set_depth(png::BitDepth::Eight);

        let mut writer = encoder
            .write_header()
            .map_err(|e| HdrError::EncodeError(e.to_string()))?;
        writer
            .write_image_data(image.data())
            .map_err(|e| HdrError::EncodeError(e.to_string()))?;
        writer
            .finish()
            .map_err(|e| HdrError::EncodeError(e.to_string()))?;

        Ok(())
    }

    fn extension(&self) -> &'static str {
        "png"
    }
}

/// Decode a PNG capture into 8-bit interleaved RGB.
///
/// Grayscale is replicated across channels and RGBA drops its alpha; other
/// layouts are rejected.
pub fn read_png_rgb8<P: AsRef<Path>>(path: P) -> Result<RgbImage> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let decoder = png::Decoder::new(BufReader::new(file));
    let mut reader = decoder
        .read_info()
        .map_err(|e| HdrError::DecodeError(e.to_string()))?;

    let buffer_size = reader
        .output_buffer_size()
        .ok_or_else(|| HdrError::DecodeError("failed to determine PNG buffer size".to_string()))?;
    let mut buf = vec![0u8; buffer_size];
    let frame_info = reader
        .next_frame(&mut buf)
        .map_err(|e| HdrError::DecodeError(e.to_string()))?;

    let info = reader.info();
    let width = info.width as usize;
    let height = info.height as usize;
    let color_type = info.color_type;
    let bit_depth = info.bit_depth;
    let bytes = &buf[..frame_info.buffer_size()];

    if bit_depth != png::BitDepth::Eight {
        return Err(HdrError::DecodeError(format!(
            "unsupported PNG bit depth: {:?}",
            bit_depth
        )));
    }

    let data = match color_type {
        png::ColorType::Rgb => bytes.to_vec(),
        png::ColorType::Rgba => bytes
            .chunks_exact(4)
            .flat_map(|px| [px[0], px[1], px[2]])
            .collect(),
        png::ColorType::Grayscale => bytes.iter().flat_map(|&v| [v, v, v]).collect(),
        other => {
            return Err(HdrError::DecodeError(format!(
                "unsupported PNG color type: {:?}",
                other
            )));
        }
    };

    RgbImage::new(width, height, data)
}
