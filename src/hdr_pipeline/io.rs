//! Image file I/O module
//!
//! Lossless persistence for captures and reconstruction outputs. PNG is the
//! capture/reload format; a TIFF writer is available for outputs when a
//! downstream tool prefers it.

mod png_io;
mod tiff_io;
mod writer;

pub use png_io::{PngImageWriter, read_png_rgb8};
pub use tiff_io::{TiffCompression, TiffImageWriter};
pub use writer::ImageWriter;
