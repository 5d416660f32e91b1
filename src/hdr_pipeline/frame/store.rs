use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::hdr_pipeline::common::error::{HdrError, Result};
use crate::hdr_pipeline::frame::types::{Bracket, ExposureTime, Frame};
use crate::hdr_pipeline::io::read_png_rgb8;

/// Collects captured frames and turns them into a validated [`Bracket`].
///
/// Frames arrive either directly from the sequencer via [`FrameStore::store`]
/// or from a directory of previously persisted captures via
/// [`FrameStore::load`]. Capture files follow the
/// `prefix_..._index_exposure.png` convention, where the trailing token is
/// the exposure time in microseconds.
#[derive(Debug, Default)]
pub struct FrameStore {
    frames: Vec<Frame>,
}

impl FrameStore {
    pub fn new() -> Self {
        Self { frames: Vec::new() }
    }

    pub fn store(&mut self, frame: Frame) {
        debug!(
            index = frame.index(),
            exposure_us = frame.exposure().micros(),
            "Storing frame"
        );
        self.frames.push(frame);
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn into_bracket(self) -> Result<Bracket> {
        Bracket::new(self.frames)
    }

    /// Rebuild a bracket from persisted capture files in `dir`.
    ///
    /// Files that do not follow the naming convention are skipped with a
    /// diagnostic; the load fails only when no valid capture remains.
    pub fn load<P: AsRef<Path>>(dir: P) -> Result<Bracket> {
        let dir = dir.as_ref();
        info!(dir = %dir.display(), "Loading bracket from directory");

        let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .collect();
        paths.sort();

        let mut frames = Vec::new();
        for path in paths {
            let (index, exposure_us) = match parse_capture_name(&path) {
                Ok(parsed) => parsed,
                Err(e) => {
                    warn!("Skipping invalid file: {}", e);
                    continue;
                }
            };

            let image = match read_png_rgb8(&path) {
                Ok(image) => image,
                Err(e) => {
                    warn!(path = %path.display(), "Skipping unreadable capture: {}", e);
                    continue;
                }
            };

            let exposure = ExposureTime::from_micros(exposure_us as f64)?;
            debug!(
                path = %path.display(),
                index,
                exposure_us,
                "Loaded capture"
            );
            frames.push(Frame::new(image, exposure, index));
        }

        if frames.is_empty() {
            return Err(HdrError::InsufficientBracket { need: 1, got: 0 });
        }

        info!("Loaded {} capture(s)", frames.len());
        Bracket::new(frames)
    }
}

/// Extract `(index, exposure_us)` from a `prefix_..._index_exposure.png`
/// capture filename.
fn parse_capture_name(path: &Path) -> Result<(usize, u64)> {
    let invalid = || HdrError::InvalidFilename(path.display().to_string());

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .ok_or_else(invalid)?;
    if !extension.eq_ignore_ascii_case("png") {
        return Err(invalid());
    }

    let stem = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .ok_or_else(invalid)?;

    let mut tokens = stem.rsplit('_');
    let exposure_us: u64 = tokens
        .next()
        .and_then(|token| token.parse().ok())
        .ok_or_else(invalid)?;
    let index: usize = tokens
        .next()
        .and_then(|token| token.parse().ok())
        .ok_or_else(invalid)?;

    Ok((index, exposure_us))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hdr_pipeline::frame::types::RgbImage;
    use crate::hdr_pipeline::io::{ImageWriter, PngImageWriter};

    #[test]
    fn load_accepts_captures_and_skips_everything_else() {
        let dir = tempfile::tempdir().unwrap();
        let image = RgbImage::filled(2, 2, [40; 3]).unwrap();
        PngImageWriter
            .write_image(&image, &dir.path().join("image_1_40000.png"))
            .unwrap();
        std::fs::write(dir.path().join("readme.txt"), b"notes").unwrap();

        let bracket = FrameStore::load(dir.path()).unwrap();
        assert_eq!(bracket.len(), 1);
        assert_eq!(bracket.frames()[0].exposure().micros(), 40_000.0);
        assert_eq!(bracket.frames()[0].index(), 1);
    }

    #[test]
    fn load_fails_when_no_valid_capture_remains() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("readme.txt"), b"notes").unwrap();

        assert!(matches!(
            FrameStore::load(dir.path()),
            Err(HdrError::InsufficientBracket { need: 1, got: 0 })
        ));
    }

    #[test]
    fn store_accumulates_into_a_sorted_bracket() {
        let mut store = FrameStore::new();
        for (i, exposure_us) in [(1usize, 160_000.0), (2, 10_000.0), (3, 40_000.0)] {
            store.store(Frame::new(
                RgbImage::filled(2, 2, [i as u8 * 10; 3]).unwrap(),
                ExposureTime::from_micros(exposure_us).unwrap(),
                i,
            ));
        }
        assert_eq!(store.len(), 3);

        let bracket = store.into_bracket().unwrap();
        let seconds = bracket.exposure_seconds();
        assert!(seconds[0] < seconds[1] && seconds[1] < seconds[2]);
    }

    #[test]
    fn parses_index_and_exposure_tokens() {
        let (index, exposure) = parse_capture_name(Path::new("image_1_40000.png")).unwrap();
        assert_eq!(index, 1);
        assert_eq!(exposure, 40000);

        let (index, exposure) =
            parse_capture_name(Path::new("out/image_1754000000_3_500000.png")).unwrap();
        assert_eq!(index, 3);
        assert_eq!(exposure, 500000);
    }

    #[test]
    fn rejects_names_without_exposure_token() {
        assert!(parse_capture_name(Path::new("readme.txt")).is_err());
        assert!(parse_capture_name(Path::new("image.png")).is_err());
        // Trailing token numeric but no numeric index before it.
        assert!(parse_capture_name(Path::new("hdr_image_1754000000.png")).is_err());
    }
}
