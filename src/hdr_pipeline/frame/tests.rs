use super::types::{Bracket, ExposureTime, Frame, RgbImage};
use crate::hdr_pipeline::common::error::HdrError;

fn gray_frame(level: u8, exposure_us: f64, index: usize) -> Frame {
    let image = RgbImage::filled(4, 3, [level; 3]).unwrap();
    Frame::new(image, ExposureTime::from_micros(exposure_us).unwrap(), index)
}

#[test]
fn exposure_time_rejects_non_positive_values() {
    assert!(ExposureTime::from_micros(0.0).is_err());
    assert!(ExposureTime::from_micros(-40_000.0).is_err());
    assert!(ExposureTime::from_micros(f64::NAN).is_err());
    assert!(ExposureTime::from_micros(f64::INFINITY).is_err());
}

#[test]
fn exposure_time_converts_to_seconds() {
    let exposure = ExposureTime::from_micros(40_000.0).unwrap();
    assert!((exposure.seconds() - 0.04).abs() < 1e-12);
    assert!(exposure.seconds() > 0.0);
}

#[test]
fn bracket_sorts_frames_ascending_by_exposure() {
    let bracket = Bracket::new(vec![
        gray_frame(200, 1_000_000.0, 2),
        gray_frame(20, 10_000.0, 0),
        gray_frame(90, 100_000.0, 1),
    ])
    .unwrap();

    let seconds = bracket.exposure_seconds();
    assert_eq!(seconds.len(), 3);
    for pair in seconds.windows(2) {
        assert!(pair[0] < pair[1]);
    }
    for value in seconds {
        assert!(value > 0.0);
    }
}

#[test]
fn bracket_rejects_empty_input() {
    assert!(matches!(
        Bracket::new(Vec::new()),
        Err(HdrError::InsufficientBracket { need: 1, got: 0 })
    ));
}

#[test]
fn bracket_rejects_mismatched_dimensions() {
    let small = Frame::new(
        RgbImage::filled(2, 2, [0; 3]).unwrap(),
        ExposureTime::from_micros(10_000.0).unwrap(),
        1,
    );
    let result = Bracket::new(vec![gray_frame(0, 40_000.0, 0), small]);
    assert!(matches!(result, Err(HdrError::DimensionMismatch { .. })));
}

#[test]
fn bracket_rejects_duplicate_exposures() {
    let result = Bracket::new(vec![gray_frame(10, 40_000.0, 0), gray_frame(20, 40_000.0, 1)]);
    assert!(matches!(result, Err(HdrError::DuplicateExposure(_))));
}

#[test]
fn rgb_image_validates_buffer_length() {
    assert!(RgbImage::new(2, 2, vec![0u8; 12]).is_ok());
    assert!(RgbImage::new(2, 2, vec![0u8; 11]).is_err());
    assert!(RgbImage::new(0, 2, Vec::new()).is_err());
}
