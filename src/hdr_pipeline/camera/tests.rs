use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::convert::ColorConverter;
use super::device::{RawFrame, SensorDevice};
use super::sequencer::{CaptureConfig, ExposureSequencer};
use crate::hdr_pipeline::common::error::{HdrError, Result};
use crate::hdr_pipeline::frame::RgbImage;

struct MockDevice {
    events: Arc<Mutex<Vec<String>>>,
    timeout_gets: HashSet<usize>,
    get_calls: usize,
    exposure_us: f64,
    streaming: bool,
}

impl MockDevice {
    fn new(events: Arc<Mutex<Vec<String>>>, timeout_gets: HashSet<usize>) -> Self {
        Self {
            events,
            timeout_gets,
            get_calls: 0,
            exposure_us: 0.0,
            streaming: false,
        }
    }

    fn record(&self, event: impl Into<String>) {
        self.events.lock().unwrap().push(event.into());
    }
}

impl SensorDevice for MockDevice {
    fn set_exposure_us(&mut self, exposure_us: f64) -> Result<()> {
        self.exposure_us = exposure_us;
        self.record(format!("set {}", exposure_us));
        Ok(())
    }

    fn stream_on(&mut self) -> Result<()> {
        assert!(!self.streaming, "stream started twice");
        self.streaming = true;
        self.record("on");
        Ok(())
    }

    fn stream_off(&mut self) -> Result<()> {
        self.streaming = false;
        self.record("off");
        Ok(())
    }

    fn get_frame(&mut self, _timeout: Option<Duration>) -> Result<RawFrame> {
        assert!(self.streaming, "get_frame outside of stream");
        self.get_calls += 1;
        self.record("get");
        if self.timeout_gets.contains(&self.get_calls) {
            return Err(HdrError::FrameTimeout(100));
        }
        // Brightness tracks exposure so frames stay distinguishable.
        let level = (self.exposure_us / 10_000.0).min(255.0) as u8;
        Ok(RawFrame {
            width: 4,
            height: 4,
            data: vec![level; 16],
        })
    }

    fn close(&mut self) -> Result<()> {
        self.record("close");
        Ok(())
    }
}

/// Replicates the first mosaic sample into a flat RGB image.
struct FlatConverter;

impl ColorConverter for FlatConverter {
    fn convert(&self, raw: &RawFrame) -> Result<RgbImage> {
        RgbImage::filled(raw.width, raw.height, [raw.data[0]; 3])
    }
}

struct FailingConverter;

impl ColorConverter for FailingConverter {
    fn convert(&self, _raw: &RawFrame) -> Result<RgbImage> {
        Err(HdrError::DecodeError("mock converter failure".to_string()))
    }
}

fn config(exposures_us: Vec<f64>, settle_discard: bool) -> CaptureConfig {
    CaptureConfig::builder()
        .exposures_us(exposures_us)
        .settle_discard(settle_discard)
        .frame_timeout(Some(Duration::from_millis(100)))
        .build()
}

#[test]
fn captures_one_frame_per_exposure() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let device = MockDevice::new(events.clone(), HashSet::new());
    let mut sequencer = ExposureSequencer::new(
        device,
        FlatConverter,
        config(vec![10_000.0, 40_000.0, 160_000.0], false),
    );

    let frames = sequencer.capture_bracket().unwrap();
    assert_eq!(frames.len(), 3);
    assert_eq!(frames[0].index(), 1);
    assert_eq!(frames[2].index(), 3);
    assert_eq!(frames[1].exposure().micros(), 40_000.0);

    let events = events.lock().unwrap();
    let events: Vec<&str> = events.iter().map(String::as_str).collect();
    let expected = [
        "set 10000", "on", "get", "off",
        "set 40000", "on", "get", "off",
        "set 160000", "on", "get", "off",
    ];
    assert_eq!(events, expected);
}

#[test]
fn settle_discard_acquires_an_extra_frame() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let device = MockDevice::new(events.clone(), HashSet::new());
    let mut sequencer =
        ExposureSequencer::new(device, FlatConverter, config(vec![40_000.0], true));

    let frames = sequencer.capture_bracket().unwrap();
    assert_eq!(frames.len(), 1);

    let events = events.lock().unwrap();
    let events: Vec<&str> = events.iter().map(String::as_str).collect();
    assert_eq!(events, ["set 40000", "on", "get", "get", "off"]);
}

#[test]
fn timeout_skips_exposure_and_sequence_continues() {
    let events = Arc::new(Mutex::new(Vec::new()));
    // Second keeper frame times out.
    let device = MockDevice::new(events.clone(), HashSet::from([2]));
    let mut sequencer = ExposureSequencer::new(
        device,
        FlatConverter,
        config(vec![10_000.0, 40_000.0, 160_000.0], false),
    );

    let frames = sequencer.capture_bracket().unwrap();
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0].exposure().micros(), 10_000.0);
    assert_eq!(frames[1].exposure().micros(), 160_000.0);

    // The stream is stopped for the skipped exposure as well.
    let events = events.lock().unwrap();
    let ons = events.iter().filter(|e| *e == "on").count();
    let offs = events.iter().filter(|e| *e == "off").count();
    assert_eq!(ons, 3);
    assert_eq!(offs, 3);
}

#[test]
fn stream_stops_when_conversion_fails() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let device = MockDevice::new(events.clone(), HashSet::new());
    let mut sequencer =
        ExposureSequencer::new(device, FailingConverter, config(vec![40_000.0], false));

    let result = sequencer.capture_bracket();
    assert!(matches!(result, Err(HdrError::DecodeError(_))));

    let events = events.lock().unwrap();
    assert_eq!(events.last().map(String::as_str), Some("off"));
}

#[test]
fn empty_exposure_list_yields_no_frames() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let device = MockDevice::new(events.clone(), HashSet::new());
    let mut sequencer = ExposureSequencer::new(device, FlatConverter, config(Vec::new(), true));

    let frames = sequencer.capture_bracket().unwrap();
    assert!(frames.is_empty());
    assert!(events.lock().unwrap().is_empty());
}
