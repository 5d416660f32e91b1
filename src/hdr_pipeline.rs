//! Bracketed HDR capture and reconstruction pipeline
//!
//! This module provides a structured approach to high-dynamic-range imaging
//! from an exposure bracket, with separate modules for camera sequencing,
//! frame storage, radiometric recovery, tonemapping, exposure fusion, and
//! run orchestration.

pub mod camera;
pub mod common;
pub mod frame;
pub mod fusion;
pub mod io;
pub mod orchestrator;
pub mod radiance;
pub mod tonemap;

pub use common::{
    HdrError,
    Result,
};

pub use camera::{
    BayerConverter,
    CaptureConfig,
    CaptureConfigBuilder,
    ColorConverter,
    ExposureSequencer,
    RawFrame,
    SensorDevice,
};

pub use frame::{
    Bracket,
    ExposureTime,
    Frame,
    FrameStore,
    RgbImage,
};

pub use radiance::{
    RadianceMap,
    RadianceRecoverer,
    RecoveryConfig,
};

pub use tonemap::{
    DragoToneMapper,
    TonemapConfig,
};

pub use fusion::{
    ExposureFusionBlender,
    FusionConfig,
};

pub use io::{
    ImageWriter,
    PngImageWriter,
    TiffCompression,
    TiffImageWriter,
};

pub use orchestrator::{
    HdrPipeline,
    HdrReconstructor,
    RunConfig,
    RunConfigBuilder,
    RunSummary,
};
