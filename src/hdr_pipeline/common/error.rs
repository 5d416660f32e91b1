use thiserror::Error;

#[derive(Error, Debug)]
pub enum HdrError {
    #[error("no sensor device found")]
    DeviceNotFound,

    #[error("failed to open sensor device: {0}")]
    DeviceOpenFailure(String),

    #[error("timed out waiting for a frame after {0} ms")]
    FrameTimeout(u64),

    #[error("frame was dropped by the sensor: {0}")]
    FrameDropped(String),

    #[error("filename does not encode an exposure time: {0}")]
    InvalidFilename(String),

    #[error("bracket has {got} usable frame(s), need at least {need}")]
    InsufficientBracket { need: usize, got: usize },

    #[error("invalid exposure time: {0} us")]
    InvalidExposure(f64),

    #[error("duplicate exposure time in bracket: {0} us")]
    DuplicateExposure(f64),

    #[error("frame dimensions {got_width}x{got_height} do not match bracket {width}x{height}")]
    DimensionMismatch {
        width: usize,
        height: usize,
        got_width: usize,
        got_height: usize,
    },

    #[error("invalid image dimensions: width={0}, height={1}")]
    InvalidDimensions(usize, usize),

    #[error("failed to decode image: {0}")]
    DecodeError(String),

    #[error("failed to encode image: {0}")]
    EncodeError(String),

    #[error("response curve solve failed: {0}")]
    SolveError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HdrError>;
