use tracing::{info, instrument};

use crate::hdr_pipeline::common::error::{HdrError, Result};
use crate::hdr_pipeline::frame::Bracket;
use crate::hdr_pipeline::radiance::response::{ResponseCurve, solve_response, tent_weight};
use crate::hdr_pipeline::radiance::sample::sample_positions;

/// Radiance assigned when no frame offers a usable observation for a pixel.
const DEFAULT_RADIANCE: f64 = 1.0;

/// Configuration for response recovery.
#[derive(Debug, Clone)]
pub struct RecoveryConfig {
    /// Number of spatially distributed sample locations for the solve.
    pub samples: usize,
    /// Weight of the second-derivative smoothness term.
    pub lambda: f64,
    /// Seed for the deterministic sampling pattern.
    pub seed: u64,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            samples: 70,
            lambda: 10.0,
            seed: 0,
        }
    }
}

/// Per-pixel linear-light radiance, same dimensions as the source bracket.
#[derive(Debug, Clone)]
pub struct RadianceMap {
    width: usize,
    height: usize,
    data: Vec<f32>,
}

impl RadianceMap {
    pub fn new(width: usize, height: usize, data: Vec<f32>) -> Result<Self> {
        if data.len() != width * height * 3 {
            return Err(HdrError::InvalidDimensions(width, height));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    #[inline]
    pub fn value(&self, x: usize, y: usize, channel: usize) -> f32 {
        self.data[(y * self.width + x) * 3 + channel]
    }
}

/// Recovers scene radiance from a bracket of at least two exposures.
#[derive(Debug, Default)]
pub struct RadianceRecoverer {
    config: RecoveryConfig,
}

impl RadianceRecoverer {
    pub fn new(config: RecoveryConfig) -> Self {
        Self { config }
    }

    /// Solve the per-channel response curve over a sampled pixel subset,
    /// then merge the full-resolution bracket into a radiance map.
    #[instrument(skip(self, bracket), fields(frames = bracket.len()))]
    pub fn recover(&self, bracket: &Bracket) -> Result<RadianceMap> {
        if bracket.len() < 2 {
            return Err(HdrError::InsufficientBracket {
                need: 2,
                got: bracket.len(),
            });
        }

        let log_times: Vec<f64> = bracket
            .exposure_seconds()
            .iter()
            .map(|t| t.ln())
            .collect();
        let positions = sample_positions(
            bracket.width(),
            bracket.height(),
            self.config.samples,
            self.config.seed,
        );

        info!(
            samples = positions.len(),
            lambda = self.config.lambda,
            "Recovering camera response"
        );
        let curve = solve_response(bracket, &positions, &log_times, self.config.lambda)?;

        Ok(merge(bracket, &curve, &log_times))
    }
}

/// Weight-normalized merge of the bracket under the recovered response:
/// radiance = exp( sum_j w(z_j) * (g(z_j) - ln t_j) / sum_j w(z_j) ).
fn merge(bracket: &Bracket, curve: &ResponseCurve, log_times: &[f64]) -> RadianceMap {
    let width = bracket.width();
    let height = bracket.height();
    let mut data = Vec::with_capacity(width * height * 3);

    for y in 0..height {
        for x in 0..width {
            for channel in 0..3 {
                let mut weight_sum = 0.0;
                let mut log_sum = 0.0;
                for (j, frame) in bracket.frames().iter().enumerate() {
                    let z = frame.image().pixel(x, y)[channel];
                    let w = tent_weight(z);
                    weight_sum += w;
                    log_sum += w * (curve.log_radiance(channel, z) - log_times[j]);
                }

                let radiance = if weight_sum > 0.0 {
                    (log_sum / weight_sum).exp()
                } else {
                    // Every frame clipped here; fall back to the observation
                    // closest to mid-range.
                    bracket
                        .frames()
                        .iter()
                        .enumerate()
                        .min_by_key(|(_, frame)| {
                            let z = frame.image().pixel(x, y)[channel];
                            (i16::from(z) - 128).abs()
                        })
                        .map_or(DEFAULT_RADIANCE, |(j, frame)| {
                            let z = frame.image().pixel(x, y)[channel];
                            (curve.log_radiance(channel, z) - log_times[j]).exp()
                        })
                };
                data.push(radiance as f32);
            }
        }
    }

    RadianceMap {
        width,
        height,
        data,
    }
}
