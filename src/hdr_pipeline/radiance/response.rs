//! Camera response curve estimation.
//!
//! Standard radiometric self-calibration: for each color channel, solve a
//! weighted least-squares system for the discrete log-response over the
//! 0-255 intensity domain together with the log radiance of each sampled
//! location, regularized by a smoothness term on the curve's second
//! derivative.

use nalgebra::{DMatrix, DVector};
use tracing::debug;

use crate::hdr_pipeline::common::error::{HdrError, Result};
use crate::hdr_pipeline::frame::Bracket;

const INTENSITY_LEVELS: usize = 256;
const MID_INTENSITY: usize = 128;

/// Per-channel mapping from observed intensity to log relative radiance.
/// Derived per run and consumed only by the merge step.
pub(crate) struct ResponseCurve {
    channels: [Vec<f64>; 3],
}

impl ResponseCurve {
    #[inline]
    pub(crate) fn log_radiance(&self, channel: usize, intensity: u8) -> f64 {
        self.channels[channel][intensity as usize]
    }
}

/// Triangular weight over intensity: peaks at mid-range, vanishes at the
/// clipped extremes so saturated and black observations contribute nothing.
#[inline]
pub(crate) fn tent_weight(z: u8) -> f64 {
    f64::from(z.min(255 - z))
}

/// Solve-side weight. The +1 keeps every intensity row minimally
/// constrained so the system stays well posed at the domain edges.
#[inline]
fn solve_weight(z: u8) -> f64 {
    tent_weight(z) + 1.0
}

/// Recover the response curve from intensity observations at the sampled
/// locations. `log_times` holds the natural log of each frame's exposure
/// seconds, ascending, matching the bracket order.
pub(crate) fn solve_response(
    bracket: &Bracket,
    positions: &[(usize, usize)],
    log_times: &[f64],
    lambda: f64,
) -> Result<ResponseCurve> {
    let mut channels = Vec::with_capacity(3);
    for channel in 0..3 {
        let observations: Vec<Vec<u8>> = positions
            .iter()
            .map(|&(x, y)| {
                bracket
                    .frames()
                    .iter()
                    .map(|frame| frame.image().pixel(x, y)[channel])
                    .collect()
            })
            .collect();
        channels.push(solve_channel(&observations, log_times, lambda)?);
    }

    let [red, green, blue] = <[Vec<f64>; 3]>::try_from(channels)
        .map_err(|_| HdrError::SolveError("channel count mismatch".to_string()))?;
    Ok(ResponseCurve {
        channels: [red, green, blue],
    })
}

fn solve_channel(observations: &[Vec<u8>], log_times: &[f64], lambda: f64) -> Result<Vec<f64>> {
    let n_locations = observations.len();
    let n_frames = log_times.len();

    let rows = n_locations * n_frames + 1 + (INTENSITY_LEVELS - 2);
    let cols = INTENSITY_LEVELS + n_locations;
    let mut a = DMatrix::<f64>::zeros(rows, cols);
    let mut b = DVector::<f64>::zeros(rows);

    // Data rows: w(z) * (g(z) - ln E_i) = w(z) * ln t_j
    let mut row = 0;
    for (i, location) in observations.iter().enumerate() {
        for (j, &log_t) in log_times.iter().enumerate() {
            let z = location[j];
            let w = solve_weight(z);
            a[(row, z as usize)] = w;
            a[(row, INTENSITY_LEVELS + i)] = -w;
            b[row] = w * log_t;
            row += 1;
        }
    }

    // Gauge fix: anchor the curve midpoint at zero log radiance.
    a[(row, MID_INTENSITY)] = 1.0;
    row += 1;

    // Smoothness rows: lambda * w(z) * (g(z-1) - 2 g(z) + g(z+1)) = 0
    for z in 1..INTENSITY_LEVELS - 1 {
        let w = lambda * solve_weight(z as u8);
        a[(row, z - 1)] = w;
        a[(row, z)] = -2.0 * w;
        a[(row, z + 1)] = w;
        row += 1;
    }
    debug_assert_eq!(row, rows);

    debug!(
        rows,
        cols, n_locations, n_frames, "Solving response least squares"
    );

    let svd = a.svd(true, true);
    let x = svd
        .solve(&b, 1e-12)
        .map_err(|e| HdrError::SolveError(e.to_string()))?;

    Ok(x.iter().take(INTENSITY_LEVELS).copied().collect())
}
