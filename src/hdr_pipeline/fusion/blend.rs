use tracing::{debug, info, instrument};

use crate::hdr_pipeline::common::error::Result;
use crate::hdr_pipeline::frame::{Bracket, RgbImage};
use crate::hdr_pipeline::fusion::pyramid::{
    Plane, auto_levels, collapse, gaussian_pyramid, laplacian_pyramid,
};

/// Keeps weight normalization defined where every quality measure vanishes
/// (flat, gray, badly exposed regions fuse to a uniform average).
const WEIGHT_EPSILON: f32 = 1e-12;

/// Configuration for perceptual exposure fusion.
#[derive(Debug, Clone)]
pub struct FusionConfig {
    /// Exponent on the local-contrast measure.
    pub contrast_exp: f32,
    /// Exponent on the color-saturation measure.
    pub saturation_exp: f32,
    /// Exponent on the well-exposedness measure.
    pub exposedness_exp: f32,
    /// Spread of the well-exposedness Gaussian around mid-range.
    pub sigma: f32,
    /// Cap on pyramid depth; `None` lets the image size decide.
    pub max_levels: Option<usize>,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            contrast_exp: 1.0,
            saturation_exp: 1.0,
            exposedness_exp: 1.0,
            sigma: 0.2,
            max_levels: None,
        }
    }
}

/// Blends a bracket into a single display image by weighting each input
/// pixel by contrast, saturation, and well-exposedness, then fusing in a
/// multi-resolution pyramid so weight transitions stay seam-free.
///
/// Exposure metadata is not consulted; a single input degenerates to the
/// identity.
#[derive(Debug, Default)]
pub struct ExposureFusionBlender {
    config: FusionConfig,
}

impl ExposureFusionBlender {
    pub fn new(config: FusionConfig) -> Self {
        Self { config }
    }

    #[instrument(skip(self, bracket), fields(frames = bracket.len()))]
    pub fn blend(&self, bracket: &Bracket) -> Result<RgbImage> {
        if bracket.len() == 1 {
            info!("Single-frame bracket, returning the input unchanged");
            return Ok(bracket.frames()[0].image().clone());
        }

        let width = bracket.width();
        let height = bracket.height();
        let levels = {
            let natural = auto_levels(width, height);
            self.config.max_levels.map_or(natural, |m| natural.min(m))
        };
        debug!(levels, "Fusing bracket");

        let channels: Vec<[Plane; 3]> = bracket
            .frames()
            .iter()
            .map(|frame| split_channels(frame.image()))
            .collect();
        let mut weights: Vec<Plane> = channels
            .iter()
            .map(|planes| self.quality_weights(planes))
            .collect();
        normalize_weights(&mut weights);

        // Blend each Laplacian band under the Gaussian-smoothed weights.
        let mut blended: Vec<Vec<Plane>> = Vec::with_capacity(3);
        let weight_pyramids: Vec<Vec<Plane>> = weights
            .into_iter()
            .map(|w| gaussian_pyramid(w, levels))
            .collect();

        for channel in 0..3 {
            let mut accumulator: Option<Vec<Plane>> = None;
            for (planes, weight_pyramid) in channels.iter().zip(&weight_pyramids) {
                let image_pyramid = laplacian_pyramid(planes[channel].clone(), levels);
                let acc = accumulator.get_or_insert_with(|| {
                    image_pyramid
                        .iter()
                        .map(|level| Plane::zeros(level.width(), level.height()))
                        .collect()
                });
                for (acc_level, (img_level, w_level)) in
                    acc.iter_mut().zip(image_pyramid.iter().zip(weight_pyramid))
                {
                    for (a, (v, w)) in acc_level
                        .data_mut()
                        .iter_mut()
                        .zip(img_level.data().iter().zip(w_level.data()))
                    {
                        *a += v * w;
                    }
                }
            }
            blended.push(accumulator.unwrap_or_default());
        }

        let mut data = vec![0u8; width * height * 3];
        for (channel, pyramid) in blended.into_iter().enumerate() {
            let fused = collapse(pyramid);
            for (i, &v) in fused.data().iter().enumerate() {
                data[i * 3 + channel] = (v.clamp(0.0, 1.0) * 255.0).round() as u8;
            }
        }

        RgbImage::new(width, height, data)
    }

    /// Multiplicative quality weight per pixel: contrast x saturation x
    /// well-exposedness, each raised to its configured exponent.
    fn quality_weights(&self, [red, green, blue]: &[Plane; 3]) -> Plane {
        let width = red.width();
        let height = red.height();

        let gray_data: Vec<f32> = red
            .data()
            .iter()
            .zip(green.data().iter().zip(blue.data()))
            .map(|(r, (g, b))| (r + g + b) / 3.0)
            .collect();
        let gray = Plane::from_data(width, height, gray_data);

        let inv_two_sigma_sq = 1.0 / (2.0 * self.config.sigma * self.config.sigma);
        let mut weights = Plane::zeros(width, height);
        for y in 0..height {
            for x in 0..width {
                let i = y * width + x;
                let r = red.data()[i];
                let g = green.data()[i];
                let b = blue.data()[i];

                let contrast = laplacian_response(&gray, x, y).abs();

                let mean = (r + g + b) / 3.0;
                let variance =
                    ((r - mean).powi(2) + (g - mean).powi(2) + (b - mean).powi(2)) / 3.0;
                let saturation = variance.sqrt();

                let exposedness = (-((r - 0.5).powi(2)) * inv_two_sigma_sq).exp()
                    * (-((g - 0.5).powi(2)) * inv_two_sigma_sq).exp()
                    * (-((b - 0.5).powi(2)) * inv_two_sigma_sq).exp();

                weights.data_mut()[i] = contrast.powf(self.config.contrast_exp)
                    * saturation.powf(self.config.saturation_exp)
                    * exposedness.powf(self.config.exposedness_exp)
                    + WEIGHT_EPSILON;
            }
        }
        weights
    }
}

fn split_channels(image: &RgbImage) -> [Plane; 3] {
    let width = image.width();
    let height = image.height();
    let mut planes = [
        Plane::zeros(width, height),
        Plane::zeros(width, height),
        Plane::zeros(width, height),
    ];
    for (i, px) in image.data().chunks_exact(3).enumerate() {
        for (channel, plane) in planes.iter_mut().enumerate() {
            plane.data_mut()[i] = f32::from(px[channel]) / 255.0;
        }
    }
    planes
}

/// 4-neighbor high-pass response with clamp-to-edge borders.
fn laplacian_response(gray: &Plane, x: usize, y: usize) -> f32 {
    let width = gray.width();
    let height = gray.height();
    let at = |x: usize, y: usize| gray.data()[y * width + x];

    let left = at(x.saturating_sub(1), y);
    let right = at((x + 1).min(width - 1), y);
    let up = at(x, y.saturating_sub(1));
    let down = at(x, (y + 1).min(height - 1));
    left + right + up + down - 4.0 * at(x, y)
}

/// Scale the per-pixel weights so they sum to one across the bracket.
fn normalize_weights(weights: &mut [Plane]) {
    if weights.is_empty() {
        return;
    }
    let pixels = weights[0].data().len();
    for i in 0..pixels {
        let total: f32 = weights.iter().map(|w| w.data()[i]).sum();
        for w in weights.iter_mut() {
            w.data_mut()[i] /= total;
        }
    }
}
