use tracing::{debug, instrument};

use crate::hdr_pipeline::common::error::Result;
use crate::hdr_pipeline::frame::RgbImage;
use crate::hdr_pipeline::radiance::RadianceMap;

/// Configuration for adaptive logarithmic tonemapping.
#[derive(Debug, Clone)]
pub struct TonemapConfig {
    /// Output gamma; 1.0 leaves the compressed values untouched.
    pub gamma: f64,
    /// Bias controlling the steepness of the log compression, in (0, 1].
    pub bias: f64,
}

impl Default for TonemapConfig {
    fn default() -> Self {
        Self {
            gamma: 1.0,
            bias: 0.7,
        }
    }
}

/// Adaptive logarithmic range compression after Drago: each pixel's
/// luminance runs through a log curve whose base varies with the ratio to
/// the map's maximum luminance, yielding a bounded display range.
#[derive(Debug, Default)]
pub struct DragoToneMapper {
    config: TonemapConfig,
}

impl DragoToneMapper {
    pub fn new(config: TonemapConfig) -> Self {
        Self { config }
    }

    /// Compress `map` to 8-bit RGB. Non-finite or negative radiance values
    /// are sanitized to zero before compression; the output is finite and
    /// in range for any finite non-negative input, including an all-zero
    /// map.
    #[instrument(skip(self, map), fields(width = map.width(), height = map.height()))]
    pub fn tonemap(&self, map: &RadianceMap) -> Result<RgbImage> {
        let width = map.width();
        let height = map.height();
        let bias_power = self.config.bias.ln() / 0.5f64.ln();
        let inv_gamma = 1.0 / self.config.gamma;

        let sanitized: Vec<f64> = map
            .data()
            .iter()
            .map(|&v| {
                let v = f64::from(v);
                if v.is_finite() && v > 0.0 { v } else { 0.0 }
            })
            .collect();

        let mut max_luminance = 0.0f64;
        for pixel in sanitized.chunks_exact(3) {
            max_luminance = max_luminance.max(luminance(pixel));
        }
        debug!(max_luminance, "Tonemapping radiance map");

        let mut data = vec![0u8; width * height * 3];
        if max_luminance <= 0.0 {
            // Degenerate map: nothing to compress, emit black.
            return RgbImage::new(width, height, data);
        }

        let denom_scale = (1.0 + max_luminance).log10();
        for (out, pixel) in data.chunks_exact_mut(3).zip(sanitized.chunks_exact(3)) {
            let l = luminance(pixel);
            if l <= 0.0 {
                continue;
            }

            let interp = (l / max_luminance).powf(bias_power);
            let compressed = (1.0 + l).ln() / ((2.0 + 8.0 * interp).ln() * denom_scale);
            let ratio = compressed / l;

            for (slot, &channel) in out.iter_mut().zip(pixel) {
                let mut v = (channel * ratio).clamp(0.0, 1.0);
                if self.config.gamma != 1.0 {
                    v = v.powf(inv_gamma);
                }
                *slot = (v * 255.0).round().clamp(0.0, 255.0) as u8;
            }
        }

        RgbImage::new(width, height, data)
    }
}

#[inline]
fn luminance(rgb: &[f64]) -> f64 {
    0.2126 * rgb[0] + 0.7152 * rgb[1] + 0.0722 * rgb[2]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map_from(width: usize, height: usize, values: Vec<f32>) -> RadianceMap {
        RadianceMap::new(width, height, values).unwrap()
    }

    #[test]
    fn output_is_in_range_for_wide_dynamic_range() {
        let values: Vec<f32> = (0..4 * 4 * 3)
            .map(|i| 10f32.powi((i % 12) as i32 - 6))
            .collect();
        let map = map_from(4, 4, values);

        let image = DragoToneMapper::default().tonemap(&map).unwrap();
        assert_eq!(image.width(), 4);
        assert_eq!(image.height(), 4);
        // u8 storage already bounds the range; the interesting part is that
        // bright pixels neither wrap nor collapse to a constant.
        assert!(image.data().iter().any(|&v| v > 0));
    }

    #[test]
    fn all_zero_map_produces_black_output() {
        let map = map_from(2, 2, vec![0.0; 12]);
        let image = DragoToneMapper::default().tonemap(&map).unwrap();
        assert!(image.data().iter().all(|&v| v == 0));
    }

    #[test]
    fn non_finite_and_negative_values_are_sanitized() {
        let map = map_from(
            2,
            2,
            vec![
                f32::NAN,
                f32::INFINITY,
                f32::NEG_INFINITY,
                -1.0,
                0.5,
                0.25,
                1.0,
                1.0,
                1.0,
                0.0,
                0.0,
                0.0,
            ],
        );
        let image = DragoToneMapper::default().tonemap(&map).unwrap();
        assert_eq!(image.data().len(), 12);
        // The poisoned pixel degrades to black instead of propagating.
        assert_eq!(image.pixel(0, 0), [0, 0, 0]);
    }

    #[test]
    fn brighter_radiance_maps_to_brighter_pixels() {
        let map = map_from(
            2,
            1,
            vec![0.01, 0.01, 0.01, 1.0, 1.0, 1.0],
        );
        let image = DragoToneMapper::default().tonemap(&map).unwrap();
        assert!(image.pixel(1, 0)[0] > image.pixel(0, 0)[0]);
    }

    #[test]
    fn gamma_brightens_midtones() {
        let map = map_from(2, 1, vec![0.05, 0.05, 0.05, 1.0, 1.0, 1.0]);
        let neutral = DragoToneMapper::default().tonemap(&map).unwrap();
        let lifted = DragoToneMapper::new(TonemapConfig {
            gamma: 2.2,
            ..Default::default()
        })
        .tonemap(&map)
        .unwrap();
        assert!(lifted.pixel(0, 0)[0] >= neutral.pixel(0, 0)[0]);
    }
}
