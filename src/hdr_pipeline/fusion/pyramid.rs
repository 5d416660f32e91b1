//! Gaussian/Laplacian pyramid plumbing for seam-free blending.
//!
//! Classic Burt-Adelson construction with a 5-tap binomial kernel and
//! clamp-to-edge borders. Collapsing uses the same upsample as the
//! Laplacian construction, so collapse(laplacian(p)) reconstructs p
//! exactly up to float rounding.

/// Single-channel f32 raster.
#[derive(Debug, Clone)]
pub(crate) struct Plane {
    width: usize,
    height: usize,
    data: Vec<f32>,
}

const KERNEL: [f32; 5] = [1.0 / 16.0, 4.0 / 16.0, 6.0 / 16.0, 4.0 / 16.0, 1.0 / 16.0];

impl Plane {
    pub(crate) fn zeros(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0.0; width * height],
        }
    }

    pub(crate) fn from_data(width: usize, height: usize, data: Vec<f32>) -> Self {
        debug_assert_eq!(data.len(), width * height);
        Self {
            width,
            height,
            data,
        }
    }

    pub(crate) fn width(&self) -> usize {
        self.width
    }

    pub(crate) fn height(&self) -> usize {
        self.height
    }

    pub(crate) fn data(&self) -> &[f32] {
        &self.data
    }

    pub(crate) fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    #[inline]
    fn clamped(&self, x: isize, y: isize) -> f32 {
        let x = x.clamp(0, self.width as isize - 1) as usize;
        let y = y.clamp(0, self.height as isize - 1) as usize;
        self.data[y * self.width + x]
    }
}

/// Blur and decimate by two; output is ceil(size / 2) per axis.
pub(crate) fn downsample(src: &Plane) -> Plane {
    let out_w = src.width.div_ceil(2);
    let out_h = src.height.div_ceil(2);
    let mut out = Plane::zeros(out_w, out_h);

    for y in 0..out_h {
        for x in 0..out_w {
            let mut acc = 0.0;
            for (j, kj) in KERNEL.iter().enumerate() {
                for (i, ki) in KERNEL.iter().enumerate() {
                    let sx = 2 * x as isize + i as isize - 2;
                    let sy = 2 * y as isize + j as isize - 2;
                    acc += ki * kj * src.clamped(sx, sy);
                }
            }
            out.data[y * out_w + x] = acc;
        }
    }
    out
}

/// Zero-stuffed expansion to an explicit target size, filtered with the
/// doubled kernel.
pub(crate) fn upsample(src: &Plane, target_w: usize, target_h: usize) -> Plane {
    debug_assert_eq!(target_w.div_ceil(2), src.width);
    debug_assert_eq!(target_h.div_ceil(2), src.height);
    let mut out = Plane::zeros(target_w, target_h);

    for y in 0..target_h {
        for x in 0..target_w {
            let mut acc = 0.0;
            for (j, kj) in KERNEL.iter().enumerate() {
                for (i, ki) in KERNEL.iter().enumerate() {
                    // Zero-stuffed grid position; only even coordinates carry
                    // a source sample. Parity is decided before clamping so
                    // edge replication keeps the kernel mass at 1.
                    let gx = x as isize + i as isize - 2;
                    let gy = y as isize + j as isize - 2;
                    if gx % 2 == 0 && gy % 2 == 0 {
                        acc += 4.0 * ki * kj * src.clamped(gx / 2, gy / 2);
                    }
                }
            }
            out.data[y * target_w + x] = acc;
        }
    }
    out
}

/// Number of downsample steps that keep the coarsest level at least one
/// pixel per axis.
pub(crate) fn auto_levels(width: usize, height: usize) -> usize {
    let min = width.min(height).max(1);
    (usize::BITS - 1 - min.leading_zeros()) as usize
}

/// Base level followed by `levels` successively blurred reductions.
pub(crate) fn gaussian_pyramid(base: Plane, levels: usize) -> Vec<Plane> {
    let mut pyramid = Vec::with_capacity(levels + 1);
    let mut current = base;
    for _ in 0..levels {
        let next = downsample(&current);
        pyramid.push(current);
        current = next;
    }
    pyramid.push(current);
    pyramid
}

/// Band-pass decomposition; the last entry is the low-pass residual.
pub(crate) fn laplacian_pyramid(base: Plane, levels: usize) -> Vec<Plane> {
    let gaussian = gaussian_pyramid(base, levels);
    let mut pyramid = Vec::with_capacity(gaussian.len());

    for level in 0..levels {
        let fine = &gaussian[level];
        let expanded = upsample(&gaussian[level + 1], fine.width, fine.height);
        let mut band = fine.clone();
        for (b, e) in band.data.iter_mut().zip(expanded.data.iter()) {
            *b -= e;
        }
        pyramid.push(band);
    }
    if let Some(residual) = gaussian.into_iter().next_back() {
        pyramid.push(residual);
    }
    pyramid
}

/// Invert [`laplacian_pyramid`]: expand from the residual and add bands.
pub(crate) fn collapse(pyramid: Vec<Plane>) -> Plane {
    let mut levels = pyramid.into_iter().rev();
    let Some(mut acc) = levels.next() else {
        return Plane::zeros(0, 0);
    };

    for band in levels {
        let mut expanded = upsample(&acc, band.width, band.height);
        for (e, b) in expanded.data.iter_mut().zip(band.data.iter()) {
            *e += b;
        }
        acc = expanded;
    }
    acc
}
