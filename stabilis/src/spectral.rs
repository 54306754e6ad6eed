//! Spectral cross-correlation.
//!
//! The correlation surface of two real `width x height` grids `a` and `b` is
//! `IFFT(FFT(a) * conj(FFT(b)))`, real part only. Its peak sits at the
//! circular shift that best maps `b` onto `a`. No spectral whitening and no
//! `1/N` scaling are applied: only the peak location matters.

use std::sync::Arc;

use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};

use crate::error::{Error, Result};
use crate::plane::Plane;

/// 2D complex FFT over a fixed `width x height` row-major grid.
pub trait Fft2d {
    fn width(&self) -> usize;

    fn height(&self) -> usize;

    /// Forward transform, in place.
    fn forward(&self, data: &mut [Complex<f64>]);

    /// Unnormalized inverse transform, in place.
    fn inverse(&self, data: &mut [Complex<f64>]);
}

/// [`Fft2d`] backed by `rustfft`, using row-column decomposition.
pub struct RustFft2d {
    width: usize,
    height: usize,
    row_forward: Arc<dyn Fft<f64>>,
    row_inverse: Arc<dyn Fft<f64>>,
    column_forward: Arc<dyn Fft<f64>>,
    column_inverse: Arc<dyn Fft<f64>>,
}

impl RustFft2d {
    pub fn new(width: usize, height: usize) -> Self {
        assert!(width > 0 && height > 0, "FFT dimensions must be positive");

        let mut planner = FftPlanner::new();
        Self {
            width,
            height,
            row_forward: planner.plan_fft_forward(width),
            row_inverse: planner.plan_fft_inverse(width),
            column_forward: planner.plan_fft_forward(height),
            column_inverse: planner.plan_fft_inverse(height),
        }
    }

    fn process(&self, data: &mut [Complex<f64>], rows: &dyn Fft<f64>, columns: &dyn Fft<f64>) {
        assert_eq!(data.len(), self.width * self.height, "FFT buffer size mismatch");

        // rustfft transforms every consecutive chunk of its length.
        rows.process(data);

        let mut transposed = transpose(data, self.width, self.height);
        columns.process(&mut transposed);

        data.copy_from_slice(&transpose(&transposed, self.height, self.width));
    }
}

impl Fft2d for RustFft2d {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn forward(&self, data: &mut [Complex<f64>]) {
        self.process(data, self.row_forward.as_ref(), self.column_forward.as_ref());
    }

    fn inverse(&self, data: &mut [Complex<f64>]) {
        self.process(data, self.row_inverse.as_ref(), self.column_inverse.as_ref());
    }
}

/// Transposes a row-major `width x height` grid into a `height x width` grid.
pub(crate) fn transpose(data: &[Complex<f64>], width: usize, height: usize) -> Vec<Complex<f64>> {
    let mut result = vec![Complex::new(0.0, 0.0); data.len()];
    for y in 0..height {
        for x in 0..width {
            result[x * height + y] = data[y * width + x];
        }
    }
    result
}

/// Cross-correlator bound to one resolution.
///
/// Holds the FFT plans, so repeated correlations at the same size skip the
/// planning step. Owned by the caller; nothing is cached globally.
pub struct SpectralCorrelator<F: Fft2d = RustFft2d> {
    fft: F,
}

impl SpectralCorrelator<RustFft2d> {
    pub fn new(width: usize, height: usize) -> Result<Self> {
        check_dimensions(width, height)?;
        Ok(Self::with_fft(RustFft2d::new(width, height)))
    }
}

impl<F: Fft2d> SpectralCorrelator<F> {
    pub fn with_fft(fft: F) -> Self {
        Self { fft }
    }

    pub fn width(&self) -> usize {
        self.fft.width()
    }

    pub fn height(&self) -> usize {
        self.fft.height()
    }

    /// Correlation surface of `a` against `b`.
    pub fn correlate(&self, a: &[f64], b: &[f64]) -> Result<Plane> {
        let (width, height) = (self.fft.width(), self.fft.height());
        let len = width * height;
        if a.len() != len || b.len() != len {
            return Err(Error::InvalidArgument(format!(
                "correlation inputs have {} and {} samples, expected {} ({}x{})",
                a.len(),
                b.len(),
                len,
                width,
                height
            )));
        }

        let mut spectrum_a = to_complex(a);
        let mut spectrum_b = to_complex(b);
        self.fft.forward(&mut spectrum_a);
        self.fft.forward(&mut spectrum_b);

        for (x, y) in spectrum_a.iter_mut().zip(spectrum_b.iter()) {
            *x *= y.conj();
        }

        self.fft.inverse(&mut spectrum_a);

        let values = spectrum_a.iter().map(|c| c.re).collect();
        Ok(Plane::new(width, height, values))
    }
}

/// One-shot correlation of two `width x height` grids; plans the FFT per call.
pub fn cross_correlation(a: &[f64], b: &[f64], width: usize, height: usize) -> Result<Plane> {
    SpectralCorrelator::new(width, height)?.correlate(a, b)
}

fn check_dimensions(width: usize, height: usize) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(Error::InvalidArgument(format!(
            "correlation dimensions must be positive, got {}x{}",
            width, height
        )));
    }
    Ok(())
}

fn to_complex(values: &[f64]) -> Vec<Complex<f64>> {
    values.iter().map(|&v| Complex::new(v, 0.0)).collect()
}

/// Index of the largest value; the first one wins on ties.
pub(crate) fn arg_max(values: &[f64]) -> usize {
    let mut best = 0;
    let mut best_value = f64::NEG_INFINITY;
    for (i, &v) in values.iter().enumerate() {
        if v > best_value {
            best_value = v;
            best = i;
        }
    }
    best
}
