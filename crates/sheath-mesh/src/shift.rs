//! Toroidal phase shifts for shifted-metric field alignment.
//!
//! A z column is shifted by an angle `a` through its Fourier
//! representation: mode `k` is multiplied by `exp(-i k a)`, which maps
//! `f(z)` to `f(z - a)` for band-limited data. The Nyquist mode of an
//! even-length column has no well-defined phase for a real signal and is
//! left untouched, so shifting by `a` then by `-a` restores the input to
//! rounding error.

use std::f64::consts::PI;
use std::fmt;
use std::sync::Arc;

use rustfft::num_complex::Complex64;
use rustfft::{Fft, FftPlanner};

/// Reusable forward/inverse FFT pair for columns of one length.
#[derive(Clone)]
pub struct ZShifter {
    nz: usize,
    zlength: f64,
    forward: Arc<dyn Fft<f64>>,
    inverse: Arc<dyn Fft<f64>>,
}

impl fmt::Debug for ZShifter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZShifter")
            .field("nz", &self.nz)
            .field("zlength", &self.zlength)
            .finish_non_exhaustive()
    }
}

impl ZShifter {
    /// Plan transforms for columns of `nz` points spanning `zlength`.
    pub fn new(nz: usize, zlength: f64) -> Self {
        let mut planner = FftPlanner::new();
        Self {
            nz,
            zlength,
            forward: planner.plan_fft_forward(nz),
            inverse: planner.plan_fft_inverse(nz),
        }
    }

    /// Column length.
    pub fn nz(&self) -> usize {
        self.nz
    }

    /// Signed wavenumber of FFT bin `m`, or `None` for the Nyquist bin.
    fn wavenumber(&self, m: usize) -> Option<f64> {
        let nz = self.nz;
        let signed = if 2 * m < nz {
            m as f64
        } else if 2 * m == nz {
            return None;
        } else {
            m as f64 - nz as f64
        };
        Some(2.0 * PI * signed / self.zlength)
    }

    /// Shift `column` by `angle` in place: `f(z)` becomes `f(z - angle)`.
    ///
    /// `scratch` is resized as needed and can be reused across calls.
    pub fn shift(&self, column: &mut [f64], angle: f64, scratch: &mut Vec<Complex64>) {
        debug_assert_eq!(column.len(), self.nz);
        if self.nz < 2 || angle == 0.0 {
            return;
        }
        scratch.clear();
        scratch.extend(column.iter().map(|&v| Complex64::new(v, 0.0)));
        self.forward.process(scratch);
        for (m, c) in scratch.iter_mut().enumerate().skip(1) {
            if let Some(k) = self.wavenumber(m) {
                *c *= Complex64::from_polar(1.0, -k * angle);
            }
        }
        self.inverse.process(scratch);
        let norm = 1.0 / self.nz as f64;
        for (v, c) in column.iter_mut().zip(scratch.iter()) {
            *v = c.re * norm;
        }
    }
}
