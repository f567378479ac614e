use super::{ComplexProbabilityFunction, CpfError};
use crate::common::constants::RECIPROCAL_SQRT_PI;
use num_complex::Complex64;
use rustfft::FftPlanner;
use std::f64::consts::PI;

pub const DEFAULT_WEIDEMAN_TERMS: usize = 24;
/// Points with |x| + y below this use the rational series.
pub const WEIDEMAN_MASK_LIMIT: f64 = 15.0;

/// Weideman (1994) rational series with the Humlicek region-1 closed form
/// `t/(sqrt(pi)(0.5 + t^2))`, `t = y - ix`, outside the mask.
#[derive(Debug, Clone, PartialEq)]
pub struct WeidemanCpf {
    terms: usize,
    scale: f64,
    /// Ascending-power coefficients of the polynomial in the mapped variable.
    coefficients: Vec<f64>,
}

impl WeidemanCpf {
    pub fn new(terms: usize) -> Result<Self, CpfError> {
        if terms == 0 {
            return Err(CpfError::InvalidTermCount { terms });
        }

        let half = 2 * terms;
        let samples = 2 * half;
        let scale = (terms as f64 / std::f64::consts::SQRT_2).sqrt();

        // f(t) = exp(-t^2)(L^2 + t^2) on t = L tan(k pi / 2M), k = -M+1..M-1,
        // with a leading zero, then rotated by M (fftshift).
        let mut sampled = Vec::with_capacity(samples);
        sampled.push(0.0);
        for k in (1 - half as i64)..(half as i64) {
            let theta = k as f64 * PI / half as f64;
            let t = scale * (0.5 * theta).tan();
            sampled.push((-t * t).exp() * (scale * scale + t * t));
        }

        let mut buffer: Vec<Complex64> = (0..samples)
            .map(|index| Complex64::new(sampled[(index + half) % samples], 0.0))
            .collect();
        let mut planner = FftPlanner::<f64>::new();
        planner.plan_fft_forward(samples).process(&mut buffer);

        let coefficients = buffer[1..=terms]
            .iter()
            .map(|value| value.re / samples as f64)
            .collect();

        Ok(Self {
            terms,
            scale,
            coefficients,
        })
    }

    pub fn terms(&self) -> usize {
        self.terms
    }

    /// Rational series alone, valid in the whole upper half plane.
    pub fn rational_series(&self, z: Complex64) -> Complex64 {
        let i_z = Complex64::i() * z;
        let denominator = self.scale - i_z;
        let mapped = (self.scale + i_z) / denominator;

        let polynomial = self
            .coefficients
            .iter()
            .rev()
            .fold(Complex64::new(0.0, 0.0), |acc, &coefficient| {
                acc * mapped + coefficient
            });

        2.0 * polynomial / (denominator * denominator) + RECIPROCAL_SQRT_PI / denominator
    }

    /// One-pole closed form used away from the line centre.
    pub fn closed_form(z: Complex64) -> Complex64 {
        let t = Complex64::new(z.im, -z.re);
        RECIPROCAL_SQRT_PI * t / (0.5 + t * t)
    }

    fn in_mask(z: Complex64) -> bool {
        z.re.abs() + z.im < WEIDEMAN_MASK_LIMIT
    }
}

impl ComplexProbabilityFunction for WeidemanCpf {
    fn name(&self) -> &'static str {
        "hum1_wei"
    }

    fn w(&self, z: Complex64) -> Complex64 {
        if Self::in_mask(z) {
            self.rational_series(z)
        } else {
            Self::closed_form(z)
        }
    }

    /// Closed form everywhere, then overridden inside the mask.
    fn w_batch(&self, z: &[Complex64]) -> Vec<Complex64> {
        let mut values: Vec<Complex64> = z.iter().map(|&point| Self::closed_form(point)).collect();
        for (value, &point) in values.iter_mut().zip(z) {
            if Self::in_mask(point) {
                *value = self.rational_series(point);
            }
        }
        values
    }
}
