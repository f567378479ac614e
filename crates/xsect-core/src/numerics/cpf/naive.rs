use super::ComplexProbabilityFunction;
use crate::common::constants::RECIPROCAL_SQRT_PI;
use num_complex::Complex64;

const ASYMPTOTIC_TERMS: usize = 15;

/// Asymptotic series `i/(sqrt(pi) z) * sum_k prod_{j<k} (j+1/2)/z^2`.
///
/// Accurate only far from the origin (|z| > 8); used there by the regional
/// evaluator and by the HT core near that boundary.
pub fn asymptotic_w(z: Complex64) -> Complex64 {
    let inverse = z.inv();
    let inverse_squared = inverse * inverse;
    let mut sum = Complex64::new(1.0, 0.0);
    let mut term = Complex64::new(1.0, 0.0);

    for index in 0..ASYMPTOTIC_TERMS {
        term *= inverse_squared * (index as f64 + 0.5);
        sum += term;
    }

    sum * Complex64::i() * inverse * RECIPROCAL_SQRT_PI
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NaiveCpf;

impl ComplexProbabilityFunction for NaiveCpf {
    fn name(&self) -> &'static str {
        "cpf3"
    }

    fn w(&self, z: Complex64) -> Complex64 {
        asymptotic_w(z)
    }
}
