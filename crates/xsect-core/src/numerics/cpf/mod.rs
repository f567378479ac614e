//! Complex probability function w(z) = exp(-z^2) erfc(-iz), Im z >= 0.
//!
//! Three evaluators share the [`ComplexProbabilityFunction`] strategy trait;
//! the line-shape core receives one explicitly instead of reading a global.

pub mod humlicek;
pub mod naive;
pub mod weideman;

pub use humlicek::{HumlicekCpf, HumlicekRegion};
pub use naive::{NaiveCpf, asymptotic_w};
pub use weideman::{DEFAULT_WEIDEMAN_TERMS, WEIDEMAN_MASK_LIMIT, WeidemanCpf};

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CpfError {
    #[error("cpf input length mismatch: x={x}, y={y}")]
    LengthMismatch { x: usize, y: usize },
    #[error("rational series needs at least one term, got {terms}")]
    InvalidTermCount { terms: usize },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CpfValues {
    pub re: Vec<f64>,
    pub im: Vec<f64>,
}

impl CpfValues {
    pub fn len(&self) -> usize {
        self.re.len()
    }

    pub fn is_empty(&self) -> bool {
        self.re.is_empty()
    }
}

pub trait ComplexProbabilityFunction: Send + Sync {
    fn name(&self) -> &'static str;

    fn w(&self, z: Complex64) -> Complex64;

    /// Evaluates every point, preserving input order.
    fn w_batch(&self, z: &[Complex64]) -> Vec<Complex64> {
        z.iter().map(|&point| self.w(point)).collect()
    }
}

/// Array form `cpf(x, y) -> (re, im)` over equal-length inputs.
pub fn evaluate_cpf(
    cpf: &dyn ComplexProbabilityFunction,
    x: &[f64],
    y: &[f64],
) -> Result<CpfValues, CpfError> {
    if x.len() != y.len() {
        return Err(CpfError::LengthMismatch {
            x: x.len(),
            y: y.len(),
        });
    }

    let points: Vec<Complex64> = x
        .iter()
        .zip(y)
        .map(|(&re, &im)| Complex64::new(re, im))
        .collect();
    let values = cpf.w_batch(&points);
    Ok(CpfValues {
        re: values.iter().map(|value| value.re).collect(),
        im: values.iter().map(|value| value.im).collect(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CpfKind {
    Naive,
    Humlicek,
    Weideman { terms: usize },
}

impl Default for CpfKind {
    fn default() -> Self {
        Self::Weideman {
            terms: DEFAULT_WEIDEMAN_TERMS,
        }
    }
}

impl CpfKind {
    pub fn build(self) -> Result<Box<dyn ComplexProbabilityFunction>, CpfError> {
        Ok(match self {
            Self::Naive => Box::new(NaiveCpf),
            Self::Humlicek => Box::new(HumlicekCpf),
            Self::Weideman { terms } => Box::new(WeidemanCpf::new(terms)?),
        })
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use num_complex::Complex64;

    pub fn assert_complex_close(
        actual: Complex64,
        expected: Complex64,
        relative_tolerance: f64,
        label: &str,
    ) {
        let scale = expected.norm().max(1.0e-300);
        let difference = (actual - expected).norm() / scale;
        assert!(
            difference <= relative_tolerance,
            "{label}: expected {expected}, got {actual}, relative difference {difference:.3e}"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::{ComplexProbabilityFunction, CpfError, CpfKind, evaluate_cpf};

    #[test]
    fn default_strategy_is_the_masked_rational_series() {
        assert_eq!(CpfKind::default(), CpfKind::Weideman { terms: 24 });
        let cpf = CpfKind::default().build().expect("default cpf");
        assert_eq!(cpf.name(), "hum1_wei");
    }

    #[test]
    fn array_form_rejects_length_mismatch() {
        let cpf = CpfKind::Humlicek.build().expect("humlicek");
        assert_eq!(
            evaluate_cpf(cpf.as_ref(), &[0.0, 1.0], &[1.0]),
            Err(CpfError::LengthMismatch { x: 2, y: 1 })
        );
    }

    #[test]
    fn array_form_preserves_order() {
        let cpf = CpfKind::Humlicek.build().expect("humlicek");
        let x = [20.0, 0.5, 5.0, 0.0];
        let y = [1.0, 0.5, 0.1, 2.0];
        let values = evaluate_cpf(cpf.as_ref(), &x, &y).expect("values");
        assert_eq!(values.len(), 4);
        for index in 0..x.len() {
            let single = cpf.w(num_complex::Complex64::new(x[index], y[index]));
            assert_eq!(values.re[index], single.re);
            assert_eq!(values.im[index], single.im);
        }
    }

    #[test]
    fn strategy_kinds_deserialize_from_tagged_json() {
        let kind: CpfKind =
            serde_json::from_str(r#"{"kind":"weideman","terms":32}"#).expect("weideman");
        assert_eq!(kind, CpfKind::Weideman { terms: 32 });
        let kind: CpfKind = serde_json::from_str(r#"{"kind":"naive"}"#).expect("naive");
        assert_eq!(kind, CpfKind::Naive);
    }
}
