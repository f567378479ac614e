use super::ComplexProbabilityFunction;
use super::naive::asymptotic_w;
use num_complex::Complex64;

const FAR_RADIUS: f64 = 8.0;
const NEAR_AXIS_MAX_Y: f64 = 0.85;
const NEAR_AXIS_SLOPE: f64 = 18.1;
const NEAR_AXIS_OFFSET: f64 = 1.65;
const GAUSSIAN_CUTOFF: f64 = 12.0;

const T: [f64; 6] = [
    0.314240376,
    0.947788391,
    1.59768264,
    2.27950708,
    3.02063703,
    3.8897249,
];
const U: [f64; 6] = [
    1.01172805,
    -0.75197147,
    1.2557727e-2,
    1.00220082e-2,
    -2.42068135e-4,
    5.00848061e-7,
];
const S: [f64; 6] = [
    1.393237,
    0.231152406,
    -0.155351466,
    6.21836624e-3,
    9.19082986e-5,
    -6.27525958e-7,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HumlicekRegion {
    /// |z| > 8, asymptotic series.
    Far,
    /// Close to the real axis in the wings, needs the exp(-x^2) term.
    NearAxis,
    Interior,
}

impl HumlicekRegion {
    pub fn classify(x: f64, y: f64) -> Self {
        if x.hypot(y) > FAR_RADIUS {
            Self::Far
        } else if y <= NEAR_AXIS_MAX_Y && x.abs() >= NEAR_AXIS_SLOPE * y + NEAR_AXIS_OFFSET {
            Self::NearAxis
        } else {
            Self::Interior
        }
    }
}

/// Humlicek (1979) six-term rational approximation with three regions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HumlicekCpf;

fn near_axis_w(x: f64, y: f64) -> Complex64 {
    let y1 = y + 1.5;
    let y2 = y1 * y1;
    let y3 = y + 3.0;
    let mut wr = if x.abs() < GAUSSIAN_CUTOFF {
        (-x * x).exp()
    } else {
        0.0
    };
    let mut wi = 0.0;

    for index in 0..6 {
        let r = x - T[index];
        let r2 = r * r;
        let d = 1.0 / (r2 + y2);
        let d1 = y1 * d;
        let d2 = r * d;
        wr += y * (U[index] * (r * d2 - 1.5 * d1) + S[index] * y3 * d2) / (r2 + 2.25);

        let r = x + T[index];
        let r2 = r * r;
        let d = 1.0 / (r2 + y2);
        let d3 = y1 * d;
        let d4 = r * d;
        wr += y * (U[index] * (r * d4 - 1.5 * d3) - S[index] * y3 * d4) / (r2 + 2.25);
        wi += U[index] * (d2 + d4) + S[index] * (d1 - d3);
    }

    Complex64::new(wr, wi)
}

fn interior_w(x: f64, y: f64) -> Complex64 {
    let y1 = y + 1.5;
    let y2 = y1 * y1;
    let mut wr = 0.0;
    let mut wi = 0.0;

    for index in 0..6 {
        let r = x - T[index];
        let d = 1.0 / (r * r + y2);
        let d1 = y1 * d;
        let d2 = r * d;

        let r = x + T[index];
        let d = 1.0 / (r * r + y2);
        let d3 = y1 * d;
        let d4 = r * d;

        wr += U[index] * (d1 + d3) - S[index] * (d2 - d4);
        wi += U[index] * (d2 + d4) + S[index] * (d1 - d3);
    }

    Complex64::new(wr, wi)
}

impl ComplexProbabilityFunction for HumlicekCpf {
    fn name(&self) -> &'static str {
        "humlicek"
    }

    fn w(&self, z: Complex64) -> Complex64 {
        match HumlicekRegion::classify(z.re, z.im) {
            HumlicekRegion::Far => asymptotic_w(z),
            HumlicekRegion::NearAxis => near_axis_w(z.re, z.im),
            HumlicekRegion::Interior => interior_w(z.re, z.im),
        }
    }

    /// Groups indices by region, evaluates each group, scatters back.
    fn w_batch(&self, z: &[Complex64]) -> Vec<Complex64> {
        let mut far = Vec::new();
        let mut near_axis = Vec::new();
        let mut interior = Vec::new();
        for (index, point) in z.iter().enumerate() {
            match HumlicekRegion::classify(point.re, point.im) {
                HumlicekRegion::Far => far.push(index),
                HumlicekRegion::NearAxis => near_axis.push(index),
                HumlicekRegion::Interior => interior.push(index),
            }
        }

        let mut values = vec![Complex64::new(0.0, 0.0); z.len()];
        for index in far {
            values[index] = asymptotic_w(z[index]);
        }
        for index in near_axis {
            values[index] = near_axis_w(z[index].re, z[index].im);
        }
        for index in interior {
            values[index] = interior_w(z[index].re, z[index].im);
        }
        values
    }
}
