//! Hartmann-Tran (pCqSDHC) complex line shape, Tran, Ngo & Hartmann,
//! JQSRT 129 (2013) 199-203.

use crate::common::constants::LN2;
use crate::numerics::cpf::{ComplexProbabilityFunction, asymptotic_w};
use num_complex::Complex64;
use std::f64::consts::{FRAC_1_PI, PI};

const LARGE_ARGUMENT: f64 = 4.0e3;
const NEAR_LORENTZ_RATIO: f64 = 3.0e-8;
const FAR_DOPPLER_RATIO: f64 = 1.0e-15;
const ASYMPTOTIC_RADIUS: f64 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HtInput<'a> {
    pub nu0: f64,
    pub gamma_d: f64,
    pub gamma0: f64,
    pub gamma2: f64,
    pub delta0: f64,
    pub delta2: f64,
    pub nu_vc: Complex64,
    pub eta: Complex64,
    pub grid: &'a [f64],
    /// First-order (Rosenkranz) line-mixing coefficient.
    pub y_rosen: f64,
}

impl<'a> HtInput<'a> {
    /// Voigt-limit input; the remaining parameters default to zero.
    pub fn new(nu0: f64, gamma_d: f64, gamma0: f64, grid: &'a [f64]) -> Self {
        Self {
            nu0,
            gamma_d,
            gamma0,
            gamma2: 0.0,
            delta0: 0.0,
            delta2: 0.0,
            nu_vc: Complex64::new(0.0, 0.0),
            eta: Complex64::new(0.0, 0.0),
            grid,
            y_rosen: 0.0,
        }
    }

    pub fn with_shift(mut self, delta0: f64) -> Self {
        self.delta0 = delta0;
        self
    }

    pub fn with_speed_dependence(mut self, gamma2: f64, delta2: f64) -> Self {
        self.gamma2 = gamma2;
        self.delta2 = delta2;
        self
    }

    pub fn with_velocity_changing(mut self, nu_vc: Complex64) -> Self {
        self.nu_vc = nu_vc;
        self
    }

    pub fn with_correlation(mut self, eta: Complex64) -> Self {
        self.eta = eta;
        self
    }

    pub fn with_line_mixing(mut self, y_rosen: f64) -> Self {
        self.y_rosen = y_rosen;
        self
    }
}

/// Normalized complex shape; `re` already includes the line-mixing term.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HtShape {
    pub re: Vec<f64>,
    pub im: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Regime {
    NearLorentzian,
    FarDoppler,
    General,
}

/// w evaluated at `Z` mapped onto the upper half plane, i.e. `cpf(-Im Z, Re Z)`.
fn w_at(cpf: &dyn ComplexProbabilityFunction, arguments: &[Complex64]) -> Vec<Complex64> {
    let mapped: Vec<Complex64> = arguments
        .iter()
        .map(|&argument| Complex64::i() * argument)
        .collect();
    cpf.w_batch(&mapped)
}

/// Like [`w_at`], but points flagged in `asymptotic` use the series directly.
fn w_at_split(
    cpf: &dyn ComplexProbabilityFunction,
    arguments: &[Complex64],
    asymptotic: &[bool],
) -> Vec<Complex64> {
    let regular: Vec<Complex64> = arguments
        .iter()
        .zip(asymptotic)
        .filter(|(_, flagged)| !**flagged)
        .map(|(argument, _)| *argument)
        .collect();
    let mut regular_values = w_at(cpf, &regular).into_iter();

    arguments
        .iter()
        .zip(asymptotic)
        .map(|(&argument, &flagged)| {
            if flagged {
                asymptotic_w(Complex64::i() * argument)
            } else {
                regular_values.next().unwrap_or_default()
            }
        })
        .collect()
}

/// Both arguments close together on either side of |Z| = 8, where the
/// regional evaluator switches formula.
fn straddles_asymptotic_boundary(z1: Complex64, z2: Complex64) -> bool {
    let s1 = z1.norm();
    let s2 = z2.norm();
    (s1 - s2).abs() <= 1.0 && s1.max(s2) > ASYMPTOTIC_RADIUS && s1.min(s2) <= ASYMPTOTIC_RADIUS
}

pub fn pcqsdhc(input: HtInput<'_>, cpf: &dyn ComplexProbabilityFunction) -> HtShape {
    let cte = LN2.sqrt() / input.gamma_d;
    let c0 = Complex64::new(input.gamma0, input.delta0);
    let c2 = Complex64::new(input.gamma2, input.delta2);
    let one_minus_eta = 1.0 - input.eta;
    let c0t = one_minus_eta * (c0 - 1.5 * c2) + input.nu_vc;
    let c2t = one_minus_eta * c2;

    let detuning: Vec<Complex64> = input
        .grid
        .iter()
        .map(|&sg| Complex64::new(0.0, input.nu0 - sg) + c0t)
        .collect();

    let (a_terms, b_terms) = if c2t.norm() == 0.0 {
        degenerate_terms(&detuning, cte, cpf)
    } else {
        speed_dependent_terms(&detuning, input, cte, c2t, one_minus_eta, cpf)
    };

    let line_mixing_denominator = input.nu_vc - input.eta * (c0 - 1.5 * c2);
    let mut shape = HtShape {
        re: Vec::with_capacity(input.grid.len()),
        im: Vec::with_capacity(input.grid.len()),
    };
    for (&a, &b) in a_terms.iter().zip(&b_terms) {
        let ls = FRAC_1_PI * a / (1.0 - line_mixing_denominator * a + input.eta * c2 * b);
        shape.re.push(ls.re + input.y_rosen * ls.im);
        shape.im.push(ls.im);
    }
    shape
}

/// No speed dependence: single CPF call per point.
fn degenerate_terms(
    detuning: &[Complex64],
    cte: f64,
    cpf: &dyn ComplexProbabilityFunction,
) -> (Vec<Complex64>, Vec<Complex64>) {
    let rpi = PI.sqrt();
    let z1: Vec<Complex64> = detuning.iter().map(|&value| value * cte).collect();
    let w1 = w_at(cpf, &z1);

    let a_terms = w1.iter().map(|&w| rpi * cte * w).collect();
    let b_terms = z1
        .iter()
        .zip(&w1)
        .map(|(&z, &w)| {
            if z.norm() <= LARGE_ARGUMENT {
                rpi * cte * ((1.0 - z * z) * w + z / rpi)
            } else {
                cte * (rpi * w + 0.5 / z - 0.75 / (z * z * z))
            }
        })
        .collect();
    (a_terms, b_terms)
}

fn speed_dependent_terms(
    detuning: &[Complex64],
    input: HtInput<'_>,
    cte: f64,
    c2t: Complex64,
    one_minus_eta: Complex64,
    cpf: &dyn ComplexProbabilityFunction,
) -> (Vec<Complex64>, Vec<Complex64>) {
    let rpi = PI.sqrt();
    let x: Vec<Complex64> = detuning.iter().map(|&value| value / c2t).collect();
    let y = 1.0 / ((2.0 * cte * c2t) * (2.0 * cte * c2t));
    let sqrt_y = Complex64::new(input.gamma2, -input.delta2)
        / (2.0
            * cte
            * one_minus_eta
            * (input.gamma2 * input.gamma2 + input.delta2 * input.delta2));

    let mut near_lorentzian = Vec::new();
    let mut far_doppler = Vec::new();
    let mut general = Vec::new();
    for (index, value) in x.iter().enumerate() {
        let regime = if value.norm() <= NEAR_LORENTZ_RATIO * y.norm() {
            Regime::NearLorentzian
        } else if y.norm() <= FAR_DOPPLER_RATIO * value.norm() {
            Regime::FarDoppler
        } else {
            Regime::General
        };
        match regime {
            Regime::NearLorentzian => near_lorentzian.push(index),
            Regime::FarDoppler => far_doppler.push(index),
            Regime::General => general.push(index),
        }
    }

    let zero = Complex64::new(0.0, 0.0);
    let mut a_terms = vec![zero; x.len()];
    let mut b_terms = vec![zero; x.len()];

    let two_point = |z1: Complex64, z2: Complex64, w1: Complex64, w2: Complex64| {
        let a = rpi * cte * (w1 - w2);
        let b = (-1.0 + rpi / (2.0 * sqrt_y) * (1.0 - z1 * z1) * w1
            - rpi / (2.0 * sqrt_y) * (1.0 - z2 * z2) * w2)
            / c2t;
        (a, b)
    };

    if !general.is_empty() {
        let z1: Vec<Complex64> = general
            .iter()
            .map(|&index| (x[index] + y).sqrt() - sqrt_y)
            .collect();
        let z2: Vec<Complex64> = z1.iter().map(|&z| z + 2.0 * sqrt_y).collect();
        let asymptotic: Vec<bool> = z1
            .iter()
            .zip(&z2)
            .map(|(&first, &second)| straddles_asymptotic_boundary(first, second))
            .collect();
        let w1 = w_at_split(cpf, &z1, &asymptotic);
        let w2 = w_at_split(cpf, &z2, &asymptotic);
        for (slot, &index) in general.iter().enumerate() {
            (a_terms[index], b_terms[index]) = two_point(z1[slot], z2[slot], w1[slot], w2[slot]);
        }
    }

    if !near_lorentzian.is_empty() {
        let z1: Vec<Complex64> = near_lorentzian
            .iter()
            .map(|&index| detuning[index] * cte)
            .collect();
        let z2: Vec<Complex64> = near_lorentzian
            .iter()
            .map(|&index| (x[index] + y).sqrt() + sqrt_y)
            .collect();
        let w1 = w_at(cpf, &z1);
        let w2 = w_at(cpf, &z2);
        for (slot, &index) in near_lorentzian.iter().enumerate() {
            (a_terms[index], b_terms[index]) = two_point(z1[slot], z2[slot], w1[slot], w2[slot]);
        }
    }

    if !far_doppler.is_empty() {
        let root_xy: Vec<Complex64> = far_doppler
            .iter()
            .map(|&index| (x[index] + y).sqrt())
            .collect();
        let w1 = w_at(cpf, &root_xy);

        let root_x: Vec<Complex64> = far_doppler.iter().map(|&index| x[index].sqrt()).collect();
        let moderate: Vec<Complex64> = root_x
            .iter()
            .copied()
            .filter(|root| root.norm() <= LARGE_ARGUMENT)
            .collect();
        let mut wb = w_at(cpf, &moderate).into_iter();

        for (slot, &index) in far_doppler.iter().enumerate() {
            let xk = x[index];
            let tail = 2.0 * rpi * root_xy[slot] * w1[slot];
            let core = if root_x[slot].norm() <= LARGE_ARGUMENT {
                let w = wb.next().unwrap_or_default();
                let core = 1.0 / rpi - root_x[slot] * w;
                a_terms[index] = (2.0 * rpi / c2t) * core;
                2.0 * rpi * core
            } else {
                let core = 1.0 / xk - 1.5 / (xk * xk);
                a_terms[index] = core / c2t;
                core
            };
            b_terms[index] = (-1.0 + (1.0 - xk - 2.0 * y) * core + tail) / c2t;
        }
    }

    (a_terms, b_terms)
}
