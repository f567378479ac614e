//! Named profiles as special cases of the HT shape, plus the analytic
//! Doppler and Lorentz shapes that bypass it.

use super::htp::{HtInput, pcqsdhc};
use crate::common::constants::{LN2, SQRT_LN2_DIV_SQRT_PI};
use crate::numerics::cpf::ComplexProbabilityFunction;
use num_complex::Complex64;
use std::f64::consts::PI;

fn scaled_real_part(input: HtInput<'_>, sw: f64, cpf: &dyn ComplexProbabilityFunction) -> Vec<f64> {
    pcqsdhc(input, cpf)
        .re
        .into_iter()
        .map(|value| sw * value)
        .collect()
}

/// Gaussian with half width at half maximum `gamma_d`.
pub fn doppler(nu0: f64, gamma_d: f64, grid: &[f64], sw: f64) -> Vec<f64> {
    let amplitude = sw * SQRT_LN2_DIV_SQRT_PI / gamma_d;
    grid.iter()
        .map(|&sg| {
            let scaled = (sg - nu0) / gamma_d;
            amplitude * (-LN2 * scaled * scaled).exp()
        })
        .collect()
}

/// Pressure-shifted Lorentzian with optional Rosenkranz mixing.
pub fn lorentz(nu0: f64, gamma0: f64, delta0: f64, grid: &[f64], y_rosen: f64, sw: f64) -> Vec<f64> {
    let gamma0_squared = gamma0 * gamma0;
    if y_rosen == 0.0 {
        return grid
            .iter()
            .map(|&sg| {
                let detuning = sg + delta0 - nu0;
                sw * gamma0 / (PI * (gamma0_squared + detuning * detuning))
            })
            .collect();
    }

    grid.iter()
        .map(|&sg| {
            let detuning = sg + delta0 - nu0;
            sw * (gamma0 + y_rosen * detuning) / (PI * (gamma0_squared + detuning * detuning))
        })
        .collect()
}

#[allow(clippy::too_many_arguments)]
pub fn voigt(
    nu0: f64,
    gamma_d: f64,
    gamma0: f64,
    delta0: f64,
    grid: &[f64],
    y_rosen: f64,
    sw: f64,
    cpf: &dyn ComplexProbabilityFunction,
) -> Vec<f64> {
    let input = HtInput::new(nu0, gamma_d, gamma0, grid)
        .with_shift(delta0)
        .with_line_mixing(y_rosen);
    scaled_real_part(input, sw, cpf)
}

#[allow(clippy::too_many_arguments)]
pub fn sd_voigt(
    nu0: f64,
    gamma_d: f64,
    gamma0: f64,
    gamma2: f64,
    delta0: f64,
    delta2: f64,
    grid: &[f64],
    y_rosen: f64,
    sw: f64,
    cpf: &dyn ComplexProbabilityFunction,
) -> Vec<f64> {
    let input = HtInput::new(nu0, gamma_d, gamma0, grid)
        .with_shift(delta0)
        .with_speed_dependence(gamma2, delta2)
        .with_line_mixing(y_rosen);
    scaled_real_part(input, sw, cpf)
}

/// Hard-collision (Rautian) profile: Voigt plus velocity-changing collisions.
#[allow(clippy::too_many_arguments)]
pub fn rautian(
    nu0: f64,
    gamma_d: f64,
    gamma0: f64,
    delta0: f64,
    nu_vc: Complex64,
    grid: &[f64],
    y_rosen: f64,
    sw: f64,
    cpf: &dyn ComplexProbabilityFunction,
) -> Vec<f64> {
    let input = HtInput::new(nu0, gamma_d, gamma0, grid)
        .with_shift(delta0)
        .with_velocity_changing(nu_vc)
        .with_line_mixing(y_rosen);
    scaled_real_part(input, sw, cpf)
}

#[allow(clippy::too_many_arguments)]
pub fn sd_rautian(
    nu0: f64,
    gamma_d: f64,
    gamma0: f64,
    gamma2: f64,
    delta0: f64,
    delta2: f64,
    nu_vc: Complex64,
    grid: &[f64],
    y_rosen: f64,
    sw: f64,
    cpf: &dyn ComplexProbabilityFunction,
) -> Vec<f64> {
    let input = HtInput::new(nu0, gamma_d, gamma0, grid)
        .with_shift(delta0)
        .with_speed_dependence(gamma2, delta2)
        .with_velocity_changing(nu_vc)
        .with_line_mixing(y_rosen);
    scaled_real_part(input, sw, cpf)
}

#[allow(clippy::too_many_arguments)]
pub fn ht(
    nu0: f64,
    gamma_d: f64,
    gamma0: f64,
    gamma2: f64,
    delta0: f64,
    delta2: f64,
    nu_vc: Complex64,
    eta: Complex64,
    grid: &[f64],
    y_rosen: f64,
    sw: f64,
    cpf: &dyn ComplexProbabilityFunction,
) -> Vec<f64> {
    let input = HtInput::new(nu0, gamma_d, gamma0, grid)
        .with_shift(delta0)
        .with_speed_dependence(gamma2, delta2)
        .with_velocity_changing(nu_vc)
        .with_correlation(eta)
        .with_line_mixing(y_rosen);
    scaled_real_part(input, sw, cpf)
}

#[cfg(test)]
mod tests {
    use super::{doppler, ht, lorentz, rautian, sd_voigt, voigt};
    use crate::numerics::cpf::WeidemanCpf;
    use crate::numerics::{linear_grid, trapezoid};
    use num_complex::Complex64;

    fn cpf() -> WeidemanCpf {
        WeidemanCpf::new(24).expect("cpf")
    }

    #[test]
    fn doppler_peak_and_half_width() {
        let gamma_d = 0.002;
        let grid = [0.0, gamma_d];
        let values = doppler(0.0, gamma_d, &grid, 1.0);
        let peak = (std::f64::consts::LN_2 / std::f64::consts::PI).sqrt() / gamma_d;
        assert!((values[0] - peak).abs() / peak < 1.0e-14);
        assert!((values[1] / values[0] - 0.5).abs() < 1.0e-14);
    }

    #[test]
    fn lorentz_mixing_term_is_antisymmetric() {
        let grid = [-0.1, 0.1];
        let plain = lorentz(0.0, 0.05, 0.0, &grid, 0.0, 2.0);
        let mixed = lorentz(0.0, 0.05, 0.0, &grid, 0.2, 2.0);
        assert!((plain[0] - plain[1]).abs() < 1.0e-15);
        let delta_left = mixed[0] - plain[0];
        let delta_right = mixed[1] - plain[1];
        assert!((delta_left + delta_right).abs() < 1.0e-12);
        assert!(delta_right > 0.0);
    }

    #[test]
    fn lorentz_shift_moves_peak_to_lower_wavenumber() {
        let grid = [-0.01, 0.0, 0.01];
        let values = lorentz(0.0, 0.05, 0.01, &grid, 0.0, 1.0);
        assert!(values[0] > values[1] && values[0] > values[2]);
    }

    #[test]
    fn voigt_with_negligible_pressure_width_reduces_to_doppler() {
        let grid = linear_grid(-0.01, 0.01, 41).expect("grid");
        let gaussian = doppler(0.0, 0.002, &grid, 1.0);
        let shape = voigt(0.0, 0.002, 1.0e-9, 0.0, &grid, 0.0, 1.0, &cpf());
        let peak = gaussian[20];
        for (lhs, rhs) in shape.iter().zip(&gaussian) {
            assert!((lhs - rhs).abs() / peak < 1.0e-5);
        }
    }

    #[test]
    fn voigt_with_negligible_doppler_width_reduces_to_lorentz() {
        let grid = linear_grid(-0.5, 0.5, 51).expect("grid");
        let analytic = lorentz(0.0, 0.07, 0.0, &grid, 0.0, 1.0);
        let shape = voigt(0.0, 1.0e-6, 0.07, 0.0, &grid, 0.0, 1.0, &cpf());
        let peak = analytic[25];
        for (lhs, rhs) in shape.iter().zip(&analytic) {
            assert!((lhs - rhs).abs() / peak < 1.0e-4);
        }
    }

    #[test]
    fn speed_dependent_and_hard_collision_reductions_match_voigt() {
        let grid = linear_grid(-0.05, 0.05, 21).expect("grid");
        let reference = voigt(2350.0, 0.002, 0.07, 0.0, &grid, 0.0, 1.0, &cpf());
        let zero = Complex64::new(0.0, 0.0);
        let candidates = [
            sd_voigt(2350.0, 0.002, 0.07, 0.0, 0.0, 0.0, &grid, 0.0, 1.0, &cpf()),
            rautian(2350.0, 0.002, 0.07, 0.0, zero, &grid, 0.0, 1.0, &cpf()),
            ht(2350.0, 0.002, 0.07, 0.0, 0.0, 0.0, zero, zero, &grid, 0.0, 1.0, &cpf()),
        ];
        for candidate in candidates {
            assert_eq!(candidate, reference);
        }
    }

    #[test]
    fn profiles_integrate_to_line_intensity() {
        let grid = linear_grid(-10.0, 10.0, 20_001).expect("grid");
        let sw = 3.0;
        let shapes = [
            ("doppler", doppler(0.0, 0.01, &grid, sw)),
            ("voigt", voigt(0.0, 0.01, 0.01, 0.0, &grid, 0.0, sw, &cpf())),
            (
                "sdvoigt",
                sd_voigt(0.0, 0.01, 0.01, 0.001, 0.0, 0.0, &grid, 0.0, sw, &cpf()),
            ),
            (
                "rautian",
                rautian(
                    0.0,
                    0.01,
                    0.01,
                    0.0,
                    Complex64::new(0.005, 0.0),
                    &grid,
                    0.0,
                    sw,
                    &cpf(),
                ),
            ),
        ];
        for (label, values) in shapes {
            let area = trapezoid(&grid, &values).expect("area") / sw;
            assert!((area - 1.0).abs() < 0.02, "{label}: area {area}");
        }
    }
}
