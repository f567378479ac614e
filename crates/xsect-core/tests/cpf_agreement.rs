use num_complex::Complex64;
use xsect_core::numerics::cpf::{
    ComplexProbabilityFunction, CpfKind, HumlicekCpf, NaiveCpf, WeidemanCpf, evaluate_cpf,
};

/// w(z) at selected points, evaluated with arbitrary precision.
const REFERENCE: [(f64, f64, f64, f64); 8] = [
    (0.0, 0.5, 0.615_690_344_192_925_9, 0.0),
    (0.5, 0.5, 0.533_156_707_912_175, 0.230_488_231_384_458_43),
    (1.5, 0.2, 0.156_520_584_188_795_53, 0.421_075_947_361_980_8),
    (3.0, 1.0, 0.065_317_777_289_046_96, 0.173_918_315_416_348_97),
    (6.0, 0.3, 0.004_898_968_916_219_752, 0.095_139_922_037_989_47),
    (0.0, 3.0, 0.179_001_151_181_389_96, 0.0),
    (10.0, 1.0, 0.005_669_942_566_902_178, 0.056_129_645_315_951_26),
    (20.0, 0.5, 0.000_707_452_219_884_728_6, 0.028_227_120_903_787_74),
];

fn relative_error(actual: Complex64, expected: Complex64) -> f64 {
    (actual - expected).norm() / expected.norm()
}

fn check(cpf: &dyn ComplexProbabilityFunction, tolerance: f64, points: &[(f64, f64, f64, f64)]) {
    for &(x, y, re, im) in points {
        let expected = Complex64::new(re, im);
        let actual = cpf.w(Complex64::new(x, y));
        let error = relative_error(actual, expected);
        assert!(
            error <= tolerance,
            "{} at ({x}, {y}): got {actual}, expected {expected}, relative error {error:.3e}",
            cpf.name()
        );
    }
}

#[test]
fn rational_series_matches_reference_values() {
    let cpf = WeidemanCpf::new(24).expect("cpf");
    check(&cpf, 1.0e-5, &REFERENCE);
}

#[test]
fn regional_evaluator_matches_reference_values() {
    check(&HumlicekCpf, 1.0e-6, &REFERENCE);
}

#[test]
fn asymptotic_series_is_accurate_far_from_the_origin() {
    check(&NaiveCpf, 1.0e-7, &REFERENCE[6..]);
}

#[test]
fn evaluators_agree_with_each_other_along_a_scan() {
    let weideman = WeidemanCpf::new(24).expect("cpf");
    for step in 0..200 {
        let x = -10.0 + 0.1 * step as f64;
        for y in [1.0e-3, 0.1, 1.0, 5.0] {
            let z = Complex64::new(x, y);
            let lhs = weideman.w(z);
            let rhs = HumlicekCpf.w(z);
            assert!(
                relative_error(lhs, rhs) < 1.0e-4,
                "disagreement at {z}: {lhs} vs {rhs}"
            );
        }
    }
}

#[test]
fn built_strategies_serve_the_array_form() {
    let x = [0.0, 0.5, 3.0];
    let y = [0.5, 0.5, 1.0];
    for kind in [CpfKind::Humlicek, CpfKind::default()] {
        let cpf = kind.build().expect("cpf");
        let values = evaluate_cpf(cpf.as_ref(), &x, &y).expect("values");
        assert_eq!(values.len(), 3);
        assert!((values.re[0] - REFERENCE[0].2).abs() < 1.0e-5);
        assert!((values.im[2] - REFERENCE[3].3).abs() < 1.0e-5);
    }
}
