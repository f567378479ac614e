use xsect_core::common::BuiltinCatalog;
use xsect_core::domain::{AbsorptionUnits, Component, ExecutionMode, ProfileKind};
use xsect_core::lines::{
    LineSource, LineTable, ParameterStatus, PresetName, ProfileFamily, ProfileParameter,
    doppler_half_width,
};
use xsect_core::numerics::cpf::WeidemanCpf;
use xsect_core::numerics::voigt;
use xsect_core::synthesis::{
    CancellationToken, SynthesisError, SynthesisRequest, SynthesisWarning, Synthesizer,
};

const CO2_MOLAR_MASS: f64 = 43.98983;

fn unit_partition(_: u32, _: u32, _: f64) -> f64 {
    1.0
}

fn co2_table(name: &str, rows: &[(f64, f64)], extra: &[(&str, Vec<f64>)]) -> LineTable {
    let count = rows.len();
    let mut table = LineTable::new(name)
        .with_values("molec_id", &vec![2.0; count])
        .and_then(|table| table.with_values("local_iso_id", &vec![1.0; count]))
        .and_then(|table| {
            table.with_values("nu", &rows.iter().map(|row| row.0).collect::<Vec<_>>())
        })
        .and_then(|table| {
            table.with_values("sw", &rows.iter().map(|row| row.1).collect::<Vec<_>>())
        })
        .and_then(|table| table.with_values("elower", &vec![0.0; count]))
        .expect("core columns");
    for (column, values) in extra {
        table = table.with_values(*column, values).expect("extra column");
    }
    table
}

fn air_broadened(name: &str, rows: &[(f64, f64)], gamma: f64) -> LineTable {
    let count = rows.len();
    co2_table(
        name,
        rows,
        &[("gamma_air", vec![gamma; count]), ("n_air", vec![0.7; count])],
    )
}

/// Linear interpolation of the half-maximum crossings around the peak.
fn full_width_at_half_maximum(grid: &[f64], values: &[f64]) -> f64 {
    let (peak_index, peak) = values
        .iter()
        .copied()
        .enumerate()
        .fold((0, f64::MIN), |best, (index, value)| {
            if value > best.1 { (index, value) } else { best }
        });
    let half = 0.5 * peak;
    let crossing = |inner: usize, outer: usize| {
        let t = (values[inner] - half) / (values[inner] - values[outer]);
        grid[inner] + t * (grid[outer] - grid[inner])
    };

    let mut right = peak_index;
    while values[right + 1] > half {
        right += 1;
    }
    let mut left = peak_index;
    while values[left - 1] > half {
        left -= 1;
    }
    crossing(right, right + 1) - crossing(left, left - 1)
}

#[test]
fn single_co2_voigt_line_has_the_expected_width() {
    let catalog = BuiltinCatalog::new();
    let synthesizer = Synthesizer::new(&catalog, &unit_partition);
    let table = air_broadened("co2", &[(2350.0, 1.0e-20)], 0.07);
    let request =
        SynthesisRequest::for_profile(ProfileKind::Voigt).with_range(2349.0, 2351.0, 0.001);

    let spectrum = synthesizer.run(&request, &[&table]).expect("spectrum");
    assert_eq!(spectrum.wavenumbers.len(), 2001);
    assert_eq!(spectrum.lines_used, 1);
    assert_eq!(spectrum.units, AbsorptionUnits::CrossSection);
    assert!(spectrum.warnings.is_empty());

    let values = &spectrum.coefficient;
    let peak = values[1000];
    for offset in 1..1000 {
        let asymmetry = (values[1000 - offset] - values[1000 + offset]).abs() / peak;
        assert!(asymmetry < 1.0e-6, "asymmetric at offset {offset}");
    }

    let lorentz_width = 2.0 * 0.07;
    let gauss_width = 2.0 * doppler_half_width(2350.0, 296.0, CO2_MOLAR_MASS);
    let olivero = 0.5346 * lorentz_width
        + (0.2166 * lorentz_width * lorentz_width + gauss_width * gauss_width).sqrt();
    let measured = full_width_at_half_maximum(&spectrum.wavenumbers, values);
    assert!(
        (measured - olivero).abs() / olivero < 0.01,
        "measured {measured}, olivero {olivero}"
    );
}

#[test]
fn contributions_vanish_outside_the_wing() {
    let catalog = BuiltinCatalog::new();
    let synthesizer = Synthesizer::new(&catalog, &unit_partition);
    let table = air_broadened("co2", &[(1000.0, 1.0e-20)], 0.05);
    let request = SynthesisRequest::for_profile(ProfileKind::Voigt)
        .with_range(999.0, 1001.0, 0.01)
        .with_wing(0.5, 0.0);

    let spectrum = synthesizer.run(&request, &[&table]).expect("spectrum");
    let cpf = WeidemanCpf::new(24).expect("cpf");
    let gamma_d = doppler_half_width(1000.0, 296.0, CO2_MOLAR_MASS);

    let inside: Vec<usize> = spectrum
        .wavenumbers
        .iter()
        .enumerate()
        .filter(|(_, nu)| (**nu - 1000.0).abs() < 0.499)
        .map(|(index, _)| index)
        .collect();
    let window: Vec<f64> = inside.iter().map(|&index| spectrum.wavenumbers[index]).collect();
    let expected = voigt(1000.0, gamma_d, 0.05, 0.0, &window, 0.0, 1.0e-20, &cpf);

    for (nu, value) in spectrum.wavenumbers.iter().zip(&spectrum.coefficient) {
        if (nu - 1000.0).abs() > 0.501 {
            assert_eq!(*value, 0.0, "non-zero outside the wing at {nu}");
        }
    }
    for (&index, expected) in inside.iter().zip(&expected) {
        let actual = spectrum.coefficient[index];
        assert!((actual - expected).abs() <= 1.0e-12 * expected.abs());
    }
}

#[test]
fn lines_at_or_beyond_the_grid_edges_are_harmless() {
    let catalog = BuiltinCatalog::new();
    let synthesizer = Synthesizer::new(&catalog, &unit_partition);
    let table = air_broadened(
        "edges",
        &[(999.0, 1.0e-20), (1001.0, 1.0e-20), (1010.0, 1.0e-20)],
        0.05,
    );
    let request = SynthesisRequest::for_profile(ProfileKind::Voigt)
        .with_range(999.0, 1001.0, 0.01)
        .with_wing(1.0, 0.0);

    let spectrum = synthesizer.run(&request, &[&table]).expect("spectrum");
    assert_eq!(spectrum.lines_used, 3);
    assert!(spectrum.coefficient.iter().all(|value| value.is_finite()));
    assert!(spectrum.coefficient[0] > 0.0);
    assert!(spectrum.coefficient[spectrum.coefficient.len() - 1] > 0.0);
}

fn dense_table() -> LineTable {
    let rows: Vec<(f64, f64)> = (0..700)
        .map(|index| {
            let nu = 999.0 + 2.0 * ((index * 37) % 700) as f64 / 700.0;
            let sw = 1.0e-21 * (1.0 + (index % 13) as f64);
            (nu, sw)
        })
        .collect();
    let gammas: Vec<f64> = (0..700).map(|index| 0.01 + 0.0001 * (index % 29) as f64).collect();
    co2_table(
        "dense",
        &rows,
        &[("gamma_air", gammas), ("n_air", vec![0.75; 700])],
    )
}

#[test]
fn repeated_runs_are_bit_identical() {
    let catalog = BuiltinCatalog::new();
    let synthesizer = Synthesizer::new(&catalog, &unit_partition);
    let table = dense_table();
    for execution in [ExecutionMode::Serial, ExecutionMode::Parallel] {
        let request = SynthesisRequest::for_profile(ProfileKind::Voigt)
            .with_range(999.0, 1001.0, 0.002)
            .with_execution(execution);
        let first = synthesizer.run(&request, &[&table]).expect("first");
        let second = synthesizer.run(&request, &[&table]).expect("second");
        assert_eq!(first.coefficient, second.coefficient, "{execution:?}");
    }
}

#[test]
fn parallel_run_matches_serial_run() {
    let catalog = BuiltinCatalog::new();
    let synthesizer = Synthesizer::new(&catalog, &unit_partition);
    let table = dense_table();
    let request =
        SynthesisRequest::for_profile(ProfileKind::Voigt).with_range(999.0, 1001.0, 0.002);

    let serial = synthesizer.run(&request, &[&table]).expect("serial");
    let parallel = synthesizer
        .run(&request.clone().with_execution(ExecutionMode::Parallel), &[&table])
        .expect("parallel");

    assert_eq!(serial.lines_used, parallel.lines_used);
    let scale = serial.coefficient.iter().copied().fold(0.0, f64::max);
    for (lhs, rhs) in serial.coefficient.iter().zip(&parallel.coefficient) {
        assert!((lhs - rhs).abs() <= 1.0e-12 * scale);
    }
}

#[test]
fn cancelled_run_returns_no_spectrum() {
    let catalog = BuiltinCatalog::new();
    let synthesizer = Synthesizer::new(&catalog, &unit_partition);
    let table = dense_table();
    let token = CancellationToken::new();
    token.cancel();

    for execution in [ExecutionMode::Serial, ExecutionMode::Parallel] {
        let request = SynthesisRequest::for_profile(ProfileKind::Voigt)
            .with_range(999.0, 1001.0, 0.01)
            .with_execution(execution)
            .with_cancellation(token.clone());
        let result = synthesizer.run(&request, &[&table]);
        assert!(matches!(result, Err(SynthesisError::Cancelled)));
    }
}

#[test]
fn broken_lines_fail_the_run_unless_suppressed() {
    let catalog = BuiltinCatalog::new();
    let synthesizer = Synthesizer::new(&catalog, &unit_partition);
    let table = co2_table(
        "broken",
        &[(1000.0, 1.0e-20), (1000.5, 1.0e-20)],
        &[
            ("gamma_air", vec![0.05, f64::NAN]),
            ("n_air", vec![0.7, 0.7]),
        ],
    );
    let request =
        SynthesisRequest::for_profile(ProfileKind::Voigt).with_range(999.0, 1001.0, 0.01);

    match synthesizer.run(&request, &[&table]) {
        Err(SynthesisError::Line { table, row, .. }) => {
            assert_eq!(table, "broken");
            assert_eq!(row, 1);
        }
        other => panic!("expected a line error, got {other:?}"),
    }

    let spectrum = synthesizer
        .run(&request.with_suppressed_line_errors(true), &[&table])
        .expect("spectrum");
    assert_eq!(spectrum.lines_used, 1);
    assert_eq!(spectrum.lines_skipped, 1);
    assert!(matches!(
        spectrum.warnings.as_slice(),
        [SynthesisWarning::LineSkipped { row: 1, .. }]
    ));
}

#[test]
fn priority_ladder_prefers_hartmann_tran_columns() {
    let catalog = BuiltinCatalog::new();
    let synthesizer = Synthesizer::new(&catalog, &unit_partition);
    let rows = [(1000.0, 1.0e-20), (1000.5, 1.0e-20)];
    let table = co2_table(
        "mixed",
        &rows,
        &[
            ("gamma_air", vec![0.07, 0.07]),
            ("n_air", vec![0.7, 0.7]),
            ("gamma_HT_0_air_296", vec![0.06, f64::NAN]),
        ],
    );
    let request = SynthesisRequest::for_profile(ProfileKind::Priority)
        .with_range(999.0, 1001.0, 0.01)
        .with_trace(true);

    let spectrum = synthesizer.run(&request, &[&table]).expect("spectrum");
    assert_eq!(spectrum.traces.len(), 2);

    let gamma0 = |row: usize| {
        spectrum.traces[row]
            .parameters
            .iter()
            .find(|trace| trace.parameter == ProfileParameter::Gamma0)
            .cloned()
            .expect("gamma0 trace")
    };
    let first = gamma0(0);
    assert_eq!(first.status, ParameterStatus::Ok);
    assert!((first.value - 0.06).abs() < 1.0e-12);
    assert_eq!(first.mixture[0].family, ProfileFamily::Ht);
    assert_eq!(first.mixture[0].preset, PresetName::Multitemp);

    let second = gamma0(1);
    assert!((second.value - 0.07).abs() < 1.0e-12);
    assert_eq!(second.mixture[0].family, ProfileFamily::Voigt);
}

#[test]
fn components_scale_by_abundance_and_filter_species() {
    let catalog = BuiltinCatalog::new();
    let synthesizer = Synthesizer::new(&catalog, &unit_partition);
    let table = air_broadened("co2", &[(1000.0, 1.0e-20)], 0.05);
    let base =
        SynthesisRequest::for_profile(ProfileKind::Voigt).with_range(999.0, 1001.0, 0.01);

    let natural = synthesizer.run(&base, &[&table]).expect("natural");
    let mut half = Component::new(2, 1);
    half.abundance = Some(0.5 * 0.984_204);
    let scaled = synthesizer
        .run(&base.clone().with_components([half]), &[&table])
        .expect("scaled");
    for (lhs, rhs) in natural.coefficient.iter().zip(&scaled.coefficient) {
        assert!((0.5 * lhs - rhs).abs() <= 1.0e-12 * lhs.abs().max(1.0e-300));
    }

    let other = synthesizer
        .run(&base.clone().with_components([Component::new(1, 1)]), &[&table])
        .expect("other species");
    assert_eq!(other.lines_used, 0);
    assert!(other.coefficient.iter().all(|value| *value == 0.0));

    let unknown = synthesizer.run(&base.with_components([Component::new(2, 42)]), &[&table]);
    assert!(matches!(
        unknown,
        Err(SynthesisError::UnknownIsotopologue {
            molecule: 2,
            isotopologue: 42
        })
    ));
}

#[test]
fn coefficient_units_scale_by_number_density() {
    let catalog = BuiltinCatalog::new();
    let synthesizer = Synthesizer::new(&catalog, &unit_partition);
    let table = air_broadened("co2", &[(1000.0, 1.0e-20)], 0.05);
    let base =
        SynthesisRequest::for_profile(ProfileKind::Voigt).with_range(999.0, 1001.0, 0.01);

    let cross_section = synthesizer.run(&base, &[&table]).expect("cross section");
    let coefficient = synthesizer
        .run(&base.with_units(AbsorptionUnits::Coefficient), &[&table])
        .expect("coefficient");
    let ratio = coefficient.coefficient[100] / cross_section.coefficient[100];
    assert!((ratio - 2.479_37e19).abs() / 2.479_37e19 < 1.0e-4);
}

#[test]
fn tables_are_accepted_through_the_source_trait() {
    let catalog = BuiltinCatalog::new();
    let synthesizer = Synthesizer::new(&catalog, &unit_partition);
    let first = air_broadened("a", &[(1000.0, 1.0e-20)], 0.05);
    let second = air_broadened("b", &[(1000.2, 1.0e-20)], 0.05);
    let sources: [&dyn LineSource; 2] = [&first, &second];
    let request = SynthesisRequest::for_profile(ProfileKind::Lorentz);

    let spectrum = synthesizer.run(&request, &sources).expect("spectrum");
    assert_eq!(spectrum.lines_used, 2);
    assert!((spectrum.wavenumbers[0] - 1000.0).abs() < 1.0e-12);
    assert!((spectrum.wavenumbers[spectrum.wavenumbers.len() - 1] - 1000.2).abs() < 1.0e-9);
}
