pub mod cpf;
pub mod lineshape;

pub use cpf::{
    ComplexProbabilityFunction, CpfError, CpfKind, CpfValues, HumlicekCpf, HumlicekRegion,
    NaiveCpf, WeidemanCpf, evaluate_cpf,
};
pub use lineshape::{
    HtInput, HtShape, LineParameters, LineShape, ProfileError, doppler, ht, lorentz, pcqsdhc,
    rautian, sd_rautian, sd_voigt, voigt,
};

/// Endpoint slack of the robust range generator.
pub const ARANGE_ENDPOINT_TOLERANCE: f64 = 1.0e-10;

/// Largest grid `robust_arange` will allocate.
pub const MAX_GRID_POINTS: usize = 100_000_000;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GridError {
    #[error("grid step must be finite and > 0, got {value}")]
    InvalidStep { value: f64 },
    #[error("grid bound must be finite, got lower={lower}, upper={upper}")]
    NonFiniteBounds { lower: f64, upper: f64 },
    #[error("grid upper bound {upper} is below lower bound {lower}")]
    InvertedBounds { lower: f64, upper: f64 },
    #[error("grid value must be finite at index {index}, got {value}")]
    NonFiniteValue { index: usize, value: f64 },
    #[error("grid would hold {count:e} points, limit is {limit}")]
    TooManyPoints { count: f64, limit: usize },
    #[error("wavenumber grid is empty")]
    Empty,
}

/// `count` evenly spaced points from `start` to `end`, both inclusive.
pub fn linear_grid(start: f64, end: f64, count: usize) -> Option<Vec<f64>> {
    match count {
        0 => None,
        1 => Some(vec![start]),
        _ => {
            let step = (end - start) / ((count - 1) as f64);
            let mut grid = Vec::with_capacity(count);
            for index in 0..count {
                grid.push(start + step * (index as f64));
            }

            if let Some(last) = grid.last_mut() {
                *last = end;
            }

            Some(grid)
        }
    }
}

/// Uniform grid from `lower` with spacing `step` that reaches `upper`
/// even when `(upper - lower) / step` lands just below an integer.
pub fn robust_arange(lower: f64, upper: f64, step: f64) -> Result<Vec<f64>, GridError> {
    if !step.is_finite() || step <= 0.0 {
        return Err(GridError::InvalidStep { value: step });
    }
    if !lower.is_finite() || !upper.is_finite() {
        return Err(GridError::NonFiniteBounds { lower, upper });
    }
    if upper < lower {
        return Err(GridError::InvertedBounds { lower, upper });
    }

    let intervals = ((upper - lower) / step).floor();
    if !intervals.is_finite() || intervals + 2.0 > MAX_GRID_POINTS as f64 {
        return Err(GridError::TooManyPoints {
            count: intervals + 1.0,
            limit: MAX_GRID_POINTS,
        });
    }

    let mut count = intervals as usize + 1;
    let mut last = lower + step * ((count - 1) as f64);
    if ((upper - last) - step).abs() < ARANGE_ENDPOINT_TOLERANCE {
        last += step;
        count += 1;
    }

    linear_grid(lower, last, count).ok_or(GridError::Empty)
}

/// Copies a caller grid and sorts it ascending.
pub fn sorted_grid(values: &[f64]) -> Result<Vec<f64>, GridError> {
    if values.is_empty() {
        return Err(GridError::Empty);
    }
    if let Some((index, &value)) = values
        .iter()
        .enumerate()
        .find(|(_, value)| !value.is_finite())
    {
        return Err(GridError::NonFiniteValue { index, value });
    }

    let mut grid = values.to_vec();
    grid.sort_unstable_by(f64::total_cmp);
    Ok(grid)
}

/// Index range of grid points inside `[lower, upper]`, with bisect-right
/// semantics at both ends. Always in bounds, possibly empty.
pub fn window_bounds(grid: &[f64], lower: f64, upper: f64) -> (usize, usize) {
    let start = grid.partition_point(|&value| value <= lower);
    let end = grid.partition_point(|&value| value <= upper);
    (start, end.max(start))
}

/// Largest spacing between neighbouring grid points, `None` for fewer than two.
pub fn max_spacing(grid: &[f64]) -> Option<f64> {
    grid.windows(2)
        .map(|pair| pair[1] - pair[0])
        .max_by(f64::total_cmp)
}

fn kahan_add(sum: &mut f64, correction: &mut f64, value: f64) {
    let corrected = value - *correction;
    let next = *sum + corrected;
    *correction = (next - *sum) - corrected;
    *sum = next;
}

/// Trapezoidal area under `y(x)` with compensated summation.
pub fn trapezoid(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }

    let mut sum = 0.0;
    let mut correction = 0.0;
    for index in 1..x.len() {
        let panel = 0.5 * (x[index] - x[index - 1]) * (y[index] + y[index - 1]);
        kahan_add(&mut sum, &mut correction, panel);
    }

    Some(sum)
}

pub fn interpolate_linear(x: f64, x_grid: &[f64], y_grid: &[f64]) -> Option<f64> {
    if x_grid.len() < 2 || x_grid.len() != y_grid.len() {
        return None;
    }

    if !x_grid.windows(2).all(|window| window[0] <= window[1]) {
        return None;
    }

    if x <= x_grid[0] {
        return Some(y_grid[0]);
    }

    let last_index = x_grid.len() - 1;
    if x >= x_grid[last_index] {
        return Some(y_grid[last_index]);
    }

    let upper = x_grid.partition_point(|&value| value < x);
    let lower = upper - 1;
    let x0 = x_grid[lower];
    let x1 = x_grid[upper];
    if x1 == x0 {
        return Some(y_grid[upper]);
    }

    let interpolation = (x - x0) / (x1 - x0);
    Some(y_grid[lower] + interpolation * (y_grid[upper] - y_grid[lower]))
}
