use crate::domain::{AbsorptionUnits, Component, Diluent, Environment, ExecutionMode, ProfileKind};
use crate::lines::{Parametrization, ProfileParameter};
use crate::numerics::cpf::CpfKind;
use crate::numerics::lineshape::LineShape;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

pub const DEFAULT_STEP: f64 = 0.01;
pub const DEFAULT_RELATIVE_WING: f64 = 50.0;
pub const DEFAULT_INTENSITY_THRESHOLD: f64 = 0.0;
pub const DEFAULT_BROADENING: &str = "gamma_air";

/// Cooperative cancellation flag, checked between lines.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WavenumberSpec {
    /// `range` defaults to the span of line centres across all tables.
    Uniform {
        range: Option<(f64, f64)>,
        step: f64,
    },
    /// Caller-supplied points, sorted before use.
    Explicit(Vec<f64>),
}

impl Default for WavenumberSpec {
    fn default() -> Self {
        Self::Uniform {
            range: None,
            step: DEFAULT_STEP,
        }
    }
}

/// Configuration of one absorption-coefficient calculation.
#[derive(Debug, Clone)]
pub struct SynthesisRequest {
    /// Empty means every isotopologue found in the tables, at natural abundance.
    pub components: Vec<Component>,
    pub environment: Environment,
    /// Empty means derive from `broadening_default`.
    pub diluent: Diluent,
    pub broadening_default: String,
    pub wavenumbers: WavenumberSpec,
    pub absolute_wing: f64,
    pub relative_wing: f64,
    pub intensity_threshold: f64,
    pub units: AbsorptionUnits,
    pub line_shift: bool,
    pub line_mixing: bool,
    pub exclude: BTreeSet<ProfileParameter>,
    pub line_shape: Option<LineShape>,
    pub parametrization: Option<Parametrization>,
    pub cpf: CpfKind,
    pub suppress_line_errors: bool,
    pub capture_trace: bool,
    pub execution: ExecutionMode,
    pub cancellation: Option<CancellationToken>,
}

impl Default for SynthesisRequest {
    fn default() -> Self {
        Self {
            components: Vec::new(),
            environment: Environment::default(),
            diluent: Diluent::default(),
            broadening_default: DEFAULT_BROADENING.to_string(),
            wavenumbers: WavenumberSpec::default(),
            absolute_wing: 0.0,
            relative_wing: DEFAULT_RELATIVE_WING,
            intensity_threshold: DEFAULT_INTENSITY_THRESHOLD,
            units: AbsorptionUnits::default(),
            line_shift: true,
            line_mixing: false,
            exclude: BTreeSet::new(),
            line_shape: None,
            parametrization: None,
            cpf: CpfKind::default(),
            suppress_line_errors: false,
            capture_trace: false,
            execution: ExecutionMode::default(),
            cancellation: None,
        }
    }
}

impl SynthesisRequest {
    /// A request with the shape and parametrization of a named profile.
    pub fn for_profile(kind: ProfileKind) -> Self {
        Self::default().with_profile(kind)
    }

    pub fn with_profile(mut self, kind: ProfileKind) -> Self {
        self.line_shape = Some(kind.line_shape());
        self.parametrization = Some(kind.parametrization());
        self
    }

    pub fn with_line_shape(mut self, line_shape: LineShape) -> Self {
        self.line_shape = Some(line_shape);
        self
    }

    pub fn with_parametrization(mut self, parametrization: Parametrization) -> Self {
        self.parametrization = Some(parametrization);
        self
    }

    pub fn with_components(mut self, components: impl IntoIterator<Item = Component>) -> Self {
        self.components = components.into_iter().collect();
        self
    }

    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    pub fn with_diluent(mut self, diluent: Diluent) -> Self {
        self.diluent = diluent;
        self
    }

    pub fn with_broadening_default(mut self, gamma_l: impl Into<String>) -> Self {
        self.broadening_default = gamma_l.into();
        self
    }

    pub fn with_range(mut self, lower: f64, upper: f64, step: f64) -> Self {
        self.wavenumbers = WavenumberSpec::Uniform {
            range: Some((lower, upper)),
            step,
        };
        self
    }

    pub fn with_step(mut self, step: f64) -> Self {
        self.wavenumbers = match self.wavenumbers {
            WavenumberSpec::Uniform { range, .. } => WavenumberSpec::Uniform { range, step },
            WavenumberSpec::Explicit(_) => WavenumberSpec::Uniform { range: None, step },
        };
        self
    }

    pub fn with_grid(mut self, grid: Vec<f64>) -> Self {
        self.wavenumbers = WavenumberSpec::Explicit(grid);
        self
    }

    pub fn with_wing(mut self, absolute: f64, half_widths: f64) -> Self {
        self.absolute_wing = absolute;
        self.relative_wing = half_widths;
        self
    }

    pub fn with_intensity_threshold(mut self, threshold: f64) -> Self {
        self.intensity_threshold = threshold;
        self
    }

    pub fn with_units(mut self, units: AbsorptionUnits) -> Self {
        self.units = units;
        self
    }

    pub fn with_line_shift(mut self, enabled: bool) -> Self {
        self.line_shift = enabled;
        self
    }

    pub fn with_line_mixing(mut self, enabled: bool) -> Self {
        self.line_mixing = enabled;
        self
    }

    pub fn with_excluded(mut self, parameter: ProfileParameter) -> Self {
        self.exclude.insert(parameter);
        self
    }

    pub fn with_cpf(mut self, cpf: CpfKind) -> Self {
        self.cpf = cpf;
        self
    }

    pub fn with_suppressed_line_errors(mut self, suppress: bool) -> Self {
        self.suppress_line_errors = suppress;
        self
    }

    pub fn with_trace(mut self, capture: bool) -> Self {
        self.capture_trace = capture;
        self
    }

    pub fn with_execution(mut self, execution: ExecutionMode) -> Self {
        self.execution = execution;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Requested exclusions plus those implied by the shift and mixing switches.
    pub fn effective_exclusions(&self) -> BTreeSet<ProfileParameter> {
        let mut exclude = self.exclude.clone();
        if !self.line_mixing {
            exclude.insert(ProfileParameter::YRosen);
        }
        if !self.line_shift {
            exclude.insert(ProfileParameter::Delta0);
            exclude.insert(ProfileParameter::Delta2);
        }
        exclude
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }
}
