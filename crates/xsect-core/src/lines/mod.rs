//! Line data and the conversion of database columns into profile parameters.

pub mod ladder;
pub mod parameters;
pub mod presets;
pub mod table;

pub use ladder::{
    ArgumentTrace, BroadenerTrace, Candidate, LadderError, ParameterPlan, references_broadener,
};
pub use parameters::{
    CalculatedLine, LineContext, LineTrace, ParameterCalculator, ParameterStatus, ParameterTrace,
    Parametrization, ProfileParameter, doppler_half_width, line_intensity,
};
pub use presets::{
    DependenceLaw, ParameterKind, Preset, PresetName, ProfileFamily, ReferenceTemperature,
    find_preset, multitemp_reference,
};
pub use table::{CoreColumns, CoreFields, FieldValue, LineSource, LineTable, LineTableError};
