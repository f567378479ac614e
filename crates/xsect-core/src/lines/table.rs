//! Columnar line storage and the accessor trait the synthesis loop reads.

use crate::domain::XsectError;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

pub const MOLECULE_COLUMN: &str = "molec_id";
pub const ISOTOPOLOGUE_COLUMN: &str = "local_iso_id";
pub const CENTER_COLUMN: &str = "nu";
pub const INTENSITY_COLUMN: &str = "sw";
pub const LOWER_ENERGY_COLUMN: &str = "elower";

#[derive(Debug, thiserror::Error)]
pub enum LineTableError {
    #[error("line table '{table}' has duplicate column '{column}'")]
    DuplicateColumn { table: String, column: String },
    #[error("column '{column}' of line table '{table}' has {actual} rows, expected {expected}")]
    LengthMismatch {
        table: String,
        column: String,
        expected: usize,
        actual: usize,
    },
    #[error("line table '{table}' lacks mandatory column '{column}'")]
    MissingColumn { table: String, column: &'static str },
    #[error("line table '{table}' row {row} has no value in mandatory column '{column}'")]
    MissingValue {
        table: String,
        row: usize,
        column: &'static str,
    },
    #[error("failed to read line table '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse line table '{origin}': {source}")]
    Parse {
        origin: String,
        source: serde_json::Error,
    },
}

impl From<LineTableError> for XsectError {
    fn from(error: LineTableError) -> Self {
        let message = error.to_string();
        match error {
            LineTableError::Read { .. } => Self::io_system("IO.TABLE", message),
            _ => Self::input_validation("INPUT.TABLE", message),
        }
    }
}

/// A field lookup result distinguishing absent columns from missing data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue {
    Absent,
    Missing,
    Present(f64),
}

/// Read-only access to one table of line records.
///
/// Column names are matched case-insensitively.
pub trait LineSource: Send + Sync {
    fn name(&self) -> &str;

    fn row_count(&self) -> usize;

    fn column_names(&self) -> Vec<String>;

    fn column_index(&self, column: &str) -> Option<usize>;

    /// `None` marks missing data in a present column.
    fn value(&self, column: usize, row: usize) -> Option<f64>;

    fn field(&self, column: &str, row: usize) -> FieldValue {
        match self.column_index(column) {
            None => FieldValue::Absent,
            Some(index) => self
                .value(index, row)
                .map_or(FieldValue::Missing, FieldValue::Present),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Column {
    name: String,
    values: Vec<Option<f64>>,
}

/// In-memory struct-of-arrays line table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LineTable {
    name: String,
    row_count: usize,
    columns: Vec<Column>,
    index: HashMap<String, usize>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LineTableDocument {
    name: String,
    columns: BTreeMap<String, Vec<Option<f64>>>,
}

impl LineTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Adds a column; non-finite entries are stored as missing.
    pub fn with_column(
        mut self,
        name: impl Into<String>,
        values: Vec<Option<f64>>,
    ) -> Result<Self, LineTableError> {
        let name = name.into();
        let key = name.to_ascii_lowercase();
        if self.index.contains_key(&key) {
            return Err(LineTableError::DuplicateColumn {
                table: self.name,
                column: name,
            });
        }
        if !self.columns.is_empty() && values.len() != self.row_count {
            return Err(LineTableError::LengthMismatch {
                table: self.name,
                column: name,
                expected: self.row_count,
                actual: values.len(),
            });
        }

        self.row_count = values.len();
        let values = values
            .into_iter()
            .map(|value| value.filter(|value| value.is_finite()))
            .collect();
        self.index.insert(key, self.columns.len());
        self.columns.push(Column { name, values });
        Ok(self)
    }

    pub fn with_values(
        self,
        name: impl Into<String>,
        values: &[f64],
    ) -> Result<Self, LineTableError> {
        self.with_column(name, values.iter().copied().map(Some).collect())
    }

    /// Parses `{"name": ..., "columns": {"nu": [..], "gamma_air": [.., null]}}`.
    pub fn from_json_str(source: &str, origin: &str) -> Result<Self, LineTableError> {
        let document: LineTableDocument =
            serde_json::from_str(source).map_err(|source| LineTableError::Parse {
                origin: origin.to_string(),
                source,
            })?;

        document
            .columns
            .into_iter()
            .try_fold(Self::new(document.name), |table, (column, values)| {
                table.with_column(column, values)
            })
    }

    pub fn from_json_path(path: impl AsRef<Path>) -> Result<Self, LineTableError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| LineTableError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&source, &path.display().to_string())
    }
}

impl LineSource for LineTable {
    fn name(&self) -> &str {
        &self.name
    }

    fn row_count(&self) -> usize {
        self.row_count
    }

    fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|column| column.name.clone()).collect()
    }

    fn column_index(&self, column: &str) -> Option<usize> {
        if let Some(&index) = self.index.get(column) {
            return Some(index);
        }
        self.index.get(&column.to_ascii_lowercase()).copied()
    }

    fn value(&self, column: usize, row: usize) -> Option<f64> {
        self.columns
            .get(column)
            .and_then(|column| column.values.get(row).copied().flatten())
    }
}

/// Indices of the columns every line needs, resolved once per table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoreColumns {
    molecule: usize,
    isotopologue: usize,
    center: usize,
    intensity: usize,
    lower_energy: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoreFields {
    pub molecule: u32,
    pub isotopologue: u32,
    pub nu: f64,
    pub sw: f64,
    pub elower: f64,
}

impl CoreColumns {
    pub fn resolve(source: &dyn LineSource) -> Result<Self, LineTableError> {
        let lookup = |column: &'static str| {
            source
                .column_index(column)
                .ok_or_else(|| LineTableError::MissingColumn {
                    table: source.name().to_string(),
                    column,
                })
        };
        Ok(Self {
            molecule: lookup(MOLECULE_COLUMN)?,
            isotopologue: lookup(ISOTOPOLOGUE_COLUMN)?,
            center: lookup(CENTER_COLUMN)?,
            intensity: lookup(INTENSITY_COLUMN)?,
            lower_energy: lookup(LOWER_ENERGY_COLUMN)?,
        })
    }

    pub fn read(&self, source: &dyn LineSource, row: usize) -> Result<CoreFields, LineTableError> {
        let read = |index: usize, column: &'static str| {
            source
                .value(index, row)
                .ok_or_else(|| LineTableError::MissingValue {
                    table: source.name().to_string(),
                    row,
                    column,
                })
        };
        Ok(CoreFields {
            molecule: read(self.molecule, MOLECULE_COLUMN)? as u32,
            isotopologue: read(self.isotopologue, ISOTOPOLOGUE_COLUMN)? as u32,
            nu: read(self.center, CENTER_COLUMN)?,
            sw: read(self.intensity, INTENSITY_COLUMN)?,
            elower: read(self.lower_energy, LOWER_ENERGY_COLUMN)?,
        })
    }

    /// Center wavenumber only, for range defaults.
    pub fn center(&self, source: &dyn LineSource, row: usize) -> Option<f64> {
        source.value(self.center, row)
    }

    pub fn species(&self, source: &dyn LineSource, row: usize) -> Option<(u32, u32)> {
        let molecule = source.value(self.molecule, row)?;
        let isotopologue = source.value(self.isotopologue, row)?;
        Some((molecule as u32, isotopologue as u32))
    }
}

#[cfg(test)]
mod tests {
    use super::{CoreColumns, FieldValue, LineSource, LineTable, LineTableError};

    fn sample() -> LineTable {
        LineTable::new("co2")
            .with_values("molec_id", &[2.0, 2.0])
            .and_then(|table| table.with_values("local_iso_id", &[1.0, 1.0]))
            .and_then(|table| table.with_values("nu", &[2350.0, 2351.0]))
            .and_then(|table| table.with_values("sw", &[1.0e-20, 2.0e-20]))
            .and_then(|table| table.with_values("elower", &[0.0, 10.0]))
            .and_then(|table| table.with_column("gamma_air", vec![Some(0.07), None]))
            .expect("sample table")
    }

    #[test]
    fn field_distinguishes_absent_missing_and_present() {
        let table = sample();
        assert_eq!(table.field("gamma_air", 0), FieldValue::Present(0.07));
        assert_eq!(table.field("GAMMA_AIR", 0), FieldValue::Present(0.07));
        assert_eq!(table.field("gamma_air", 1), FieldValue::Missing);
        assert_eq!(table.field("gamma_self", 0), FieldValue::Absent);
        assert_eq!(table.row_count(), 2);
    }

    #[test]
    fn non_finite_values_are_missing_markers() {
        let table = LineTable::new("t")
            .with_values("x", &[f64::NAN, 1.0])
            .expect("table");
        assert_eq!(table.field("x", 0), FieldValue::Missing);
    }

    #[test]
    fn rejects_ragged_and_duplicate_columns() {
        let error = sample()
            .with_values("n_air", &[0.7])
            .expect_err("ragged column");
        assert!(matches!(error, LineTableError::LengthMismatch { expected: 2, actual: 1, .. }));

        let error = sample()
            .with_values("NU", &[1.0, 2.0])
            .expect_err("duplicate column");
        assert!(matches!(error, LineTableError::DuplicateColumn { .. }));
    }

    #[test]
    fn core_columns_resolve_and_read_rows() {
        let table = sample();
        let core = CoreColumns::resolve(&table).expect("core columns");
        let fields = core.read(&table, 1).expect("row");
        assert_eq!(fields.molecule, 2);
        assert_eq!(fields.nu, 2351.0);
        assert_eq!(fields.elower, 10.0);
        assert_eq!(core.species(&table, 0), Some((2, 1)));
        assert_eq!(core.center(&table, 0), Some(2350.0));

        let bare = LineTable::new("bare").with_values("nu", &[1.0]).expect("table");
        let error = CoreColumns::resolve(&bare).expect_err("missing columns");
        assert!(matches!(error, LineTableError::MissingColumn { column: "molec_id", .. }));
    }

    #[test]
    fn parses_json_document_with_nulls() {
        let source = r#"{
            "name": "demo",
            "columns": {
                "nu": [1.0, 2.0],
                "gamma_air": [0.05, null]
            }
        }"#;
        let table = LineTable::from_json_str(source, "inline").expect("table");
        assert_eq!(table.name(), "demo");
        assert_eq!(table.field("gamma_air", 1), FieldValue::Missing);

        let error = LineTable::from_json_str("{", "inline").expect_err("bad json");
        assert!(matches!(error, LineTableError::Parse { .. }));
    }
}
