//! Isotopologue metadata and partition sums consumed by the synthesis loop.
//!
//! Both collaborators are traits so callers can plug in a full database;
//! the built-in catalog covers the principal isotopologue of HITRAN
//! molecules 1-7.

use crate::numerics::interpolate_linear;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CatalogError {
    #[error("no partition sum tabulated for molecule {molecule}, isotopologue {isotopologue}")]
    MissingPartitionSum { molecule: u32, isotopologue: u32 },
    #[error(
        "partition table for molecule {molecule}, isotopologue {isotopologue} is invalid: {reason}"
    )]
    InvalidTable {
        molecule: u32,
        isotopologue: u32,
        reason: &'static str,
    },
    #[error("partition sum at T={temperature} K must be finite and > 0, got {value}")]
    NonPositivePartitionSum { temperature: f64, value: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct IsotopologueInfo {
    pub molecule: u32,
    pub isotopologue: u32,
    pub formula: String,
    /// Terrestrial natural abundance used to scale database intensities.
    pub natural_abundance: f64,
    /// Molar mass, g/mol.
    pub molar_mass: f64,
}

pub trait IsotopologueCatalog: Send + Sync {
    fn isotopologue(&self, molecule: u32, isotopologue: u32) -> Option<IsotopologueInfo>;
}

/// Total internal partition sum Q(T).
pub trait PartitionFunction: Send + Sync {
    fn partition_sum(
        &self,
        molecule: u32,
        isotopologue: u32,
        temperature: f64,
    ) -> Result<f64, CatalogError>;
}

impl<F> PartitionFunction for F
where
    F: Fn(u32, u32, f64) -> f64 + Send + Sync,
{
    fn partition_sum(
        &self,
        molecule: u32,
        isotopologue: u32,
        temperature: f64,
    ) -> Result<f64, CatalogError> {
        Ok(self(molecule, isotopologue, temperature))
    }
}

const BUILTIN_ISOTOPOLOGUES: [(u32, u32, &str, f64, f64); 7] = [
    (1, 1, "H2(16O)", 0.997_317, 18.010_565),
    (2, 1, "(12C)(16O)2", 0.984_204, 43.989_83),
    (3, 1, "(16O)3", 0.992_901, 47.984_745),
    (4, 1, "(14N)2(16O)", 0.990_333, 44.001_062),
    (5, 1, "(12C)(16O)", 0.986_544, 27.994_915),
    (6, 1, "(12C)H4", 0.988_274, 16.031_3),
    (7, 1, "(16O)2", 0.995_262, 31.989_83),
];

#[derive(Debug, Clone, Default)]
pub struct BuiltinCatalog {
    extra: Vec<IsotopologueInfo>,
}

impl BuiltinCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or overrides an entry; later entries win.
    pub fn with_isotopologue(mut self, info: IsotopologueInfo) -> Self {
        self.extra.retain(|existing| {
            (existing.molecule, existing.isotopologue) != (info.molecule, info.isotopologue)
        });
        self.extra.push(info);
        self
    }
}

impl IsotopologueCatalog for BuiltinCatalog {
    fn isotopologue(&self, molecule: u32, isotopologue: u32) -> Option<IsotopologueInfo> {
        if let Some(info) = self
            .extra
            .iter()
            .find(|info| info.molecule == molecule && info.isotopologue == isotopologue)
        {
            return Some(info.clone());
        }

        BUILTIN_ISOTOPOLOGUES
            .iter()
            .find(|(mol, iso, ..)| *mol == molecule && *iso == isotopologue)
            .map(
                |&(molecule, isotopologue, formula, natural_abundance, molar_mass)| {
                    IsotopologueInfo {
                        molecule,
                        isotopologue,
                        formula: formula.to_string(),
                        natural_abundance,
                        molar_mass,
                    }
                },
            )
    }
}

#[derive(Debug, Clone, PartialEq)]
struct PartitionTable {
    temperatures: Vec<f64>,
    sums: Vec<f64>,
}

/// Q(T) tabulated on an ascending temperature grid, interpolated linearly
/// and clamped to the table ends.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TabulatedPartitionFunction {
    tables: BTreeMap<(u32, u32), PartitionTable>,
}

impl TabulatedPartitionFunction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        molecule: u32,
        isotopologue: u32,
        temperatures: Vec<f64>,
        sums: Vec<f64>,
    ) -> Result<(), CatalogError> {
        let invalid = |reason| CatalogError::InvalidTable {
            molecule,
            isotopologue,
            reason,
        };
        if temperatures.len() != sums.len() {
            return Err(invalid("temperature and sum columns differ in length"));
        }
        if temperatures.is_empty() {
            return Err(invalid("table is empty"));
        }
        if !temperatures.windows(2).all(|pair| pair[0] < pair[1]) {
            return Err(invalid("temperatures must be strictly increasing"));
        }
        if sums.iter().any(|sum| !sum.is_finite() || *sum <= 0.0) {
            return Err(invalid("partition sums must be finite and > 0"));
        }

        self.tables.insert(
            (molecule, isotopologue),
            PartitionTable {
                temperatures,
                sums,
            },
        );
        Ok(())
    }
}

impl PartitionFunction for TabulatedPartitionFunction {
    fn partition_sum(
        &self,
        molecule: u32,
        isotopologue: u32,
        temperature: f64,
    ) -> Result<f64, CatalogError> {
        let table = self.tables.get(&(molecule, isotopologue)).ok_or(
            CatalogError::MissingPartitionSum {
                molecule,
                isotopologue,
            },
        )?;
        if table.sums.len() == 1 {
            return Ok(table.sums[0]);
        }

        interpolate_linear(temperature, &table.temperatures, &table.sums).ok_or(
            CatalogError::InvalidTable {
                molecule,
                isotopologue,
                reason: "interpolation failed",
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{
        BuiltinCatalog, CatalogError, IsotopologueCatalog, IsotopologueInfo, PartitionFunction,
        TabulatedPartitionFunction,
    };

    #[test]
    fn builtin_catalog_knows_principal_co2() {
        let info = BuiltinCatalog::new()
            .isotopologue(2, 1)
            .expect("CO2 principal isotopologue");
        assert_eq!(info.natural_abundance, 0.984_204);
        assert_eq!(info.molar_mass, 43.989_83);
        assert!(BuiltinCatalog::new().isotopologue(2, 9).is_none());
    }

    #[test]
    fn custom_entries_override_builtin_ones() {
        let catalog = BuiltinCatalog::new().with_isotopologue(IsotopologueInfo {
            molecule: 2,
            isotopologue: 1,
            formula: "CO2".to_string(),
            natural_abundance: 1.0,
            molar_mass: 44.0,
        });
        let info = catalog.isotopologue(2, 1).expect("override");
        assert_eq!(info.natural_abundance, 1.0);
        assert_eq!(info.molar_mass, 44.0);
    }

    #[test]
    fn closures_act_as_partition_functions() {
        let constant = |_molecule: u32, _isotopologue: u32, _temperature: f64| 42.0;
        assert_eq!(constant.partition_sum(1, 1, 296.0), Ok(42.0));
    }

    #[test]
    fn tabulated_partition_sum_interpolates_and_clamps() {
        let mut table = TabulatedPartitionFunction::new();
        table
            .insert(2, 1, vec![200.0, 300.0], vec![200.0, 300.0])
            .expect("valid table");

        assert_eq!(table.partition_sum(2, 1, 250.0), Ok(250.0));
        assert_eq!(table.partition_sum(2, 1, 100.0), Ok(200.0));
        assert_eq!(table.partition_sum(2, 1, 500.0), Ok(300.0));
        assert_eq!(
            table.partition_sum(1, 1, 296.0),
            Err(CatalogError::MissingPartitionSum {
                molecule: 1,
                isotopologue: 1
            })
        );
    }

    #[test]
    fn tabulated_partition_sum_rejects_unsorted_temperatures() {
        let mut table = TabulatedPartitionFunction::new();
        let error = table
            .insert(1, 1, vec![300.0, 200.0], vec![1.0, 2.0])
            .expect_err("unsorted");
        assert!(matches!(error, CatalogError::InvalidTable { .. }));
    }
}
