pub mod catalog;
pub mod config;
pub mod constants;

pub use catalog::{
    BuiltinCatalog, CatalogError, IsotopologueCatalog, IsotopologueInfo, PartitionFunction,
    TabulatedPartitionFunction,
};
pub use config::{ConfigError, RunConfig, load_run_config};
