pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use crate::adapters::{HttpSource, LocalStorage};
pub use crate::config::{PipelinePaths, TomlConfig};
pub use crate::core::{
    etl::{EtlEngine, RunReport},
    pipeline::LoanPipeline,
};
pub use domain::model::{Stage, Table};
pub use utils::error::{EtlError, Result};
