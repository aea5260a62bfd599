#[cfg(feature = "cli")]
pub mod cli;
pub mod paths;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::{CliConfig, Command, LogFormat, RunArgs};
pub use paths::PipelinePaths;
pub use toml_config::TomlConfig;
