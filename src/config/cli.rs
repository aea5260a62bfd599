use crate::config::paths::{validate_output, validate_source, PipelinePaths};
use crate::config::toml_config::TomlConfig;
use crate::utils::error::Result;
use crate::utils::validation::{validate_distinct_paths, validate_path, Validate};
use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Clone, Parser)]
#[command(name = "loan-etl")]
#[command(about = "Cleans a loan portfolio CSV into customer and loan tables")]
pub struct CliConfig {
    /// TOML file with pipeline paths (used by `run`)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Directory relative paths are resolved against
    #[arg(long, global = true, default_value = ".")]
    pub base_dir: String,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log CPU and memory usage after each stage")]
    pub monitor: bool,

    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Compact,
    Json,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Run all stages in order: retrieve, clean, transform, load, check
    Run(RunArgs),
    /// Copy the source dataset to the working location
    Retrieve {
        #[arg(long)]
        input: String,
        #[arg(long)]
        output: String,
    },
    /// Drop empty rows and unknown loan amounts, repair credit scores
    Clean {
        #[arg(long)]
        input: String,
        #[arg(long)]
        output: String,
    },
    /// Split the cleaned table into customer and loan tables
    Transform {
        #[arg(long)]
        input: String,
        #[arg(long)]
        customer_output: String,
        #[arg(long)]
        loan_output: String,
    },
    /// Copy customer and loan tables to their final locations
    Load {
        #[arg(long)]
        customer_input: String,
        #[arg(long)]
        loan_input: String,
        #[arg(long)]
        customer_output: String,
        #[arg(long)]
        loan_output: String,
    },
    /// Fail when the loan table repeats a Loan ID
    Check {
        #[arg(long)]
        input: String,
    },
}

#[derive(Debug, Clone, Default, Args)]
pub struct RunArgs {
    /// Source dataset path or http(s) URL
    #[arg(long)]
    pub source: Option<String>,

    /// Directory for intermediate tables
    #[arg(long)]
    pub work_dir: Option<String>,

    /// Directory for the final customer and loan tables
    #[arg(long)]
    pub output_dir: Option<String>,

    /// Write a JSON run report to this path
    #[arg(long)]
    pub report: Option<String>,

    /// Show what would run without touching any file
    #[arg(long)]
    pub dry_run: bool,
}

impl CliConfig {
    pub fn load_toml(&self) -> Result<Option<TomlConfig>> {
        self.config.as_ref().map(TomlConfig::from_file).transpose()
    }

    /// Paths for `run`: defaults, then the TOML file, then command-line flags.
    pub fn run_paths(args: &RunArgs, toml: Option<&TomlConfig>) -> PipelinePaths {
        let mut paths = toml.map(TomlConfig::pipeline_paths).unwrap_or_default();

        if let Some(source) = &args.source {
            paths = paths.with_source(source.clone());
        }
        if let Some(dir) = &args.work_dir {
            paths = paths.in_work_dir(dir);
        }
        if let Some(dir) = &args.output_dir {
            paths = paths.in_output_dir(dir);
        }
        paths
    }

    pub fn monitoring_enabled(&self, toml: Option<&TomlConfig>) -> bool {
        self.monitor || toml.map(TomlConfig::monitoring_enabled).unwrap_or(false)
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        match &self.command {
            Command::Run(args) => {
                if let Some(report) = &args.report {
                    validate_path("report", report)?;
                }
                Ok(())
            }
            Command::Retrieve { input, output } | Command::Clean { input, output } => {
                validate_source("input", input.as_str())?;
                validate_output("output", output.as_str())?;
                validate_distinct_paths(&[("input", input.as_str()), ("output", output.as_str())])
            }
            Command::Transform {
                input,
                customer_output,
                loan_output,
            } => {
                validate_path("input", input.as_str())?;
                validate_output("customer_output", customer_output.as_str())?;
                validate_output("loan_output", loan_output.as_str())?;
                validate_distinct_paths(&[
                    ("input", input.as_str()),
                    ("customer_output", customer_output.as_str()),
                    ("loan_output", loan_output.as_str()),
                ])
            }
            Command::Load {
                customer_input,
                loan_input,
                customer_output,
                loan_output,
            } => {
                validate_path("customer_input", customer_input.as_str())?;
                validate_path("loan_input", loan_input.as_str())?;
                validate_output("customer_output", customer_output.as_str())?;
                validate_output("loan_output", loan_output.as_str())?;
                validate_distinct_paths(&[
                    ("customer_input", customer_input.as_str()),
                    ("loan_input", loan_input.as_str()),
                    ("customer_output", customer_output.as_str()),
                    ("loan_output", loan_output.as_str()),
                ])
            }
            Command::Check { input } => validate_path("input", input.as_str()),
        }
    }
}
