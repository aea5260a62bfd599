use anyhow::Context;
use clap::Parser;
use loan_etl::config::{Command, LogFormat, RunArgs};
use loan_etl::core::{
    clean::clean_data, load::load_data, quality::check_for_duplicates, retrieve::retrieve_data,
    transform::transform_data, Storage,
};
use loan_etl::utils::error::ErrorSeverity;
use loan_etl::utils::{logger, validation::Validate};
use loan_etl::{CliConfig, EtlEngine, EtlError, HttpSource, LoanPipeline, LocalStorage, PipelinePaths};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    // 初始化日誌
    match config.log_format {
        LogFormat::Compact => logger::init_cli_logger(config.verbose),
        LogFormat::Json => logger::init_json_logger(config.verbose),
    }

    tracing::info!("Starting loan-etl");
    tracing::debug!("CLI config: {:?}", config);

    // 驗證配置
    if let Err(e) = config.validate() {
        fail(&e);
    }

    let storage = LocalStorage::new(config.base_dir.clone());
    let http = HttpSource::new();

    let result = match &config.command {
        Command::Run(args) => return run_pipeline(&config, args, storage).await,
        Command::Retrieve { input, output } => {
            retrieve_data(&storage, &http, input, output).await
        }
        Command::Clean { input, output } => clean_data(&storage, input, output).await,
        Command::Transform {
            input,
            customer_output,
            loan_output,
        } => transform_data(&storage, input, customer_output, loan_output).await,
        Command::Load {
            customer_input,
            loan_input,
            customer_output,
            loan_output,
        } => {
            load_data(
                &storage,
                customer_input,
                loan_input,
                customer_output,
                loan_output,
            )
            .await
        }
        Command::Check { input } => check_for_duplicates(&storage, input).await,
    };

    match result {
        Ok(output) => {
            tracing::info!(
                "✅ Stage completed: {} rows in, {} rows out",
                output.rows_in,
                output.rows_out
            );
            for path in &output.outputs {
                tracing::info!("📁 Output saved to: {}", path);
            }
            Ok(())
        }
        Err(e) => fail(&e),
    }
}

async fn run_pipeline(config: &CliConfig, args: &RunArgs, storage: LocalStorage) -> anyhow::Result<()> {
    let toml = match config.load_toml() {
        Ok(toml) => toml,
        Err(e) => {
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            fail(&e)
        }
    };

    let paths = CliConfig::run_paths(args, toml.as_ref());
    if let Err(e) = paths.validate() {
        fail(&e);
    }

    display_plan(&paths);
    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No files were read or written");
        return Ok(());
    }

    let monitor_enabled = config.monitoring_enabled(toml.as_ref());
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let pipeline = LoanPipeline::new(storage.clone(), paths);
    let name = pipeline.name().to_string();
    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled).with_name(name);

    let report = match engine.run().await {
        Ok(report) => report,
        Err(e) => fail(&e),
    };

    tracing::info!("✅ Pipeline completed successfully!");
    if let Some(report_path) = &args.report {
        let json = report.to_json()?;
        storage
            .write_file(report_path, json.as_bytes())
            .await
            .with_context(|| format!("failed to write run report to {}", report_path))?;
        tracing::info!("📝 Run report saved to: {}", report_path);
    }

    Ok(())
}

fn display_plan(paths: &PipelinePaths) {
    println!("📋 Pipeline: {}", paths.name);
    println!("  retrieve   {} -> {}", paths.source, paths.raw);
    println!("  clean      {} -> {}", paths.raw, paths.cleaned);
    println!(
        "  transform  {} -> {}, {}",
        paths.cleaned, paths.customer, paths.loan
    );
    println!(
        "  load       {}, {} -> {}, {}",
        paths.customer, paths.loan, paths.final_customer, paths.final_loan
    );
    println!("  check      {}", paths.final_loan);
    println!();
}

fn fail(e: &EtlError) -> ! {
    // 記錄詳細錯誤信息
    tracing::error!(
        "❌ Loan ETL failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    // 根據錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Medium => 2, // 來源暫時無法讀取，可重試
        ErrorSeverity::High => 1,   // 資料或配置錯誤
        ErrorSeverity::Critical => 3, // 系統錯誤
    };
    std::process::exit(exit_code);
}
