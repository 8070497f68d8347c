use anyhow::Context;
use clap::Parser;
use kwab_etl::core::ConfigProvider;
use kwab_etl::utils::error::ErrorSeverity;
use kwab_etl::utils::{logger, validation::Validate};
use kwab_etl::{CliConfig, EtlEngine, KwabError, KwabPipeline, LocalStorage};

fn main() {
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(config.verbose);
    tracing::debug!("CLI config: {:?}", config);

    if let Err(e) = run(config) {
        std::process::exit(report(&e));
    }
}

fn run(config: CliConfig) -> anyhow::Result<()> {
    // 載入設定檔並驗證
    let config = config.resolve().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    let input = config.input_path().to_string();
    let dry_run = config.dry_run;
    let storage = LocalStorage::new(config.project_root().to_string());
    let engine = EtlEngine::new(KwabPipeline::new(storage, config));

    if dry_run {
        let result = engine
            .dry_run()
            .with_context(|| format!("Dry run failed for {}", input))?;
        tracing::info!("🧪 {} rows would be written", result.processed_records.len());
        return Ok(());
    }

    engine
        .run()
        .with_context(|| format!("K-WAB scoring failed for {}", input))?;
    Ok(())
}

/// Prints the error chain and returns the exit code for it.
fn report(e: &anyhow::Error) -> i32 {
    eprintln!("❌ {:?}", e);

    let Some(kwab_error) = e.downcast_ref::<KwabError>() else {
        return 1;
    };

    tracing::error!(
        "Category: {:?}, Severity: {:?}",
        kwab_error.category(),
        kwab_error.severity()
    );
    eprintln!("   {}", kwab_error.user_friendly_message());
    eprintln!("💡 {}", kwab_error.recovery_suggestion());

    // 根據錯誤嚴重程度決定退出碼
    match kwab_error.severity() {
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}
