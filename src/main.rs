use clap::Parser;
use fare_audit::config::toml_config::TomlConfig;
use fare_audit::utils::{logger, validation::Validate};
use fare_audit::{AuditRunner, CliConfig, FarePipeline, LocalStorage};

fn fail(e: &fare_audit::AuditError) -> ! {
    tracing::error!(
        "❌ Fare audit failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
    std::process::exit(e.exit_code());
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // The config file may choose the log format, so read it before logging starts.
    let file = cli.load_file();
    let (json_logs, verbose) = match &file {
        Ok(Some(f)) => (
            cli.json_logs || f.json_logging(),
            cli.verbose || f.logging.as_ref().and_then(|l| l.verbose).unwrap_or(false),
        ),
        _ => (cli.json_logs, cli.verbose),
    };
    if json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(verbose);
    }

    let file: Option<TomlConfig> = match file {
        Ok(file) => file,
        Err(e) => fail(&e),
    };

    let settings = cli.resolve(file.as_ref());
    tracing::debug!("Resolved settings: {:?}", settings);
    if let Err(e) = settings.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        fail(&e);
    }

    let storage = LocalStorage::new(settings.data_dir.clone());
    let chart_location = storage.resolve(&settings.chart_file);
    let export_location = settings.export_csv.as_deref().map(|f| storage.resolve(f));
    let pipeline = FarePipeline::new(storage, settings);
    let runner = AuditRunner::new(pipeline);

    match runner.run().await {
        Ok(output) => {
            print!("{}", output.report);
            println!();
            println!("Chart saved to: {}", chart_location.display());
            if let Some(export) = export_location.filter(|_| output.export_path.is_some()) {
                println!("Annotated series saved to: {}", export.display());
            }
        }
        Err(e) => fail(&e),
    }

    Ok(())
}
