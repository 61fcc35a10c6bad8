use clap::Parser;
use totem_etl::config::cli::CliArgs;
use totem_etl::utils::logger;
use totem_etl::{run_scrape, ChromeDriver, EtlError, LocalStorage, ScrapeConfig, TomlConfig};

fn load_config(args: &CliArgs) -> Result<ScrapeConfig, EtlError> {
    let mut config = TomlConfig::load_or_default(&args.config)?;
    args.apply(&mut config);
    config.resolve()
}

fn report_failure(stage: &str, e: &EtlError) {
    tracing::error!(
        "{} failed: {} (Category: {:?}, Severity: {:?})",
        stage,
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("{}", e.user_friendly_message());
    eprintln!("Suggestion: {}", e.recovery_suggestion());
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let args = CliArgs::parse();

    if args.json_logs {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("Starting totem-etl");

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            report_failure("Configuration", &e);
            std::process::exit(1);
        }
    };
    tracing::debug!("Config: {:?}", config);

    if args.dry_run {
        tracing::info!("Configuration is valid, exiting (dry run)");
        println!("Configuration is valid");
        return;
    }

    let driver = match ChromeDriver::launch(&config.file.browser) {
        Ok(driver) => driver,
        Err(e) => {
            let e = EtlError::from(e);
            report_failure("Browser launch", &e);
            std::process::exit(e.severity().exit_code());
        }
    };

    let storage = LocalStorage::new(config.file.output.output_path.clone());
    // The browser is shut down by the time the outcome is back.
    match run_scrape(driver, storage, config).await {
        Ok(output_path) => {
            tracing::info!("ETL process completed successfully!");
            println!("ETL process completed successfully!");
            println!("Output saved to: {}", output_path);
        }
        Err(e) => {
            report_failure("ETL process", &e);
            let code = e.severity().exit_code();
            if code > 0 {
                std::process::exit(code);
            }
        }
    }
}
