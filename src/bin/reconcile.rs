use clap::Parser;
use totem_etl::config::cli::ReconcileArgs;
use totem_etl::utils::logger;
use totem_etl::{EtlEngine, LocalStorage, ReconcilePipeline, TomlConfig};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let args = ReconcileArgs::parse();

    if args.json_logs {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    let config = TomlConfig::load_or_default(&args.config).and_then(|mut config| {
        args.apply(&mut config);
        config.resolve()
    });
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Configuration validation failed: {}", e);
            tracing::error!("Suggestion: {}", e.recovery_suggestion());
            eprintln!("{}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    let storage = LocalStorage::new(config.file.output.output_path.clone());
    let engine = EtlEngine::new(ReconcilePipeline::new(storage, config));

    match engine.run().await {
        Ok(output_path) => {
            println!("Data merging completed. Output saved to: {}", output_path);
        }
        Err(e) => {
            tracing::error!(
                "Reconciliation failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("{}", e.user_friendly_message());
            eprintln!("Suggestion: {}", e.recovery_suggestion());
            let code = e.severity().exit_code();
            if code > 0 {
                std::process::exit(code);
            }
        }
    }
}
