use crate::config::toml_config::TomlConfig;
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "totem-etl")]
#[command(about = "Scrape the TOTEM element and component libraries and reconcile them")]
pub struct CliArgs {
    #[arg(short, long, default_value = "totem.toml", help = "TOML configuration file")]
    pub config: String,

    #[arg(long, help = "Directory for the output tables")]
    pub output_path: Option<String>,

    #[arg(long, help = "Show the browser window")]
    pub headed: bool,

    #[arg(long, help = "Reuse the elements table from a previous run")]
    pub skip_elements: bool,

    #[arg(long, help = "Reuse the components table from a previous run")]
    pub skip_components: bool,

    #[arg(long, help = "Validate the configuration and exit")]
    pub dry_run: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}

impl CliArgs {
    /// Command line flags take precedence over the file.
    pub fn apply(&self, config: &mut TomlConfig) {
        if let Some(output_path) = &self.output_path {
            config.output.output_path = output_path.clone();
        }
        if self.headed {
            config.browser.headless = false;
        }
        if self.skip_elements {
            config.run.scrape_elements = false;
        }
        if self.skip_components {
            config.run.scrape_components = false;
        }
    }
}

/// Arguments of the stand-alone merge tool.
#[derive(Debug, Clone, Parser)]
#[command(name = "reconcile")]
#[command(about = "Merge previously scraped element and component tables")]
pub struct ReconcileArgs {
    #[arg(short, long, default_value = "totem.toml", help = "TOML configuration file")]
    pub config: String,

    #[arg(long, help = "Directory holding the scraped tables; outputs are written there too")]
    pub output_path: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}

impl ReconcileArgs {
    pub fn apply(&self, config: &mut TomlConfig) {
        if let Some(output_path) = &self.output_path {
            config.output.output_path = output_path.clone();
        }
    }
}
