pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "browser")]
pub use adapters::ChromeDriver;
pub use adapters::LocalStorage;

pub use app::pipelines::{run_scrape, ReconcilePipeline, ScrapePipeline};
pub use config::{ScrapeConfig, TomlConfig};
pub use core::{etl::EtlEngine, session::Session};
pub use utils::error::{EtlError, Result};
