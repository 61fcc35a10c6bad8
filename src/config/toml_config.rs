use crate::core::navigator::TraversalSettings;
use crate::core::ConfigProvider;
use crate::domain::model::Credentials;
use crate::domain::ports::OutputFile;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::Deserialize;
use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

static ENV_VAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([^}]+)\}").expect("environment variable pattern is valid")
});

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub site: SiteConfig,
    pub credentials: Option<CredentialsConfig>,
    pub browser: BrowserConfig,
    pub output: OutputConfig,
    pub run: RunConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub base_url: String,
    pub elements_path: String,
    pub components_path: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.totem-building.be".to_string(),
            elements_path: "/user.library.xhtml?l=ELEMENTTYPE".to_string(),
            components_path: "/user.library.xhtml?l=COMPONENT".to_string(),
        }
    }
}

#[derive(Clone, Deserialize)]
pub struct CredentialsConfig {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsConfig")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub headless: bool,
    pub window_width: u32,
    pub window_height: u32,
    pub wait_timeout_seconds: u64,
    /// Attempts per catalog item, including the first.
    pub retry_attempts: usize,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            window_width: 2400,
            window_height: 1800,
            wait_timeout_seconds: 10,
            retry_attempts: 2,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub output_path: String,
    pub delimiter: String,
    pub elements_file: String,
    pub components_file: String,
    pub merged_file: String,
    pub missing_file: String,
    pub report_file: String,
    pub bundle: Option<BundleConfig>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_path: "./output".to_string(),
            delimiter: ";".to_string(),
            elements_file: "elements.csv".to_string(),
            components_file: "components.csv".to_string(),
            merged_file: "totem_data.csv".to_string(),
            missing_file: "missing_components.csv".to_string(),
            report_file: "run_report.json".to_string(),
            bundle: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BundleConfig {
    pub enabled: bool,
    #[serde(default = "default_bundle_filename")]
    pub filename: String,
}

fn default_bundle_filename() -> String {
    "totem_export.zip".to_string()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub scrape_elements: bool,
    pub scrape_components: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            scrape_elements: true,
            scrape_components: true,
        }
    }
}

/// Resolved runtime configuration.
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    pub file: TomlConfig,
    credentials: Option<Credentials>,
    delimiter: u8,
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// Falls back to the built-in defaults when `path` does not exist.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            tracing::warn!(
                "Config file {} not found, using defaults",
                path.as_ref().display()
            );
            Ok(Self::default())
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the variable's value. Unset variables are left
    /// as written so validation can name them.
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("site.base_url", &self.site.base_url)?;
        validation::validate_url("site.elements_path", &self.elements_url())?;
        validation::validate_url("site.components_path", &self.components_url())?;

        if let Some(credentials) = &self.credentials {
            for (field, value) in [
                ("credentials.username", &credentials.username),
                ("credentials.password", &credentials.password),
            ] {
                validation::validate_non_empty_string(field, value)?;
                if ENV_VAR.is_match(value) {
                    return Err(EtlError::MissingConfigError {
                        field: format!("{} ({} is not set)", field, value),
                    });
                }
            }
        }

        validation::validate_positive_number(
            "browser.retry_attempts",
            self.browser.retry_attempts,
            1,
        )?;
        validation::validate_range(
            "browser.wait_timeout_seconds",
            self.browser.wait_timeout_seconds,
            1,
            600,
        )?;
        validation::validate_positive_number(
            "browser.window_width",
            self.browser.window_width as usize,
            1,
        )?;
        validation::validate_positive_number(
            "browser.window_height",
            self.browser.window_height as usize,
            1,
        )?;

        validation::validate_path("output.output_path", &self.output.output_path)?;
        validation::validate_delimiter("output.delimiter", &self.output.delimiter)?;
        validation::validate_file_extensions(
            "output",
            &[
                self.output.elements_file.as_str(),
                self.output.components_file.as_str(),
                self.output.merged_file.as_str(),
                self.output.missing_file.as_str(),
            ],
            &["csv", "tsv", "txt"],
        )?;
        validation::validate_file_extensions(
            "output.report_file",
            &[self.output.report_file.as_str()],
            &["json"],
        )?;
        if let Some(bundle) = self.output.bundle.as_ref().filter(|b| b.enabled) {
            validation::validate_file_extensions(
                "output.bundle.filename",
                &[bundle.filename.as_str()],
                &["zip"],
            )?;
        }

        Ok(())
    }

    pub fn elements_url(&self) -> String {
        format!("{}{}", self.site.base_url.trim_end_matches('/'), self.site.elements_path)
    }

    pub fn components_url(&self) -> String {
        format!("{}{}", self.site.base_url.trim_end_matches('/'), self.site.components_path)
    }

    /// Validates the file and resolves it for a run.
    pub fn resolve(self) -> Result<ScrapeConfig> {
        self.validate()?;
        let delimiter = validation::validate_delimiter("output.delimiter", &self.output.delimiter)?;
        let credentials = self.credentials.as_ref().map(|c| Credentials {
            username: c.username.clone(),
            password: c.password.clone(),
        });
        Ok(ScrapeConfig {
            file: self,
            credentials,
            delimiter,
        })
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

impl ConfigProvider for ScrapeConfig {
    fn site_url(&self) -> &str {
        &self.file.site.base_url
    }

    fn elements_url(&self) -> String {
        self.file.elements_url()
    }

    fn components_url(&self) -> String {
        self.file.components_url()
    }

    fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    fn traversal(&self) -> TraversalSettings {
        TraversalSettings {
            wait_timeout: Duration::from_secs(self.file.browser.wait_timeout_seconds),
            attempts: self.file.browser.retry_attempts,
        }
    }

    fn output_path(&self) -> &str {
        &self.file.output.output_path
    }

    fn delimiter(&self) -> u8 {
        self.delimiter
    }

    fn file_name(&self, file: OutputFile) -> &str {
        let output = &self.file.output;
        match file {
            OutputFile::Elements => &output.elements_file,
            OutputFile::Components => &output.components_file,
            OutputFile::Merged => &output.merged_file,
            OutputFile::Missing => &output.missing_file,
            OutputFile::Report => &output.report_file,
        }
    }

    fn bundle_name(&self) -> Option<&str> {
        self.file
            .output
            .bundle
            .as_ref()
            .filter(|bundle| bundle.enabled)
            .map(|bundle| bundle.filename.as_str())
    }

    fn scrape_elements(&self) -> bool {
        self.file.run.scrape_elements
    }

    fn scrape_components(&self) -> bool {
        self.file.run.scrape_components
    }
}
