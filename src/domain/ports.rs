use crate::core::navigator::TraversalSettings;
use crate::domain::model::{Credentials, Extraction, TransformResult};
use crate::utils::error::{DriverResult, Result};
use async_trait::async_trait;
use std::time::Duration;

/// Capabilities the extractors need from a UI automation session.
///
/// Node handles borrow the driver and may go stale whenever the page
/// re-renders; every operation on a stale handle fails with
/// [`DriverError::Stale`](crate::utils::error::DriverError::Stale).
/// All calls block, and `wait_for` is the only one that waits on purpose.
pub trait Driver {
    type Node<'a>
    where
        Self: 'a;

    fn navigate(&self, url: &str) -> DriverResult<()>;

    fn find_one(&self, selector: &str) -> DriverResult<Self::Node<'_>>;

    fn find_all(&self, selector: &str) -> DriverResult<Vec<Self::Node<'_>>>;

    fn find_one_in<'a>(&'a self, scope: &Self::Node<'a>, selector: &str)
        -> DriverResult<Self::Node<'a>>;

    fn find_all_in<'a>(
        &'a self,
        scope: &Self::Node<'a>,
        selector: &str,
    ) -> DriverResult<Vec<Self::Node<'a>>>;

    fn wait_for(&self, selector: &str, timeout: Duration) -> DriverResult<Self::Node<'_>>;

    fn click<'a>(&'a self, node: &Self::Node<'a>) -> DriverResult<()>;

    fn text<'a>(&'a self, node: &Self::Node<'a>) -> DriverResult<String>;

    fn attribute<'a>(&'a self, node: &Self::Node<'a>, name: &str) -> DriverResult<Option<String>>;

    /// Calls `function` with `this` bound to `target`.
    fn run_script<'a>(
        &'a self,
        target: &Self::Node<'a>,
        function: &str,
        args: Vec<serde_json::Value>,
    ) -> DriverResult<()>;

    fn type_text<'a>(&'a self, node: &Self::Node<'a>, text: &str) -> DriverResult<()>;

    fn quit(&self) -> DriverResult<()>;
}

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Files a run reads and writes, all relative to the output path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFile {
    Elements,
    Components,
    Merged,
    Missing,
    Report,
}

pub trait ConfigProvider: Send + Sync {
    fn site_url(&self) -> &str;
    fn elements_url(&self) -> String;
    fn components_url(&self) -> String;
    fn credentials(&self) -> Option<&Credentials>;
    fn traversal(&self) -> TraversalSettings;
    fn output_path(&self) -> &str;
    fn delimiter(&self) -> u8;
    fn file_name(&self, file: OutputFile) -> &str;
    /// Name of the zip archive to bundle the outputs into, if any.
    fn bundle_name(&self) -> Option<&str>;
    /// `false` reuses the elements table from a previous run.
    fn scrape_elements(&self) -> bool;
    fn scrape_components(&self) -> bool;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Extraction>;
    async fn transform(&self, data: Extraction) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<String>;
}
