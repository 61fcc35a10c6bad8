use super::{load_outputs, read_table, reconcile_extraction, write_table};
use crate::adapters::login::login;
use crate::core::components::ComponentExtractor;
use crate::core::elements::ElementExtractor;
use crate::core::etl::EtlEngine;
use crate::core::session::Session;
use crate::core::{ConfigProvider, Driver, Extraction, Pipeline, Storage, TransformResult};
use crate::domain::model::{Component, ComponentRow, Element, ElementRow};
use crate::domain::ports::OutputFile;
use crate::utils::error::{EtlError, Result};
use std::sync::Arc;

/// Scrapes both catalogs through a browser session and merges them.
///
/// Each catalog's table is written as soon as it is complete, so a failure
/// while scraping components leaves the elements on disk.
pub struct ScrapePipeline<D, S, C>
where
    D: Driver + Send + Sync + 'static,
    S: Storage,
    C: ConfigProvider,
{
    session: Arc<Session<D>>,
    storage: S,
    config: C,
}

impl<D, S, C> ScrapePipeline<D, S, C>
where
    D: Driver + Send + Sync + 'static,
    S: Storage,
    C: ConfigProvider,
{
    pub fn new(session: Arc<Session<D>>, storage: S, config: C) -> Self {
        Self {
            session,
            storage,
            config,
        }
    }

    pub fn session(&self) -> &Arc<Session<D>> {
        &self.session
    }

    /// Runs driver work on the blocking pool; the driver only ever has one
    /// caller at a time.
    async fn run_blocking<T, F>(&self, task: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&D) -> Result<T> + Send + 'static,
    {
        let session = Arc::clone(&self.session);
        tokio::task::spawn_blocking(move || task(session.driver()))
            .await
            .map_err(|e| EtlError::TaskError {
                message: e.to_string(),
            })?
    }

    async fn sign_in(&self) -> Result<()> {
        let Some(credentials) = self.config.credentials().cloned() else {
            tracing::warn!("No credentials configured, browsing the catalog anonymously");
            return Ok(());
        };
        let site_url = self.config.site_url().to_string();
        let timeout = self.config.traversal().wait_timeout;
        self.run_blocking(move |driver| login(driver, &site_url, &credentials, timeout))
            .await
    }

    async fn elements(&self, extraction: &mut Extraction) -> Result<()> {
        if !self.config.scrape_elements() {
            tracing::info!("Skipping element scrape, reusing the previous table");
            extraction.elements =
                read_table(&self.storage, &self.config, OutputFile::Elements).await?;
            return Ok(());
        }

        let url = self.config.elements_url();
        let settings = self.config.traversal();
        let scraped = self
            .run_blocking(move |driver| ElementExtractor::new(driver, settings).run(&url))
            .await?;

        let rows: Vec<ElementRow> = scraped.elements.iter().flat_map(Element::rows).collect();
        write_table(&self.storage, &self.config, OutputFile::Elements, &rows).await?;
        extraction.elements = rows;
        extraction.reports.push(scraped.report);
        Ok(())
    }

    async fn components(&self, extraction: &mut Extraction) -> Result<()> {
        if !self.config.scrape_components() {
            tracing::info!("Skipping component scrape, reusing the previous table");
            extraction.components =
                read_table(&self.storage, &self.config, OutputFile::Components).await?;
            return Ok(());
        }

        let url = self.config.components_url();
        let settings = self.config.traversal();
        let scraped = self
            .run_blocking(move |driver| ComponentExtractor::new(driver, settings).run(&url))
            .await?;

        let rows: Vec<ComponentRow> = scraped
            .components
            .iter()
            .flat_map(Component::rows)
            .collect();
        write_table(&self.storage, &self.config, OutputFile::Components, &rows).await?;
        extraction.components = rows;
        extraction.reports.push(scraped.report);
        Ok(())
    }
}

#[async_trait::async_trait]
impl<D, S, C> Pipeline for ScrapePipeline<D, S, C>
where
    D: Driver + Send + Sync + 'static,
    S: Storage,
    C: ConfigProvider,
{
    async fn extract(&self) -> Result<Extraction> {
        if self.config.scrape_elements() || self.config.scrape_components() {
            self.sign_in().await?;
        }

        let mut extraction = Extraction::default();
        self.elements(&mut extraction).await?;
        self.components(&mut extraction).await?;
        Ok(extraction)
    }

    async fn transform(&self, data: Extraction) -> Result<TransformResult> {
        Ok(reconcile_extraction(data))
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        load_outputs(&self.storage, &self.config, result).await
    }
}

/// Runs a full scrape with `driver` and shuts the driver down before
/// returning, on success and on failure alike.
pub async fn run_scrape<D, S, C>(driver: D, storage: S, config: C) -> Result<String>
where
    D: Driver + Send + Sync + 'static,
    S: Storage,
    C: ConfigProvider,
{
    let session = Arc::new(Session::new(driver));
    let engine = EtlEngine::new(ScrapePipeline::new(Arc::clone(&session), storage, config));
    let outcome = engine.run().await;
    drop(engine);
    session.close();
    outcome
}
