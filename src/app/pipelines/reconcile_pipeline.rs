use super::{load_outputs, read_table, reconcile_extraction};
use crate::core::{ConfigProvider, Extraction, Pipeline, Storage, TransformResult};
use crate::domain::ports::OutputFile;
use crate::utils::error::Result;

/// Merges element and component tables left by an earlier scrape.
pub struct ReconcilePipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> ReconcilePipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for ReconcilePipeline<S, C> {
    async fn extract(&self) -> Result<Extraction> {
        Ok(Extraction {
            elements: read_table(&self.storage, &self.config, OutputFile::Elements).await?,
            components: read_table(&self.storage, &self.config, OutputFile::Components).await?,
            reports: Vec::new(),
        })
    }

    async fn transform(&self, data: Extraction) -> Result<TransformResult> {
        Ok(reconcile_extraction(data))
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        load_outputs(&self.storage, &self.config, result).await
    }
}
