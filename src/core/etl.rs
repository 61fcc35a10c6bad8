use crate::core::Pipeline;
use crate::utils::error::Result;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("Starting ETL process...");

        // Extract
        let raw_data = self.pipeline.extract().await?;
        tracing::info!(
            "Extracted {} element rows and {} component rows",
            raw_data.elements.len(),
            raw_data.components.len()
        );

        // Transform
        let transformed = self.pipeline.transform(raw_data).await?;
        tracing::info!(
            "Merged {} rows, {} missing components",
            transformed.reconciliation.merged.len(),
            transformed.reconciliation.unmatched.len()
        );

        // Load
        let output_path = self.pipeline.load(transformed).await?;
        tracing::info!("Output saved to: {}", output_path);

        Ok(output_path)
    }
}
