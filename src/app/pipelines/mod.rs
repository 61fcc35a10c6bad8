//! Pipelines and the phases they share: both end in the same reconcile and
//! load steps.

pub mod reconcile_pipeline;
pub mod scrape_pipeline;

pub use reconcile_pipeline::ReconcilePipeline;
pub use scrape_pipeline::{run_scrape, ScrapePipeline};

use crate::core::reconcile::{duplicate_keys, reconcile};
use crate::core::table::{self, FromRecord, ToRecord};
use crate::core::{ConfigProvider, Extraction, Storage, TransformResult};
use crate::domain::ports::OutputFile;
use crate::utils::error::Result;
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

const BUNDLED_FILES: [OutputFile; 5] = [
    OutputFile::Elements,
    OutputFile::Components,
    OutputFile::Merged,
    OutputFile::Missing,
    OutputFile::Report,
];

pub(crate) fn output_location<C: ConfigProvider>(config: &C, name: &str) -> String {
    format!("{}/{}", config.output_path(), name)
}

/// Reads a table written by an earlier run.
pub(crate) async fn read_table<T, S, C>(storage: &S, config: &C, file: OutputFile) -> Result<Vec<T>>
where
    T: ToRecord + FromRecord,
    S: Storage,
    C: ConfigProvider,
{
    let name = config.file_name(file);
    let data = storage.read_file(name).await?;
    let rows = table::decode(&data, config.delimiter())?;
    tracing::info!("Read {} rows from {}", rows.len(), output_location(config, name));
    Ok(rows)
}

pub(crate) async fn write_table<T, S, C>(
    storage: &S,
    config: &C,
    file: OutputFile,
    rows: &[T],
) -> Result<()>
where
    T: ToRecord,
    S: Storage,
    C: ConfigProvider,
{
    let name = config.file_name(file);
    let data = table::encode(rows, config.delimiter())?;
    storage.write_file(name, &data).await?;
    tracing::info!("Saved {} rows to {}", rows.len(), output_location(config, name));
    Ok(())
}

pub(crate) fn reconcile_extraction(data: Extraction) -> TransformResult {
    let duplicates = duplicate_keys(&data.components);
    if !duplicates.is_empty() {
        tracing::warn!(
            "{} component keys have conflicting records, the first one is used",
            duplicates.len()
        );
    }

    TransformResult {
        reconciliation: reconcile(&data.elements, &data.components),
        reports: data.reports,
    }
}

/// Writes the merged table, the missing-component report and the run reports,
/// then bundles everything if configured. Returns the location of the main
/// output.
pub(crate) async fn load_outputs<S, C>(
    storage: &S,
    config: &C,
    result: TransformResult,
) -> Result<String>
where
    S: Storage,
    C: ConfigProvider,
{
    write_table(storage, config, OutputFile::Merged, &result.reconciliation.merged).await?;
    write_table(
        storage,
        config,
        OutputFile::Missing,
        &result.reconciliation.unmatched,
    )
    .await?;

    if !result.reports.is_empty() {
        let name = config.file_name(OutputFile::Report);
        let json_data = serde_json::to_vec_pretty(&result.reports)?;
        storage.write_file(name, &json_data).await?;
        tracing::debug!("Run report saved to {}", output_location(config, name));
    }

    match config.bundle_name() {
        Some(bundle_name) => {
            let zip_data = bundle(storage, config).await?;
            tracing::debug!("Writing ZIP file ({} bytes) to storage", zip_data.len());
            storage.write_file(bundle_name, &zip_data).await?;
            Ok(output_location(config, bundle_name))
        }
        None => Ok(output_location(config, config.file_name(OutputFile::Merged))),
    }
}

async fn bundle<S: Storage, C: ConfigProvider>(storage: &S, config: &C) -> Result<Vec<u8>> {
    let mut entries = Vec::with_capacity(BUNDLED_FILES.len());
    for file in BUNDLED_FILES {
        let name = config.file_name(file);
        match storage.read_file(name).await {
            Ok(data) => entries.push((name, data)),
            Err(e) => tracing::debug!("Not bundling {}: {}", name, e),
        }
    }
    zip_entries(&entries)
}

fn zip_entries(entries: &[(&str, Vec<u8>)]) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
    for (name, data) in entries {
        zip.start_file::<_, ()>(*name, FileOptions::default())?;
        zip.write_all(data)?;
    }
    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}
