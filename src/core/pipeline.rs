use crate::adapters::discovery::resolve_input;
use crate::adapters::tabular::{RawTable, SourceFormat};
use crate::core::audit::AuditEngine;
use crate::core::loader;
use crate::core::{ConfigProvider, Pipeline, Storage};
use crate::domain::model::{AuditOutput, AuditedSeries, FareSeries};
use crate::render::{render_csv, render_html, render_report, ChartData};
use crate::utils::error::{AuditError, Result};
use std::io::ErrorKind;

/// Load → audit → render over one fare index publication.
pub struct FarePipeline<S: Storage, C: ConfigProvider> {
    pub(crate) storage: S,
    pub(crate) config: C,
    pub(crate) engine: AuditEngine,
}

impl<S: Storage, C: ConfigProvider> FarePipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        let engine = AuditEngine::new(config.historical_events());
        Self {
            storage,
            config,
            engine,
        }
    }

    /// Writes every output or none: files written before a failed write are
    /// removed again.
    async fn write_all(&self, outputs: Vec<(String, Vec<u8>)>) -> Result<()> {
        let mut written: Vec<String> = Vec::new();
        for (name, bytes) in outputs {
            if let Err(e) = self.storage.write_file(&name, &bytes).await {
                for done in &written {
                    if let Err(cleanup) = self.storage.remove_file(done).await {
                        tracing::warn!("Could not remove partial output {}: {}", done, cleanup);
                    }
                }
                return Err(e);
            }
            written.push(name);
        }
        Ok(())
    }

    /// Name of the input file inside the storage root.
    pub async fn input_name(&self) -> Result<String> {
        if let Some(file) = self.config.input_file() {
            return Ok(file.to_string());
        }
        let listing = self.storage.list_files().await?;
        resolve_input(
            &listing,
            self.config.input_prefixes(),
            self.config.input_extensions(),
        )
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for FarePipeline<S, C> {
    async fn extract(&self) -> Result<FareSeries> {
        let name = self.input_name().await?;
        let format = SourceFormat::from_path(&name)?;
        tracing::info!("Loading fare indices from {} ({:?})", name, format);

        let data = match self.storage.read_file(&name).await {
            Err(AuditError::IoError(e)) if e.kind() == ErrorKind::NotFound => {
                return Err(AuditError::input_not_found(format!(
                    "'{}' does not exist in the data directory",
                    name
                )));
            }
            read => read?,
        };
        let table = RawTable::from_bytes(format, &data)?;
        tracing::debug!("Read {} raw rows", table.len());

        let series = loader::clean(&table)?;
        if let (Some(first), Some(last)) = (series.first_month(), series.last_month()) {
            tracing::info!("Cleaned series: {} months, {} to {}", series.len(), first, last);
        }
        Ok(series)
    }

    async fn transform(&self, series: FareSeries) -> Result<AuditedSeries> {
        Ok(self.engine.run(&series))
    }

    async fn load(&self, audited: AuditedSeries) -> Result<AuditOutput> {
        // Everything is rendered before the first write so a failure leaves
        // no partial output behind.
        let report = render_report(&audited);
        let chart = ChartData::from_audit(&audited, self.config.chart_title());
        let html = render_html(&chart);
        let export = match self.config.export_csv() {
            Some(name) => Some((name.to_string(), render_csv(&audited)?)),
            None => None,
        };

        let chart_path = self.config.chart_file().to_string();
        let export_path = export.as_ref().map(|(name, _)| name.clone());
        let mut outputs = vec![(chart_path.clone(), html.into_bytes())];
        outputs.extend(export);
        self.write_all(outputs).await?;
        tracing::info!("Chart written to {}", chart_path);
        if let Some(name) = &export_path {
            tracing::info!("Annotated series exported to {}", name);
        }

        Ok(AuditOutput {
            report,
            chart_path,
            export_path,
            leakage_events: audited.leakage_events().count(),
        })
    }
}
