use crate::core::Pipeline;
use crate::domain::model::AuditOutput;
use crate::utils::error::Result;
use std::time::Instant;

/// Drives a pipeline through its three stages, strictly in sequence.
pub struct AuditRunner<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> AuditRunner<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<AuditOutput> {
        let started = Instant::now();
        tracing::info!("Starting fare audit");

        tracing::info!("Loading and cleaning fare series...");
        let series = self.pipeline.extract().await?;
        tracing::info!("Loaded {} monthly records", series.len());

        tracing::info!("Auditing month-over-month changes...");
        let audited = self.pipeline.transform(series).await?;

        tracing::info!("Rendering report and chart...");
        let output = self.pipeline.load(audited).await?;

        tracing::info!(
            "Audit finished in {:?}: {} leakage event(s)",
            started.elapsed(),
            output.leakage_events
        );
        Ok(output)
    }
}
