use crate::domain::events::HistoricalEvents;
use crate::domain::model::{AuditOutput, AuditedSeries, FareSeries};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    fn remove_file(&self, path: &str) -> impl std::future::Future<Output = Result<()>> + Send;
    /// File names (not paths) directly inside the storage root.
    fn list_files(&self) -> impl std::future::Future<Output = Result<Vec<String>>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    /// Explicit input file, bypassing prefix discovery.
    fn input_file(&self) -> Option<&str>;
    fn input_prefixes(&self) -> &[String];
    fn input_extensions(&self) -> &[String];
    fn chart_file(&self) -> &str;
    fn chart_title(&self) -> &str;
    fn export_csv(&self) -> Option<&str>;
    fn historical_events(&self) -> HistoricalEvents;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<FareSeries>;
    async fn transform(&self, series: FareSeries) -> Result<AuditedSeries>;
    async fn load(&self, audited: AuditedSeries) -> Result<AuditOutput>;
}
