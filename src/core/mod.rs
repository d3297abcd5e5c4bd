pub mod audit;
pub mod etl;
pub mod loader;
pub mod pipeline;

pub use crate::domain::model::{AuditOutput, AuditedSeries, FareSeries};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
