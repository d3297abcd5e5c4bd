pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod render;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{cli::LocalStorage, AuditSettings};

pub use core::{audit::AuditEngine, etl::AuditRunner, pipeline::FarePipeline};
pub use domain::events::HistoricalEvents;
pub use utils::error::{AuditError, Result};
