// Output side of the audit: terminal report, chart artifact and CSV export.
// None of these touch the file system; the pipeline's load stage writes them.

pub mod chart;
pub mod export;
pub mod report;

pub use chart::{render_html, ChartData};
pub use export::render_csv;
pub use report::render_report;
