pub mod cli;
pub mod settings;
pub mod toml_config;

pub use settings::AuditSettings;

#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::Validate;
#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "fare-audit")]
#[command(about = "Flags revenue leakage months in published airline fare indices")]
pub struct CliConfig {
    /// Directory searched for the air_fares*.csv / air_fares*.xlsx input
    #[arg(long)]
    pub data_dir: Option<String>,

    /// Input file inside the data directory; skips prefix discovery
    #[arg(long)]
    pub input: Option<String>,

    /// Chart file name written to the data directory
    #[arg(long)]
    pub output: Option<String>,

    /// Optional TOML configuration file
    #[arg(long)]
    pub config: Option<String>,

    /// Also write the annotated series as CSV to the data directory
    #[arg(long)]
    pub export_csv: Option<String>,

    /// Emit logs as JSON lines on stderr
    #[arg(long)]
    pub json_logs: bool,

    #[arg(long, short, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// Loads the config file when given, then applies flag overrides.
    pub fn load_file(&self) -> Result<Option<toml_config::TomlConfig>> {
        match &self.config {
            Some(path) => {
                let file = toml_config::TomlConfig::from_file(path)?;
                file.validate()?;
                Ok(Some(file))
            }
            None => Ok(None),
        }
    }

    pub fn resolve(&self, file: Option<&toml_config::TomlConfig>) -> AuditSettings {
        let mut settings = AuditSettings::default();
        if let Some(file) = file {
            settings = settings.merge_file(file);
        }
        if let Some(dir) = &self.data_dir {
            settings.data_dir = dir.clone();
        }
        if let Some(input) = &self.input {
            settings.input_file = Some(input.clone());
        }
        if let Some(output) = &self.output {
            settings.chart_file = output.clone();
        }
        if let Some(export) = &self.export_csv {
            settings.export_csv = Some(export.clone());
        }
        settings
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_file_values() {
        let cli = CliConfig::parse_from([
            "fare-audit",
            "--data-dir",
            "/tmp/fares",
            "--output",
            "audit.html",
        ]);
        let file = toml_config::TomlConfig::from_toml_str(
            "[input]\ndata_dir = \"/srv\"\n[output]\nchart_file = \"file.html\"\nchart_title = \"From file\"\n",
        )
        .unwrap();

        let settings = cli.resolve(Some(&file));
        assert_eq!(settings.data_dir, "/tmp/fares");
        assert_eq!(settings.chart_file, "audit.html");
        assert_eq!(settings.chart_title, "From file");
    }

    #[test]
    fn test_defaults_without_flags() {
        let cli = CliConfig::parse_from(["fare-audit"]);
        let settings = cli.resolve(None);
        assert_eq!(settings.data_dir, ".");
        assert_eq!(settings.chart_file, "trend_analysis.html");
        assert!(settings.export_csv.is_none());
        assert!(!cli.verbose);
    }
}
