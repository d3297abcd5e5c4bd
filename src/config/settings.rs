use crate::adapters::discovery::{DEFAULT_PREFIXES, SUPPORTED_EXTENSIONS};
use crate::config::toml_config::TomlConfig;
use crate::core::ConfigProvider;
use crate::domain::events::HistoricalEvents;
use crate::domain::model::YearMonth;
use crate::render::chart::DEFAULT_CHART_TITLE;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};

pub const DEFAULT_CHART_FILE: &str = "trend_analysis.html";

/// Fully resolved run settings: defaults, then the TOML file, then flags.
#[derive(Debug, Clone)]
pub struct AuditSettings {
    pub data_dir: String,
    pub input_file: Option<String>,
    pub prefixes: Vec<String>,
    pub extensions: Vec<String>,
    pub chart_file: String,
    pub chart_title: String,
    pub export_csv: Option<String>,
    pub extra_events: Vec<(String, String)>,
}

impl Default for AuditSettings {
    fn default() -> Self {
        Self {
            data_dir: ".".to_string(),
            input_file: None,
            prefixes: DEFAULT_PREFIXES.iter().map(|s| s.to_string()).collect(),
            extensions: SUPPORTED_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            chart_file: DEFAULT_CHART_FILE.to_string(),
            chart_title: DEFAULT_CHART_TITLE.to_string(),
            export_csv: None,
            extra_events: Vec::new(),
        }
    }
}

impl AuditSettings {
    pub fn with_data_dir(mut self, data_dir: impl Into<String>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    pub fn with_input_file(mut self, file: impl Into<String>) -> Self {
        self.input_file = Some(file.into());
        self
    }

    pub fn with_export_csv(mut self, file: impl Into<String>) -> Self {
        self.export_csv = Some(file.into());
        self
    }

    /// Layers values present in the config file over the current ones.
    pub fn merge_file(mut self, file: &TomlConfig) -> Self {
        let input = &file.input;
        if let Some(dir) = &input.data_dir {
            self.data_dir = dir.clone();
        }
        if let Some(f) = &input.file {
            self.input_file = Some(f.clone());
        }
        if let Some(prefixes) = &input.prefixes {
            self.prefixes = prefixes.clone();
        }
        if let Some(extensions) = &input.extensions {
            self.extensions = extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_lowercase())
                .collect();
        }

        let output = &file.output;
        if let Some(chart) = &output.chart_file {
            self.chart_file = chart.clone();
        }
        if let Some(title) = &output.chart_title {
            self.chart_title = title.clone();
        }
        if let Some(export) = &output.export_csv {
            self.export_csv = Some(export.clone());
        }

        self.extra_events.extend(
            file.historical_events
                .iter()
                .map(|e| (e.month.clone(), e.note.clone())),
        );
        self
    }
}

impl Validate for AuditSettings {
    fn validate(&self) -> Result<()> {
        validation::validate_path("data_dir", &self.data_dir)?;

        if let Some(file) = &self.input_file {
            validation::validate_path("input", file)?;
            validation::validate_file_extensions(
                "input",
                std::slice::from_ref(file),
                SUPPORTED_EXTENSIONS,
            )?;
        }

        if self.prefixes.is_empty() {
            validation::validate_non_empty_string("input.prefixes", "")?;
        }
        for prefix in &self.prefixes {
            validation::validate_non_empty_string("input.prefixes", prefix)?;
        }
        validation::validate_extension_names("input.extensions", &self.extensions, SUPPORTED_EXTENSIONS)?;

        validation::validate_path("output.chart_file", &self.chart_file)?;
        validation::validate_file_extensions(
            "output.chart_file",
            std::slice::from_ref(&self.chart_file),
            &["html", "htm"],
        )?;
        validation::validate_non_empty_string("output.chart_title", &self.chart_title)?;

        if let Some(export) = &self.export_csv {
            validation::validate_path("output.export_csv", export)?;
            validation::validate_file_extensions(
                "output.export_csv",
                std::slice::from_ref(export),
                &["csv"],
            )?;
        }

        for (month, note) in &self.extra_events {
            validation::validate_month_key("historical_events.month", month)?;
            validation::validate_non_empty_string("historical_events.note", note)?;
        }

        Ok(())
    }
}

impl ConfigProvider for AuditSettings {
    fn input_file(&self) -> Option<&str> {
        self.input_file.as_deref()
    }

    fn input_prefixes(&self) -> &[String] {
        &self.prefixes
    }

    fn input_extensions(&self) -> &[String] {
        &self.extensions
    }

    fn chart_file(&self) -> &str {
        &self.chart_file
    }

    fn chart_title(&self) -> &str {
        &self.chart_title
    }

    fn export_csv(&self) -> Option<&str> {
        self.export_csv.as_deref()
    }

    /// Entries that fail to parse are skipped; `validate` reports them first.
    fn historical_events(&self) -> HistoricalEvents {
        HistoricalEvents::builtin().with_overrides(
            self.extra_events
                .iter()
                .filter_map(|(month, note)| {
                    month.parse::<YearMonth>().ok().map(|m| (m, note.clone()))
                })
                .collect::<Vec<_>>(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = AuditSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.chart_file(), "trend_analysis.html");
        assert_eq!(settings.input_prefixes(), &["air_fare", "air_fares"]);
        assert_eq!(settings.historical_events().len(), 5);
    }

    #[test]
    fn test_file_values_override_defaults() {
        let file = TomlConfig::from_toml_str(
            r#"
[input]
extensions = [".CSV"]

[output]
chart_file = "fares.html"

[[historical_events]]
month = "2020-04"
note = "Border closures"
"#,
        )
        .unwrap();

        let settings = AuditSettings::default().merge_file(&file);
        assert_eq!(settings.input_extensions(), &["csv"]);
        assert_eq!(settings.chart_file(), "fares.html");
        assert!(settings.validate().is_ok());

        let april = "2020-04".parse().unwrap();
        assert_eq!(settings.historical_events().note_for(april), Some("Border closures"));
    }

    #[test]
    fn test_invalid_outputs_are_rejected() {
        let mut settings = AuditSettings::default();
        settings.chart_file = "trend.png".to_string();
        assert!(settings.validate().is_err());

        let settings = AuditSettings::default().with_export_csv("audit.xlsx");
        assert!(settings.validate().is_err());

        let settings = AuditSettings::default().with_input_file("air_fares.xls");
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_empty_prefix_list_is_rejected() {
        let mut settings = AuditSettings::default();
        settings.prefixes.clear();
        assert!(settings.validate().is_err());
    }
}
