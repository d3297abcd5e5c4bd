use crate::utils::error::{AuditError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Optional `--config` file. Every section may be omitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub input: InputConfig,
    pub output: OutputConfig,
    pub logging: Option<LoggingConfig>,
    pub historical_events: Vec<HistoricalEventConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub data_dir: Option<String>,
    pub file: Option<String>,
    pub prefixes: Option<Vec<String>>,
    pub extensions: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub chart_file: Option<String>,
    pub chart_title: Option<String>,
    pub export_csv: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub format: Option<String>,
    pub verbose: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoricalEventConfig {
    pub month: String,
    pub note: String,
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| {
            AuditError::config(format!(
                "cannot read config file '{}': {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    /// Values are taken literally; `${VAR}` is not expanded.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn json_logging(&self) -> bool {
        self.logging
            .as_ref()
            .and_then(|l| l.format.as_deref())
            .map(|f| f.eq_ignore_ascii_case("json"))
            .unwrap_or(false)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        if let Some(logging) = &self.logging {
            if let Some(format) = &logging.format {
                if !["compact", "json"].contains(&format.to_lowercase().as_str()) {
                    return Err(AuditError::InvalidConfigValueError {
                        field: "logging.format".to_string(),
                        value: format.clone(),
                        reason: "Valid formats: compact, json".to_string(),
                    });
                }
            }
        }

        for (i, event) in self.historical_events.iter().enumerate() {
            let field = format!("historical_events[{}]", i);
            validation::validate_month_key(&format!("{}.month", field), &event.month)?;
            validation::validate_non_empty_string(&format!("{}.note", field), &event.note)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[input]
data_dir = "./data"
prefixes = ["air_fares"]
extensions = ["xlsx"]

[output]
chart_file = "fares.html"
chart_title = "Fare audit"
export_csv = "fares_audit.csv"

[logging]
format = "json"

[[historical_events]]
month = "2022-03"
note = "Fuel surcharge introduced"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.input.data_dir.as_deref(), Some("./data"));
        assert_eq!(config.input.prefixes, Some(vec!["air_fares".to_string()]));
        assert_eq!(config.output.chart_file.as_deref(), Some("fares.html"));
        assert_eq!(config.historical_events.len(), 1);
        assert!(config.json_logging());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_config_is_valid() {
        let config = TomlConfig::from_toml_str("").unwrap();
        assert!(config.input.file.is_none());
        assert!(config.historical_events.is_empty());
        assert!(!config.json_logging());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_placeholders_are_not_expanded() {
        let config = TomlConfig::from_toml_str(
            r#"
[input]
data_dir = "${FARE_AUDIT_CONFIG_DIR}"
"#,
        )
        .unwrap();
        assert_eq!(
            config.input.data_dir.as_deref(),
            Some("${FARE_AUDIT_CONFIG_DIR}")
        );
    }

    #[test]
    fn test_invalid_event_month_fails_validation() {
        let config = TomlConfig::from_toml_str(
            r#"
[[historical_events]]
month = "March 2022"
note = "Fuel surcharge"
"#,
        )
        .unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("historical_events[0].month"));
    }

    #[test]
    fn test_malformed_toml_is_config_error() {
        let err = TomlConfig::from_toml_str("[output\nchart_file = 1").unwrap_err();
        assert!(matches!(err, AuditError::ConfigError { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[output]\nchart_title = \"From file\"\n")
            .unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.output.chart_title.as_deref(), Some("From file"));
    }
}
