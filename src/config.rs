use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::output::OutputFormat;
use crate::store::Driver;

/// Defaults read from `shortlist.yaml`. Every key is optional and loses to
/// command-line flags and environment variables.
#[derive(Debug, Clone, Deserialize, Default, Eq, PartialEq)]
#[serde(default, rename_all = "snake_case")]
pub struct FileConfig {
    pub driver: Option<Driver>,
    pub output: Option<OutputFormat>,
    #[serde(alias = "time-format")]
    pub time_format: Option<String>,
    #[serde(alias = "max_results")]
    pub max: Option<usize>,
    #[serde(alias = "log-filter")]
    pub log_filter: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct LoadedConfig {
    pub source: Option<String>,
    pub values: FileConfig,
}

impl LoadedConfig {
    pub fn discover() -> Result<Self> {
        let Some(path) = discover_config_path() else {
            return Ok(Self::default());
        };
        Self::load(&path)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let values = parse(&raw).with_context(|| format!("failed to parse config {}", path.display()))?;

        Ok(Self {
            source: Some(path.display().to_string()),
            values,
        })
    }
}

fn parse(raw: &str) -> Result<FileConfig> {
    if raw.trim().is_empty() {
        return Ok(FileConfig::default());
    }
    Ok(serde_yaml::from_str(raw)?)
}

fn discover_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("SHORTLIST_CONFIG")
        && !path.trim().is_empty()
    {
        return Some(PathBuf::from(path));
    }

    let cwd_candidates = [
        PathBuf::from("shortlist.yaml"),
        PathBuf::from("shortlist.yml"),
        PathBuf::from(".shortlist.yaml"),
    ];
    for candidate in cwd_candidates {
        if candidate.exists() {
            return Some(candidate);
        }
    }

    if let Ok(home) = std::env::var("HOME") {
        let user_candidates = [
            PathBuf::from(&home).join(".config/shortlist/config.yaml"),
            PathBuf::from(&home).join(".config/shortlist/config.yml"),
        ];
        for candidate in user_candidates {
            if candidate.exists() {
                return Some(candidate);
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::{FileConfig, LoadedConfig, parse};
    use crate::output::OutputFormat;
    use crate::store::Driver;
    use std::fs;

    #[test]
    fn parses_every_key() {
        let config = parse(
            "driver: configmap\noutput: yaml\ntime_format: \"%Y-%m-%d\"\nmax: 20\nlog_filter: debug\n",
        )
        .unwrap();

        assert_eq!(
            config,
            FileConfig {
                driver: Some(Driver::Configmap),
                output: Some(OutputFormat::Yaml),
                time_format: Some("%Y-%m-%d".to_string()),
                max: Some(20),
                log_filter: Some("debug".to_string()),
            }
        );
    }

    #[test]
    fn empty_file_yields_defaults() {
        assert_eq!(parse("").unwrap(), FileConfig::default());
        assert_eq!(parse("output: json\n").unwrap().driver, None);
    }

    #[test]
    fn rejects_unknown_enum_values() {
        assert!(parse("output: csv\n").is_err());
    }

    #[test]
    fn load_records_the_source_path() {
        let path = std::env::temp_dir().join(format!("shortlist-config-{}.yaml", std::process::id()));
        fs::write(&path, "max: 5\n").unwrap();

        let loaded = LoadedConfig::load(&path).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(loaded.values.max, Some(5));
        assert_eq!(loaded.source, Some(path.display().to_string()));
    }
}
