use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use log::info;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    #[default]
    Console,
    Log,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub input_path: PathBuf,
    pub output_dir: PathBuf,
    pub charts_subdir: PathBuf,
    pub recipients: Vec<String>,
    pub top_products: usize,
    pub channel: ChannelKind,
    /// TrueType font used for chart titles and labels.
    pub chart_font: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            input_path: PathBuf::from("data").join("sales_data.csv"),
            output_dir: PathBuf::from("output"),
            charts_subdir: PathBuf::from("charts"),
            recipients: vec!["alice@example.com".to_string(), "bob@example.com".to_string()],
            top_products: 10,
            channel: ChannelKind::Console,
            chart_font: None,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&contents)?;
        info!("loaded config from {}", path.display());

        Ok(config)
    }

    pub fn charts_dir(&self) -> PathBuf {
        self.output_dir.join(&self.charts_subdir)
    }

    /// The workbook path for a run on `date`, e.g. `output/weekly_report_20240115.xlsx`.
    pub fn report_path(&self, date: NaiveDate) -> PathBuf {
        self.output_dir
            .join(format!("weekly_report_{}.xlsx", date.format("%Y%m%d")))
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    use super::*;

    #[test]
    fn test_default_paths() {
        let config = Config::default();
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();

        assert_eq!(config.charts_dir(), PathBuf::from("output/charts"));
        assert_eq!(config.report_path(date), PathBuf::from("output/weekly_report_20240115.xlsx"));
        assert_eq!(config.top_products, 10);
        assert_eq!(config.recipients.len(), 2);
    }

    #[test]
    fn test_load_partial_config() -> Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        write!(
            file,
            "input_path = \"in/orders.csv\"\nrecipients = [\"ops@example.com\"]\nchannel = \"log\"\n"
        )?;

        let config = Config::load(file.path())?;

        assert_eq!(config.input_path, PathBuf::from("in/orders.csv"));
        assert_eq!(config.recipients, vec!["ops@example.com".to_string()]);
        assert_eq!(config.channel, ChannelKind::Log);
        assert_eq!(config.output_dir, PathBuf::from("output"));
        assert_eq!(config.chart_font, None);

        Ok(())
    }

    #[test]
    fn test_load_invalid_config() -> Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        writeln!(file, "top_products = \"many\"")?;

        assert!(matches!(Config::load(file.path()), Err(ConfigError::Parse(_))));
        assert!(matches!(
            Config::load(Path::new("/definitely/not/here.toml")),
            Err(ConfigError::Io { .. })
        ));

        Ok(())
    }
}
