use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::Deserialize;
use tracing::debug;

use weigh_core::config::{RemoteConfig, TrackerConfig};

const STORE_FILENAME: &str = "weight-tracker.db";
const EXPORT_FILENAME: &str = "weights.csv";
const CHART_FILENAME: &str = "weights.svg";
const CREDENTIALS_FILENAME: &str = "credentials.toml";

/// Optional overrides read from `config.toml`. Relative paths are taken
/// from the data directory.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    store_path: Option<PathBuf>,
    export_path: Option<PathBuf>,
    chart_path: Option<PathBuf>,
    remote: Option<RemoteConfig>,
}

pub struct Config {
    pub data_dir: PathBuf,
    pub tracker: TrackerConfig,
    pub remote: RemoteConfig,
}

impl Config {
    pub fn load() -> Result<Self> {
        let proj_dirs =
            ProjectDirs::from("", "", "weigh").context("Could not determine home directory")?;

        let data_dir = proj_dirs.data_dir().to_path_buf();
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

        Self::from_file(data_dir, &proj_dirs.config_dir().join("config.toml"))
    }

    fn from_file(data_dir: PathBuf, config_path: &Path) -> Result<Self> {
        let file = if config_path.exists() {
            debug!(path = %config_path.display(), "reading config");
            let text = std::fs::read_to_string(config_path)
                .with_context(|| format!("Failed to read {}", config_path.display()))?;
            toml::from_str(&text)
                .with_context(|| format!("Invalid config file: {}", config_path.display()))?
        } else {
            FileConfig::default()
        };
        Ok(Self::resolve(data_dir, file))
    }

    fn resolve(data_dir: PathBuf, file: FileConfig) -> Self {
        let under_data = |p: Option<PathBuf>, default: &str| match p {
            Some(p) if p.is_absolute() => p,
            Some(p) => data_dir.join(p),
            None => data_dir.join(default),
        };

        let remote = file.remote.unwrap_or_default();
        let tracker = TrackerConfig {
            store_path: under_data(file.store_path, STORE_FILENAME),
            export_path: under_data(file.export_path, EXPORT_FILENAME),
            chart_path: under_data(file.chart_path, CHART_FILENAME),
            remote_name: remote.name().to_string(),
        };

        Config {
            data_dir,
            tracker,
            remote,
        }
    }

    pub fn credentials_path(&self) -> PathBuf {
        self.data_dir.join(CREDENTIALS_FILENAME)
    }
}
