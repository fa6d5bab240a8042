use std::{collections::HashMap, time::Duration};

use clap::Args;
use serde::{Deserialize, Serialize};

const DEFAULT_BASE_URL: &str = "http://localhost/";

#[derive(Debug, Clone, Serialize, Deserialize, Default, Args)]
pub struct Config {
    /// Where the portal serves its JSON snapshots.
    #[arg(short, long, global = true)]
    base_url: Option<String>,
    /// Whether to show download progress bars.
    #[arg(short, long, global = true)]
    progress: Option<bool>,
    /// Log filter used when RUST_LOG is not set.
    #[arg(long, global = true)]
    log_level: Option<String>,
    /// Override the page's refresh interval. in seconds.
    #[arg(long, global = true)]
    refresh_interval: Option<u64>,
    /// Skip a refresh while the previous one is still running.
    #[arg(long, global = true)]
    skip_overlap: Option<bool>,
    /// Extra class abbreviations, e.g. `WAR = "Warlock"`.
    #[arg(skip)]
    class_names: Option<HashMap<String, String>>,
}

impl Config {
    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn progress(&self) -> bool {
        self.progress.unwrap_or(false)
    }

    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or("warn")
    }

    /// The configured interval, or the page's own one.
    pub fn refresh_interval(&self, page_default: Duration) -> Duration {
        self.refresh_interval
            .map(Duration::from_secs)
            .unwrap_or(page_default)
    }

    pub fn skip_overlap(&self) -> bool {
        self.skip_overlap.unwrap_or(false)
    }

    pub fn class_names(&self) -> impl Iterator<Item = (&String, &String)> {
        self.class_names.iter().flatten()
    }

    #[cfg(test)]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn extends(self, other: Config) -> Self {
        Self {
            base_url: other.base_url.or(self.base_url),
            progress: other.progress.or(self.progress),
            log_level: other.log_level.or(self.log_level),
            refresh_interval: other.refresh_interval.or(self.refresh_interval),
            skip_overlap: other.skip_overlap.or(self.skip_overlap),
            class_names: match (self.class_names, other.class_names) {
                (Some(mut base), Some(extra)) => {
                    base.extend(extra);
                    Some(base)
                }
                (base, extra) => extra.or(base),
            },
        }
    }

    /// File settings overridden by whatever was given on the command line.
    pub fn load(from_args: Config) -> anyhow::Result<Self> {
        Ok(Self::load_from_file()?.extends(from_args))
    }

    fn load_from_file() -> anyhow::Result<Self> {
        let base_dir = xdg::BaseDirectories::with_prefix("pvpdash")?;
        let config_file = base_dir.get_config_file("config.toml");
        if config_file.exists() {
            let config = std::fs::read_to_string(config_file)?;
            Self::from_toml(&config)
        } else {
            Ok(Self::default())
        }
    }

    fn from_toml(raw: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(raw)?)
    }
}
