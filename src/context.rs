use anyhow::Context as _;
use reqwest::{Client, Url};

use crate::{config::Config, fetch::Fetcher, normalize, progress::ProgressBarManager};

#[derive(Debug)]
pub struct Context {
    /// The configuration.
    pub config: Config,
    /// The snapshot fetcher.
    pub fetcher: Fetcher,
    /// Class abbreviations, built-in table plus config overrides.
    pub classes: normalize::Lookup,
}

impl Context {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let base = Url::parse(config.base_url())
            .with_context(|| format!("invalid base url {}", config.base_url()))?;
        let bar = ProgressBarManager::new(&config);
        let fetcher = Fetcher::new(Client::new(), base, bar);

        let mut classes = normalize::class_names();
        classes.extend(config.class_names());

        Ok(Self {
            config,
            fetcher,
            classes,
        })
    }
}
