use std::{
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

use bytes::{Bytes, BytesMut};
use futures::{future::join_all, StreamExt};
use reqwest::{Client, Response, Url};
use serde_json::Value;

use crate::{
    error::FetchError,
    normalize::Node,
    progress::{ProgressBar, ProgressBarManager},
};

/// Name of the cache-defeating query parameter.
pub const CACHE_BUST_PARAM: &str = "_";

/// One JSON document a page depends on.
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoint {
    pub path: String,
    /// Returned instead of `null` when loading fails.
    pub fallback: Option<Value>,
}

impl Endpoint {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            fallback: None,
        }
    }

    pub fn with_fallback(mut self, fallback: Value) -> Self {
        self.fallback = Some(fallback);
        self
    }
}

/// Decoded JSON of one endpoint, or its fallback.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub path: String,
    pub value: Value,
}

impl Snapshot {
    pub fn new(path: impl Into<String>, value: Value) -> Self {
        Self {
            path: path.into(),
            value,
        }
    }

    pub fn root(&self) -> Node<'_> {
        Node::new(&self.value)
    }
}

#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    base: Url,
    bar: ProgressBarManager,
}

impl Fetcher {
    pub fn new(client: Client, base: Url, bar: ProgressBarManager) -> Self {
        Self { client, base, bar }
    }

    /// Absolute URL for `path` with a fresh cache-busting token.
    pub fn resolve(&self, path: &str) -> Result<Url, FetchError> {
        let mut url = self.base.join(path).map_err(|e| FetchError::Endpoint {
            path: path.to_string(),
            reason: e.to_string(),
        })?;
        let token = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        url.query_pairs_mut()
            .append_pair(CACHE_BUST_PARAM, &token.to_string());
        Ok(url)
    }

    /// Loads one endpoint. Failures are logged and replaced by the
    /// endpoint's fallback, or `null`.
    pub async fn fetch(&self, endpoint: &Endpoint, cycle: &Arc<ProgressBar>) -> Snapshot {
        let value = match self.try_fetch(&endpoint.path, cycle).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(path = %endpoint.path, "{e}");
                endpoint.fallback.clone().unwrap_or(Value::Null)
            }
        };
        cycle.inc(1);
        Snapshot::new(endpoint.path.clone(), value)
    }

    /// Loads all endpoints concurrently; results keep the input order.
    pub async fn fetch_all(&self, label: &str, endpoints: &[Endpoint]) -> Vec<Snapshot> {
        let cycle = self
            .bar
            .add_cycle(format!("Refreshing {label}"), endpoints.len() as u64);
        let snapshots = join_all(endpoints.iter().map(|e| self.fetch(e, &cycle))).await;
        cycle.finish(format!("Refreshed {label}"));
        snapshots
    }

    pub async fn try_fetch(&self, path: &str, cycle: &Arc<ProgressBar>) -> Result<Value, FetchError> {
        let url = self.resolve(path)?;
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        let pb = self.bar.add_download(cycle, path.to_string());
        let payload = self.download_with_progress(response, &pb).await.map_err(|source| {
            FetchError::Transport {
                url: url.to_string(),
                source,
            }
        })?;
        serde_json::from_slice(&payload).map_err(|source| FetchError::Parse {
            url: url.to_string(),
            source,
        })
    }

    async fn download_with_progress(
        &self,
        response: Response,
        pb: &Arc<ProgressBar>,
    ) -> Result<Bytes, reqwest::Error> {
        pb.update_template(response.content_length());

        let mut downloaded: u64 = 0;
        let mut stream = response.bytes_stream();
        let mut payload = BytesMut::new();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            downloaded += chunk.len() as u64;
            payload.extend_from_slice(&chunk);
            pb.set_position(downloaded);
        }

        Ok(payload.freeze())
    }
}
