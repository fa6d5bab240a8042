use reqwest::StatusCode;
use thiserror::Error;

/// Why a snapshot could not be loaded. Never escapes the fetcher; it is
/// logged and replaced by the endpoint's fallback.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid endpoint {path}: {reason}")]
    Endpoint { path: String, reason: String },
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered with status {status}")]
    Status { url: String, status: StatusCode },
    #[error("{url} did not contain valid JSON: {source}")]
    Parse {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A page could not produce its main content. Shown inline, in place of
/// that content.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PageError {
    #[error("Error: Could not load data from {path}")]
    MissingCollection { path: String },
    #[error("Error: No {param} specified")]
    MissingParam { param: &'static str },
}
