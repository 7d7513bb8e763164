//! Crate-level error types.
//!
//! Only startup paths (config, catalog, store) return these to the caller.
//! The per-request selection path recovers from every failure locally and
//! reports an unfilled slot instead.

use std::path::PathBuf;

use thiserror::Error;

/// Failure talking to the durable key-value store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("failed to create store directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failure loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Failure loading a recipe catalog file.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid catalog: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("duplicate recipe id {id} in {slot} pool")]
    DuplicateId { slot: String, id: u64 },
}

/// Failure fetching from the remote recipe API.
///
/// Never crosses the `RemoteRecipeSource` boundary; the client logs it and
/// reports "no recipe".
#[derive(Debug, Error)]
pub enum RemoteError {
    /// A TCP-level connection could not be established, or the request timed out.
    #[error("request to {url} failed: {detail}")]
    Connect { url: String, detail: String },
    /// The server replied with a non-2xx status code.
    #[error("HTTP {status} from {url}")]
    Http { status: u16, url: String },
    /// The body could not be decoded as the expected JSON shape.
    #[error("could not decode recipe response: {0}")]
    Json(String),
}

/// Top-level error for assembling a planner session.
#[derive(Debug, Error)]
pub enum MealError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}
