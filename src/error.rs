use thiserror::Error;

use crate::datasets::Dataset;
use crate::reports::ItemUid;

/// Rejected edit of the collection tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("node `{0}` not found")]
    NodeNotFound(ItemUid),

    #[error("`{0}` is a report, only collections can hold other items")]
    NotACollection(ItemUid),

    #[error("report `{0}` must stay inside a collection")]
    DocumentAtRoot(ItemUid),

    #[error("collection `{node}` cannot be moved into `{target}`, which is itself or one of its sub-collections")]
    CycleDetected { node: ItemUid, target: ItemUid },

    #[error("`{0}` is already at the top level")]
    AlreadyAtRoot(ItemUid),
}

/// Rejected change to the selected report columns.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("column `{0}` is already selected")]
    AlreadySelected(String),

    #[error("{dataset} columns cannot be combined with the current selection")]
    IncompatibleDataset { dataset: Dataset },

    #[error("dataset catalog is not loaded yet, columns cannot be checked for compatibility")]
    CatalogUnavailable,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid API URL: {0}")]
    InvalidUrl(String),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server responded with {status}: {body}")]
    Status { status: u16, body: String },

    #[error("server rejected the request: {0}")]
    Rejected(String),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("failed to encode or decode stored state: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to prepare data directory `{path}`: {source}")]
    DataDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file `{path}`: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file `{path}`: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
