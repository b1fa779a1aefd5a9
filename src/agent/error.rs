use thiserror::Error;

use crate::store::error::StoreError;

#[derive(Debug, Error)]
pub enum AgentError {
    /// Page file could not be read
    #[error("failed to read page '{path}': {source}")]
    PageRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// HTTP fetch of a live page failed
    #[error("failed to fetch '{url}': {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// URL without a usable hostname
    #[error("'{0}' is not a page URL with a hostname")]
    InvalidUrl(String),

    /// Script target expression matched nothing
    #[error("target {0} matched no element")]
    TargetNotFound(String),

    /// Script target expression could not be parsed
    #[error("invalid target: {0}")]
    InvalidTarget(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}
