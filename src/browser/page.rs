use std::fs;
use std::time::Duration;

use tracing::{debug, info};
use url::Url;

use crate::{
    agent::error::AgentError,
    dom::{document::Document, html::parse_html},
};

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);
const USER_AGENT: &str = concat!("clean-my-web/", env!("CARGO_PKG_VERSION"));

/// A loaded page: its hostname and parsed document.
#[derive(Debug, Clone)]
pub struct LoadedPage {
    pub host: String,
    pub document: Document,
}

pub fn load_page_file(path: &str) -> Result<Document, AgentError> {
    let source = fs::read_to_string(path).map_err(|source| AgentError::PageRead {
        path: path.to_string(),
        source,
    })?;
    debug!(path, bytes = source.len(), "page read");
    Ok(parse_html(&source))
}

/// Fetch a live page over HTTP and parse it.
pub fn fetch_page(url: &str) -> Result<LoadedPage, AgentError> {
    let host = host_of(url)?;
    let fetch_err = |source: reqwest::Error| AgentError::Fetch {
        url: url.to_string(),
        source,
    };

    let client = reqwest::blocking::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .user_agent(USER_AGENT)
        .build()
        .map_err(fetch_err)?;

    let body = client
        .get(url)
        .send()
        .and_then(|r| r.error_for_status())
        .and_then(|r| r.text())
        .map_err(fetch_err)?;

    info!(url, host = host.as_str(), bytes = body.len(), "page fetched");
    Ok(LoadedPage {
        host,
        document: parse_html(&body),
    })
}

/// Hostname of a page URL, the key every site record is stored under.
pub fn host_of(url: &str) -> Result<String, AgentError> {
    let parsed = Url::parse(url).map_err(|_| AgentError::InvalidUrl(url.to_string()))?;
    parsed
        .host_str()
        .filter(|h| !h.is_empty())
        .map(str::to_string)
        .ok_or_else(|| AgentError::InvalidUrl(url.to_string()))
}
