use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::locator::{
    descriptor::ElementDescriptor,
    resolve::{Resolution, Tier},
};

/// One line of the resolution journal.
#[derive(Debug, Serialize)]
pub struct TraceEvent {
    pub timestamp_ms: u128,
    pub host: String,

    /// `apply`, `hide`, `show` or `select`.
    pub operation: String,

    pub tier: Option<Tier>,
    pub matched: usize,

    pub unique_id: Option<String>,
    pub xpath: Option<String>,
    pub key: String,
}

impl TraceEvent {
    pub fn now(host: &str, operation: &str, descriptor: &ElementDescriptor) -> Self {
        Self {
            timestamp_ms: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis())
                .unwrap_or_default(),
            host: host.to_string(),
            operation: operation.to_string(),
            tier: None,
            matched: 0,
            unique_id: descriptor.unique_id.clone(),
            xpath: descriptor.xpath.clone(),
            key: descriptor.key(),
        }
    }

    pub fn with_resolution(mut self, resolution: &Resolution) -> Self {
        self.tier = resolution.tier;
        self.matched = resolution.nodes.len();
        self
    }

    pub fn with_matched(mut self, matched: usize) -> Self {
        self.matched = matched;
        self
    }
}
