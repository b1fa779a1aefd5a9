use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::{
    locator::descriptor::ElementDescriptor,
    store::{error::StoreError, store::Store},
};

/// Key of the per-site disabled flag, a sibling of the site record.
pub fn disabled_key(host: &str) -> String {
    format!("{}_disabled", host)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteSummary {
    pub host: String,
    pub descriptors: Vec<ElementDescriptor>,
    pub disabled: bool,
}

/// Site records and disabled flags on top of a raw [`Store`].
#[derive(Clone)]
pub struct SiteStore {
    store: Arc<dyn Store>,
}

impl SiteStore {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub fn raw(&self) -> &Arc<dyn Store> {
        &self.store
    }

    /// Stored descriptors for `host`, in insertion order.
    ///
    /// Entries that no longer decode are skipped with a warning.
    pub fn load(&self, host: &str) -> Result<Vec<ElementDescriptor>, StoreError> {
        let Some(value) = self.store.get(host)? else {
            return Ok(Vec::new());
        };
        Ok(decode_record(host, value))
    }

    pub fn save(&self, host: &str, descriptors: &[ElementDescriptor]) -> Result<(), StoreError> {
        let value = serde_json::to_value(descriptors).map_err(|e| StoreError::Encode {
            key: host.to_string(),
            source: e,
        })?;
        self.store.set(host, value)?;
        debug!(host, count = descriptors.len(), "saved site record");
        Ok(())
    }

    /// Append unless a descriptor with the same unique id is already stored.
    /// Returns whether the record changed.
    pub fn append(&self, host: &str, descriptor: &ElementDescriptor) -> Result<bool, StoreError> {
        let mut descriptors = self.load(host)?;

        let duplicate = descriptor.unique_id.is_some()
            && descriptors.iter().any(|d| d.unique_id == descriptor.unique_id);
        if duplicate {
            debug!(host, unique_id = ?descriptor.unique_id, "descriptor already stored");
            return Ok(false);
        }

        descriptors.push(descriptor.clone());
        self.save(host, &descriptors)?;
        info!(host, key = descriptor.key().as_str(), "element saved");
        Ok(true)
    }

    /// Drop every descriptor whose key equals `key`; returns the first removed.
    pub fn remove_key(&self, host: &str, key: &str) -> Result<Option<ElementDescriptor>, StoreError> {
        let descriptors = self.load(host)?;
        let (removed, kept): (Vec<_>, Vec<_>) =
            descriptors.into_iter().partition(|d| d.key() == key);

        if removed.is_empty() {
            return Ok(None);
        }
        self.save(host, &kept)?;
        Ok(removed.into_iter().next())
    }

    /// Empty the record but keep the key.
    pub fn clear_site(&self, host: &str) -> Result<(), StoreError> {
        self.save(host, &[])
    }

    /// Delete the record entirely.
    pub fn reset_site(&self, host: &str) -> Result<(), StoreError> {
        self.store.remove(host)?;
        info!(host, "site reset");
        Ok(())
    }

    /// Delete every record and every flag.
    pub fn reset_all(&self) -> Result<(), StoreError> {
        self.store.clear()?;
        info!("all sites reset");
        Ok(())
    }

    pub fn is_disabled(&self, host: &str) -> Result<bool, StoreError> {
        Ok(self
            .store
            .get(&disabled_key(host))?
            .and_then(|v| v.as_bool())
            .unwrap_or(false))
    }

    pub fn set_disabled(&self, host: &str, disabled: bool) -> Result<(), StoreError> {
        self.store.set(&disabled_key(host), Value::Bool(disabled))?;
        info!(host, disabled, "site flag updated");
        Ok(())
    }

    /// Every site with a non-empty record. Non-array bindings are ignored.
    pub fn all_sites(&self) -> Result<Vec<SiteSummary>, StoreError> {
        let mut sites = Vec::new();
        for (key, value) in self.store.entries()? {
            if !value.as_array().is_some_and(|a| !a.is_empty()) {
                continue;
            }
            let descriptors = decode_record(&key, value);
            let disabled = self.is_disabled(&key)?;
            sites.push(SiteSummary {
                host: key,
                descriptors,
                disabled,
            });
        }
        Ok(sites)
    }
}

fn decode_record(host: &str, value: Value) -> Vec<ElementDescriptor> {
    let Value::Array(items) = value else {
        warn!(host, "site record is not an array");
        return Vec::new();
    };

    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(descriptor) => Some(descriptor),
            Err(e) => {
                warn!(host, error = %e, "skipping undecodable descriptor");
                None
            }
        })
        .collect()
}
