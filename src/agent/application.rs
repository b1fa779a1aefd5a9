use std::thread;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info};

use crate::{
    dom::document::Document,
    locator::{
        resolve::{Tier, resolve},
        visibility::{Visibility, apply_visibility},
    },
    session::overlay::inject_styles,
    store::{error::StoreError, site::SiteStore},
    trace::{logger::TraceLogger, trace::TraceEvent},
};

/// Delay before re-applying so late-rendered content has mounted.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedDescriptor {
    pub key: String,
    pub tier: Option<Tier>,
    pub matched: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApplicationReport {
    pub host: String,
    pub disabled: bool,
    pub applied: Vec<AppliedDescriptor>,
}

impl ApplicationReport {
    /// Number of elements hidden across all descriptors.
    pub fn hidden_count(&self) -> usize {
        self.applied.iter().map(|a| a.matched).sum()
    }

    /// Descriptors that matched nothing on this page.
    pub fn misses(&self) -> impl Iterator<Item = &AppliedDescriptor> {
        self.applied.iter().filter(|a| a.matched == 0)
    }
}

/// Page-load pass re-hiding every stored element for a site.
#[derive(Debug, Clone)]
pub struct ApplicationPass {
    pub settle_delay: Duration,
}

impl Default for ApplicationPass {
    fn default() -> Self {
        Self {
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }
}

impl ApplicationPass {
    pub fn new(settle_delay: Duration) -> Self {
        Self { settle_delay }
    }

    /// Hide every stored descriptor for `host`, in stored order.
    ///
    /// A disabled site is left untouched. A descriptor that matches nothing
    /// does not stop the others.
    pub fn run(
        &self,
        doc: &mut Document,
        sites: &SiteStore,
        host: &str,
        tracer: &TraceLogger,
    ) -> Result<ApplicationReport, StoreError> {
        inject_styles(doc);

        let disabled = sites.is_disabled(host)?;
        let descriptors = sites.load(host)?;
        debug!(host, disabled, stored = descriptors.len(), "application pass");

        let mut report = ApplicationReport {
            host: host.to_string(),
            disabled,
            applied: Vec::new(),
        };

        if disabled || descriptors.is_empty() {
            return Ok(report);
        }

        if !self.settle_delay.is_zero() {
            thread::sleep(self.settle_delay);
        }

        for descriptor in &descriptors {
            let resolution = resolve(doc, descriptor);
            apply_visibility(doc, &resolution.nodes, Visibility::Hidden);
            tracer.log(&TraceEvent::now(host, "apply", descriptor).with_resolution(&resolution));

            report.applied.push(AppliedDescriptor {
                key: descriptor.key(),
                tier: resolution.tier,
                matched: resolution.nodes.len(),
            });
        }

        info!(
            host,
            descriptors = report.applied.len(),
            hidden = report.hidden_count(),
            "stored elements applied"
        );
        Ok(report)
    }
}
