use std::collections::BTreeSet;
use std::sync::mpsc::Receiver;

use tracing::{debug, warn};

use crate::{
    agent::command::{Command, Notification, Response},
    locator::descriptor::ElementDescriptor,
    panel::{
        link::{AgentLink, MessagingError},
        status::{StatusBanner, StatusKind, StatusMessage},
    },
    store::{
        error::StoreError,
        site::{SiteStore, SiteSummary},
    },
};

/// A stored element as listed in the panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HiddenItem {
    pub key: String,
    pub label: String,
    pub descriptor: ElementDescriptor,
}

/// UI-surface controller for the current tab's site.
///
/// Keeps a cache of the stored element keys, drives the page agent through an
/// [`AgentLink`], and reports every outcome on a transient status banner.
pub struct Panel<L: AgentLink> {
    host: String,
    sites: SiteStore,
    link: L,
    hidden: BTreeSet<String>,
    selection_active: bool,
    status: StatusBanner,
}

impl<L: AgentLink> Panel<L> {
    pub fn open(host: &str, sites: SiteStore, link: L) -> Result<Self, StoreError> {
        let mut panel = Self {
            host: host.to_string(),
            sites,
            link,
            hidden: BTreeSet::new(),
            selection_active: false,
            status: StatusBanner::default(),
        };
        panel.reload_hidden()?;
        Ok(panel)
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    pub fn selection_active(&self) -> bool {
        self.selection_active
    }

    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.visible()
    }

    pub fn last_status(&self) -> Option<&StatusMessage> {
        self.status.last()
    }

    /// Count shown on the badge.
    pub fn hidden_count(&self) -> usize {
        self.hidden.len()
    }

    /// Re-read the site record into the key cache.
    pub fn reload_hidden(&mut self) -> Result<(), StoreError> {
        self.hidden = self
            .sites
            .load(&self.host)?
            .iter()
            .map(ElementDescriptor::key)
            .collect();
        Ok(())
    }

    /// Stored elements for this site in stored order.
    pub fn hidden_items(&self) -> Result<Vec<HiddenItem>, StoreError> {
        Ok(self
            .sites
            .load(&self.host)?
            .into_iter()
            .filter_map(|descriptor| {
                let key = descriptor.key();
                self.hidden.contains(&key).then(|| HiddenItem {
                    label: descriptor.display_label(),
                    key,
                    descriptor,
                })
            })
            .collect())
    }

    // ------------------------------------------------------------------
    // Current site
    // ------------------------------------------------------------------

    pub fn toggle_selection(&mut self) {
        match self.link.send(Command::ToggleSelectionMode) {
            Ok(Response::Mode { active }) => {
                self.selection_active = active;
                if active {
                    self.status.post(
                        "Selection mode active! Hover and click elements to hide them. Press ESC to exit.",
                        StatusKind::Info,
                    );
                } else {
                    self.status.post("Selection mode stopped", StatusKind::Success);
                }
            }
            Ok(other) => {
                warn!(?other, "unexpected toggle response");
                self.status
                    .post("Error toggling selection mode: unexpected response", StatusKind::Error);
            }
            Err(e) => {
                self.status
                    .post(format!("Error toggling selection mode: {}", e), StatusKind::Error);
            }
        }
    }

    /// Forget one stored element and show it on the page.
    ///
    /// Storage is updated before the page is told, so a page without an agent
    /// still loses the entry.
    pub fn show_element(&mut self, key: &str) {
        match self.try_show_element(key) {
            Ok(()) => self.status.post("\u{2713} Element shown", StatusKind::Success),
            Err(e) => self.status.post(format!("\u{2717} {}", e), StatusKind::Error),
        }
    }

    fn try_show_element(&mut self, key: &str) -> Result<(), PanelError> {
        self.hidden.remove(key);
        let removed = self.sites.remove_key(&self.host, key)?;

        if let Some(descriptor) = removed {
            self.link.send(Command::ShowElement(descriptor))?;
        }
        Ok(())
    }

    /// Show every stored element and empty the site record.
    pub fn clear_site(&mut self) {
        if self.hidden.is_empty() {
            self.status.post("No hidden elements to clear", StatusKind::Error);
            return;
        }

        match self.try_clear_site() {
            Ok(()) => self
                .status
                .post("\u{2713} All elements shown and cleared", StatusKind::Success),
            Err(e) => self.status.post(
                format!("\u{2717} Error clearing elements: {}", e),
                StatusKind::Error,
            ),
        }
    }

    fn try_clear_site(&mut self) -> Result<(), PanelError> {
        for descriptor in self.sites.load(&self.host)? {
            self.link.send(Command::ShowElement(descriptor))?;
        }
        self.hidden.clear();
        self.sites.clear_site(&self.host)?;
        Ok(())
    }

    /// Turn automatic hiding on or off for this site and reload the page.
    pub fn set_site_disabled(&mut self, disabled: bool) {
        match self.sites.set_disabled(&self.host, disabled) {
            Ok(()) => {
                self.reload_page();
                let text = if disabled {
                    format!("\u{2713} Disabled on {}", self.host)
                } else {
                    format!("\u{2713} Enabled on {}", self.host)
                };
                self.status.post(text, StatusKind::Success);
            }
            Err(e) => self.status.post(format!("\u{2717} {}", e), StatusKind::Error),
        }
    }

    // ------------------------------------------------------------------
    // All sites
    // ------------------------------------------------------------------

    pub fn all_sites(&self) -> Result<Vec<SiteSummary>, StoreError> {
        self.sites.all_sites()
    }

    pub fn reset_site(&mut self, site: &str) {
        if let Err(e) = self.sites.reset_site(site) {
            warn!(site, error = %e, "reset failed");
            self.status
                .post(format!("\u{2717} Error resetting {}", site), StatusKind::Error);
            return;
        }

        if site == self.host {
            self.reload_page();
            if let Err(e) = self.reload_hidden() {
                warn!(error = %e, "could not refresh hidden elements");
            }
        }
        self.status
            .post(format!("\u{2713} Reset {}", site), StatusKind::Success);
    }

    pub fn reset_all(&mut self) {
        let count = match self.sites.all_sites() {
            Ok(sites) => sites.len(),
            Err(e) => {
                warn!(error = %e, "could not list sites");
                0
            }
        };
        if count == 0 {
            self.status.post("No sites to reset", StatusKind::Info);
            return;
        }

        if let Err(e) = self.sites.reset_all() {
            warn!(error = %e, "reset all failed");
            self.status
                .post("\u{2717} Error resetting all sites", StatusKind::Error);
            return;
        }

        self.reload_page();
        self.hidden.clear();
        self.status.post("\u{2713} All sites reset", StatusKind::Success);
    }

    fn reload_page(&mut self) {
        match self.link.send(Command::ReloadPage) {
            Ok(_) => debug!(host = self.host.as_str(), "page reloaded"),
            Err(MessagingError::NotListening) => {
                debug!("no agent on the page, reload skipped")
            }
        }
    }

    // ------------------------------------------------------------------
    // Notifications
    // ------------------------------------------------------------------

    pub fn on_notification(&mut self, notification: &Notification) {
        match notification {
            Notification::ElementHidden { .. } => match self.reload_hidden() {
                Ok(()) => self.status.post("Element hidden", StatusKind::Success),
                Err(e) => self.status.post(format!("\u{2717} {}", e), StatusKind::Error),
            },
            Notification::SelectionModeOff => {
                self.selection_active = false;
            }
        }
    }

    /// Handle every notification waiting on `rx`.
    pub fn drain(&mut self, rx: &Receiver<Notification>) -> usize {
        let mut handled = 0;
        while let Ok(notification) = rx.try_recv() {
            self.on_notification(&notification);
            handled += 1;
        }
        handled
    }
}

#[derive(Debug, thiserror::Error)]
enum PanelError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Messaging(#[from] MessagingError),
}
