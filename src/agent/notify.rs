use std::sync::mpsc::Sender;

use thiserror::Error;
use tracing::debug;

use crate::agent::command::Notification;

#[derive(Debug, Error)]
pub enum DeliveryError {
    /// Nobody is listening; the panel is usually closed.
    #[error("no listener for notifications")]
    NoListener,
}

pub trait Notifier {
    fn notify(&self, notification: &Notification) -> Result<(), DeliveryError>;
}

/// No UI surface attached.
pub struct Unattended;

impl Notifier for Unattended {
    fn notify(&self, _notification: &Notification) -> Result<(), DeliveryError> {
        Err(DeliveryError::NoListener)
    }
}

/// Delivers into an in-process channel; a dropped receiver means no listener.
pub struct ChannelNotifier {
    tx: Sender<Notification>,
}

impl ChannelNotifier {
    pub fn new(tx: Sender<Notification>) -> Self {
        Self { tx }
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notification: &Notification) -> Result<(), DeliveryError> {
        self.tx
            .send(notification.clone())
            .map_err(|_| DeliveryError::NoListener)
    }
}

/// Send without caring whether anyone receives it.
pub fn notify_best_effort(notifier: &dyn Notifier, notification: &Notification) {
    match notifier.notify(notification) {
        Ok(()) => debug!(?notification, "notification delivered"),
        Err(DeliveryError::NoListener) => {
            debug!(?notification, "no listener, notification dropped")
        }
    }
}
