use crate::{dom::document::NodeId, locator::descriptor::ElementDescriptor};

pub const ESCAPE_KEY: &str = "Escape";

/// Page events the agent reacts to, delivered one at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomEvent {
    PointerMove { target: NodeId, x: i32, y: i32 },
    Click { target: NodeId },
    KeyDown { key: String },
    /// The document finished loading.
    ContentLoaded,
}

/// What handling an event did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventOutcome {
    /// Default action and propagation were suppressed.
    pub default_prevented: bool,
    /// Descriptor committed by a selection click.
    pub committed: Option<ElementDescriptor>,
    /// Selection mode was turned off by this event.
    pub deactivated: bool,
}

impl EventOutcome {
    pub fn ignored() -> Self {
        Self::default()
    }
}
