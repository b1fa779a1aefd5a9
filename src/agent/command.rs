use serde::{Deserialize, Serialize};

use crate::locator::descriptor::ElementDescriptor;

/// Commands the panel sends to the page agent.
///
/// Wire form is a flat JSON object tagged by `action`; descriptor payloads are
/// flattened next to the tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum Command {
    ToggleSelectionMode,
    HideElement(ElementDescriptor),
    ShowElement(ElementDescriptor),
    ReloadPage,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::ToggleSelectionMode => "toggle-selection-mode",
            Command::HideElement(_) => "hide-element",
            Command::ShowElement(_) => "show-element",
            Command::ReloadPage => "reload-page",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
    Mode {
        active: bool,
    },
    Ack {
        success: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
}

impl Response {
    pub fn ok() -> Self {
        Response::Ack {
            success: true,
            error: None,
        }
    }

    pub fn failed(error: impl ToString) -> Self {
        Response::Ack {
            success: false,
            error: Some(error.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        match self {
            Response::Mode { .. } => true,
            Response::Ack { success, .. } => *success,
        }
    }
}

/// Fire-and-forget messages from the page agent to the panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum Notification {
    ElementHidden { element: ElementDescriptor },
    SelectionModeOff,
}
