use thiserror::Error;

use crate::agent::{
    command::{Command, Response},
    page_agent::PageAgent,
};

#[derive(Debug, Error)]
pub enum MessagingError {
    /// The page has no agent loaded (or it stopped listening).
    #[error("Could not establish connection. Receiving end does not exist.")]
    NotListening,
}

/// Request/response channel from the panel to the page agent.
pub trait AgentLink {
    fn send(&mut self, command: Command) -> Result<Response, MessagingError>;
}

impl AgentLink for PageAgent {
    fn send(&mut self, command: Command) -> Result<Response, MessagingError> {
        Ok(self.handle(command))
    }
}

/// A tab without an agent, e.g. a browser-internal page.
pub struct DetachedLink;

impl AgentLink for DetachedLink {
    fn send(&mut self, _command: Command) -> Result<Response, MessagingError> {
        Err(MessagingError::NotListening)
    }
}
