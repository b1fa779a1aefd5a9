pub mod application;
pub mod command;
pub mod error;
pub mod notify;
pub mod page_agent;
