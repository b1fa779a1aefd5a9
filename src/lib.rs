pub mod agent;
pub mod browser;
pub mod cli;
pub mod dom;
pub mod locator;
pub mod panel;
pub mod report;
pub mod script;
pub mod session;
pub mod store;
pub mod trace;
