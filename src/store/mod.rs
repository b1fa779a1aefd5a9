pub mod error;
pub mod site;
pub mod store;
