pub mod link;
pub mod panel;
pub mod status;
