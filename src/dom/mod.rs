pub mod document;
pub mod html;
pub mod selector;
pub mod xpath;
