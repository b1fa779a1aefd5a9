pub mod event;
pub mod overlay;
pub mod selection;
