pub mod describe;
pub mod descriptor;
pub mod markers;
pub mod resolve;
pub mod visibility;
