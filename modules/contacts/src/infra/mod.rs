pub mod events;
pub mod image;
pub mod memory;
