pub mod overlay;
pub mod platform;
pub mod state;
