pub mod channel;
pub mod clip;
pub mod ease;
