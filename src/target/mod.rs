pub mod compiler;
pub mod job;
