pub mod draft;
pub mod publish;
