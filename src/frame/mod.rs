pub(crate) mod fonts;
pub mod layout;
pub mod render;
pub mod spec;
pub(crate) mod variants;
