pub mod aggregate;
pub mod editor;
pub mod status;
