pub mod document;
pub mod entry;
