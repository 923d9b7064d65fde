pub mod handlers;
pub mod range;
