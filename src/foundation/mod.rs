pub mod error;
pub mod style;
