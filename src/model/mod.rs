pub mod project;
pub mod snapshot;
