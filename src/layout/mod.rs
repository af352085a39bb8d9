pub mod engine;
pub mod metrics;
