pub mod mapper;
pub mod pin;
pub mod plan;
