pub mod comparison;
pub mod config;
pub mod error;
pub mod loader;
pub mod logging;
pub mod pipeline;
pub mod types;
