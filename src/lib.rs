pub mod args;
pub mod clients;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod logging;
pub mod sandbox;
pub mod scoring;
pub mod server;
pub mod tools;
pub mod tree_sitter_analyzer;
pub mod types;

// Re-export commonly used items for convenience
pub use config::AppConfig;
pub use errors::AppError;
