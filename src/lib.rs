pub mod models;
pub mod views;
pub mod controllers;
pub mod cli;
pub mod error;
pub mod logging;

// Re-exports for convenience
pub use models::{BlogApi, Config, Document, HttpApi, Post, SessionStore};
pub use controllers::start_app;
pub use error::BlogError;
