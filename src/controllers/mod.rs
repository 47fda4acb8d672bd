pub mod access;
pub mod latest;
pub mod app_controller;
pub mod editor_controller;
pub mod post_controller;
pub mod session_controller;
pub mod story_controller;

// Re-export key functions
pub use access::{gate, Access, Route};
pub use app_controller::start_app;
