pub mod tui;
pub mod widgets;
pub mod blocks;
pub mod dashboard;
pub mod detail;
pub mod stories;
pub mod auth;
pub mod compose;

pub use widgets::{Notices, StatefulList};
