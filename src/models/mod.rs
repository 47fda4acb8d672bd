pub mod document;
pub mod render;
pub mod editor;
pub mod post;
pub mod story;
pub mod user;
pub mod storage;
pub mod session;
pub mod client;
pub mod repository;
pub mod config;

// Re-export important structs for convenience
pub use document::{Block, BlockBody, Content, Document, ListStyle};
pub use render::{render, Node};
pub use editor::{BlockEditor, BlockKind, Edit, EditError, EditorHandle};
pub use post::{Author, NewPost, Post, PostUpdate};
pub use story::{NewStory, Story, ViewedStories};
pub use user::{Credentials, LoginRequest, RegisterRequest, User};
pub use storage::{FileStorage, MemoryStorage, Storage};
pub use session::{SessionState, SessionStore};
pub use client::{BlogApi, HttpApi};
pub use repository::{confirm_delete, Confirmed, PostRepository, StoryRepository};
pub use config::Config;
