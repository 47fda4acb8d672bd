//! Post and story operations bound to the current session token.

use std::sync::Arc;

use crate::error::BlogError;
use crate::models::client::BlogApi;
use crate::models::post::{NewPost, Post, PostUpdate};
use crate::models::story::{NewStory, Story};

/// Proof that the user agreed to delete a specific post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmed {
    post_id: String,
}

impl Confirmed {
    pub fn post_id(&self) -> &str {
        &self.post_id
    }
}

/// Only an explicit yes confirms.
pub fn confirm_delete(post_id: &str, answer: &str) -> Option<Confirmed> {
    match answer.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Some(Confirmed { post_id: post_id.to_string() }),
        _ => None,
    }
}

pub struct PostRepository<A: BlogApi + ?Sized> {
    api: Arc<A>,
    token: Option<String>,
}

impl<A: BlogApi + ?Sized> Clone for PostRepository<A> {
    fn clone(&self) -> Self {
        Self { api: Arc::clone(&self.api), token: self.token.clone() }
    }
}

impl<A: BlogApi + ?Sized> PostRepository<A> {
    pub fn new(api: Arc<A>, token: Option<String>) -> Self {
        Self { api, token }
    }

    pub async fn list_posts(&self) -> Result<Vec<Post>, BlogError> {
        self.api.list_posts(self.token.as_deref()).await
    }

    pub async fn get_post(&self, id: &str) -> Result<Post, BlogError> {
        self.api.get_post(self.token.as_deref(), id).await
    }

    pub async fn create_post(&self, post: &NewPost) -> Result<Post, BlogError> {
        post.validate()?;
        let created = self.api.create_post(self.token.as_deref(), post).await?;
        log::info!("created post {}", created.id);
        Ok(created)
    }

    pub async fn update_post(&self, id: &str, update: &PostUpdate) -> Result<Post, BlogError> {
        update.validate()?;
        let updated = self.api.update_post(self.token.as_deref(), id, update).await?;
        log::info!("updated post {}", updated.id);
        Ok(updated)
    }

    pub async fn delete_post(&self, confirmed: Confirmed) -> Result<(), BlogError> {
        self.api.delete_post(self.token.as_deref(), confirmed.post_id()).await?;
        log::info!("deleted post {}", confirmed.post_id());
        Ok(())
    }
}

pub struct StoryRepository<A: BlogApi + ?Sized> {
    api: Arc<A>,
    token: Option<String>,
}

impl<A: BlogApi + ?Sized> Clone for StoryRepository<A> {
    fn clone(&self) -> Self {
        Self { api: Arc::clone(&self.api), token: self.token.clone() }
    }
}

impl<A: BlogApi + ?Sized> StoryRepository<A> {
    pub fn new(api: Arc<A>, token: Option<String>) -> Self {
        Self { api, token }
    }

    pub async fn list_stories(&self) -> Result<Vec<Story>, BlogError> {
        self.api.list_stories(self.token.as_deref()).await
    }

    pub async fn create_story(&self, story: &NewStory) -> Result<Story, BlogError> {
        story.validate()?;
        let created = self.api.create_story(self.token.as_deref(), story).await?;
        log::info!("created story {}", created.id);
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_yes_confirms() {
        assert_eq!(confirm_delete("p1", "y").map(|c| c.post_id().to_string()), Some("p1".into()));
        assert!(confirm_delete("p1", " YES ").is_some());
        assert!(confirm_delete("p1", "").is_none());
        assert!(confirm_delete("p1", "n").is_none());
        assert!(confirm_delete("p1", "sure").is_none());
    }
}
