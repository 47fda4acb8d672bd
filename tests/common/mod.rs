#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;

use blogterm::error::BlogError;
use blogterm::models::client::BlogApi;
use blogterm::models::post::{NewPost, Post, PostUpdate};
use blogterm::models::story::{NewStory, Story};
use blogterm::models::user::{Credentials, LoginRequest, RegisterRequest};

pub const TOKEN: &str = "good-token";
pub const USER_ID: &str = "u1";
pub const USERNAME: &str = "ann";

/// In-memory blog service. Only `TOKEN` is accepted for writes.
#[derive(Default)]
pub struct FakeApi {
    posts: Mutex<BTreeMap<String, Post>>,
    stories: Mutex<Vec<Story>>,
    next_id: Mutex<u32>,
    pub reject_verification: bool,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rejecting_sessions() -> Self {
        FakeApi { reject_verification: true, ..Self::default() }
    }

    pub fn credentials() -> Credentials {
        Credentials {
            token: TOKEN.to_string(),
            user_id: USER_ID.to_string(),
            username: USERNAME.to_string(),
        }
    }

    pub fn seed_post(&self, id: &str, title: &str, author_id: &str) {
        let post: Post = serde_json::from_value(serde_json::json!({
            "_id": id,
            "title": title,
            "content": "",
            "author": { "_id": author_id, "username": "someone" }
        }))
        .unwrap();
        self.posts.lock().unwrap().insert(id.to_string(), post);
    }

    pub fn seed_story(&self, id: &str, username: &str) {
        let story: Story =
            serde_json::from_value(serde_json::json!({ "_id": id, "username": username })).unwrap();
        self.stories.lock().unwrap().push(story);
    }

    pub fn post_count(&self) -> usize {
        self.posts.lock().unwrap().len()
    }

    fn authorize(token: Option<&str>) -> Result<(), BlogError> {
        match token {
            Some(TOKEN) => Ok(()),
            _ => Err(BlogError::Auth("Not authorized".to_string())),
        }
    }

    fn next_id(&self, prefix: &str) -> String {
        let mut next = self.next_id.lock().unwrap();
        *next += 1;
        format!("{}{}", prefix, next)
    }
}

#[async_trait]
impl BlogApi for FakeApi {
    async fn login(&self, request: &LoginRequest) -> Result<Credentials, BlogError> {
        if request.password == "secret" {
            Ok(Self::credentials())
        } else {
            Err(BlogError::Auth("Invalid credentials".to_string()))
        }
    }

    async fn register(&self, request: &RegisterRequest) -> Result<Credentials, BlogError> {
        Ok(Credentials { username: request.username.clone(), ..Self::credentials() })
    }

    async fn verify_session(&self, token: &str) -> Result<(), BlogError> {
        if self.reject_verification {
            return Err(BlogError::Auth("Token expired".to_string()));
        }
        Self::authorize(Some(token))
    }

    async fn list_posts(&self, _token: Option<&str>) -> Result<Vec<Post>, BlogError> {
        Ok(self.posts.lock().unwrap().values().cloned().collect())
    }

    async fn get_post(&self, _token: Option<&str>, id: &str) -> Result<Post, BlogError> {
        self.posts
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| BlogError::NotFound("Blog not found".to_string()))
    }

    async fn create_post(&self, token: Option<&str>, post: &NewPost) -> Result<Post, BlogError> {
        Self::authorize(token)?;
        let id = self.next_id("p");
        let created: Post = serde_json::from_value(serde_json::json!({
            "_id": id,
            "title": post.title,
            "content": post.content.serialize().unwrap(),
            "location": post.location,
            "author": { "_id": USER_ID, "username": USERNAME }
        }))
        .unwrap();
        self.posts.lock().unwrap().insert(id, created.clone());
        Ok(created)
    }

    async fn update_post(&self, token: Option<&str>, id: &str, update: &PostUpdate) -> Result<Post, BlogError> {
        Self::authorize(token)?;
        let mut posts = self.posts.lock().unwrap();
        let post = posts
            .get_mut(id)
            .ok_or_else(|| BlogError::NotFound("Blog not found".to_string()))?;
        post.title = update.title.clone();
        post.content = update.content.serialize().unwrap();
        post.location = update.location.clone();
        Ok(post.clone())
    }

    async fn delete_post(&self, token: Option<&str>, id: &str) -> Result<(), BlogError> {
        Self::authorize(token)?;
        self.posts
            .lock()
            .unwrap()
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| BlogError::NotFound("Blog not found".to_string()))
    }

    async fn list_stories(&self, token: Option<&str>) -> Result<Vec<Story>, BlogError> {
        Self::authorize(token)?;
        Ok(self.stories.lock().unwrap().clone())
    }

    async fn create_story(&self, token: Option<&str>, story: &NewStory) -> Result<Story, BlogError> {
        Self::authorize(token)?;
        story.validate()?;
        let created: Story = serde_json::from_value(serde_json::json!({
            "_id": self.next_id("s"),
            "caption": story.caption,
            "username": USERNAME
        }))
        .unwrap();
        self.stories.lock().unwrap().insert(0, created.clone());
        Ok(created)
    }
}
