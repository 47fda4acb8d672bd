use std::path::Path;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::BlogError;
use crate::models::config::Config;
use crate::models::post::{NewPost, Post, PostUpdate};
use crate::models::story::{NewStory, Story};
use crate::models::user::{AuthResponse, Credentials, LoginRequest, RegisterRequest};

/// The remote blog service. Every call is one round-trip; nothing is retried.
/// `token`, when present, is sent as `Authorization: Bearer <token>`.
#[async_trait]
pub trait BlogApi: Send + Sync {
    async fn login(&self, request: &LoginRequest) -> Result<Credentials, BlogError>;

    async fn register(&self, request: &RegisterRequest) -> Result<Credentials, BlogError>;

    /// Succeeds only while the token is accepted by the server.
    async fn verify_session(&self, token: &str) -> Result<(), BlogError>;

    async fn list_posts(&self, token: Option<&str>) -> Result<Vec<Post>, BlogError>;

    async fn get_post(&self, token: Option<&str>, id: &str) -> Result<Post, BlogError>;

    async fn create_post(&self, token: Option<&str>, post: &NewPost) -> Result<Post, BlogError>;

    async fn update_post(&self, token: Option<&str>, id: &str, update: &PostUpdate) -> Result<Post, BlogError>;

    async fn delete_post(&self, token: Option<&str>, id: &str) -> Result<(), BlogError>;

    async fn list_stories(&self, token: Option<&str>) -> Result<Vec<Story>, BlogError>;

    async fn create_story(&self, token: Option<&str>, story: &NewStory) -> Result<Story, BlogError>;
}

#[derive(Clone)]
pub struct HttpApi {
    client: Client,
    base_url: String,
}

impl HttpApi {
    pub fn new(config: &Config) -> Result<Self, BlogError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| BlogError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }

    fn request(&self, method: reqwest::Method, path: &str, token: Option<&str>) -> RequestBuilder {
        let builder = self.client.request(method, format!("{}{}", self.base_url, path));
        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, BlogError> {
        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                BlogError::Network("Request timed out".to_string())
            } else {
                BlogError::Network(e.to_string())
            }
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = server_message(&body)
            .or_else(|| status.canonical_reason().map(str::to_string))
            .unwrap_or_else(|| "Unknown error occurred".to_string());
        log::warn!("request failed with {}: {}", status, message);
        Err(BlogError::from_status(status.as_u16(), message))
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, BlogError> {
        let response = self.send(builder).await?;
        let body = response
            .text()
            .await
            .map_err(|e| BlogError::Network(e.to_string()))?;
        serde_json::from_str(&body)
            .map_err(|e| BlogError::Network(format!("Invalid response from server: {}", e)))
    }
}

/// Servers answer errors with `{"message": ...}` or `{"error": ...}`.
fn server_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["message", "error"]
        .iter()
        .find_map(|key| value.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}

fn mime_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    Some(match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "mov" => "video/quicktime",
        _ => return None,
    })
}

async fn file_part(path: &Path) -> Result<Part, BlogError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| BlogError::Io(format!("Failed to read {:?}: {}", path, e)))?;

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());

    let part = Part::bytes(bytes).file_name(name);
    match mime_for(path) {
        Some(mime) => part.mime_str(mime).map_err(|e| BlogError::Io(e.to_string())),
        None => Ok(part),
    }
}

fn post_form(title: &str, content: String, location: Option<&str>) -> Form {
    Form::new()
        .text("title", title.to_string())
        .text("content", content)
        .text("location", location.unwrap_or_default().to_string())
}

#[async_trait]
impl BlogApi for HttpApi {
    async fn login(&self, request: &LoginRequest) -> Result<Credentials, BlogError> {
        let builder = self.request(reqwest::Method::POST, "/api/users/login", None).json(request);
        let response: AuthResponse = self.send_json(builder).await?;
        Ok(response.into())
    }

    async fn register(&self, request: &RegisterRequest) -> Result<Credentials, BlogError> {
        let builder = self.request(reqwest::Method::POST, "/api/users/register", None).json(request);
        let response: AuthResponse = self.send_json(builder).await?;
        Ok(response.into())
    }

    async fn verify_session(&self, token: &str) -> Result<(), BlogError> {
        self.send(self.request(reqwest::Method::GET, "/api/users/me", Some(token)))
            .await
            .map(|_| ())
    }

    async fn list_posts(&self, token: Option<&str>) -> Result<Vec<Post>, BlogError> {
        self.send_json(self.request(reqwest::Method::GET, "/api/blogs", token)).await
    }

    async fn get_post(&self, token: Option<&str>, id: &str) -> Result<Post, BlogError> {
        let path = format!("/api/blogs/{}", id);
        self.send_json(self.request(reqwest::Method::GET, &path, token)).await
    }

    async fn create_post(&self, token: Option<&str>, post: &NewPost) -> Result<Post, BlogError> {
        let mut form = post_form(&post.title, post.content.serialize()?, post.location.as_deref());
        if let Some(image) = &post.image {
            form = form.part("image", file_part(image).await?);
        }

        let builder = self.request(reqwest::Method::POST, "/api/blogs", token).multipart(form);
        self.send_json(builder).await
    }

    async fn update_post(&self, token: Option<&str>, id: &str, update: &PostUpdate) -> Result<Post, BlogError> {
        let mut form = post_form(&update.title, update.content.serialize()?, update.location.as_deref());
        if let Some(image) = &update.image {
            form = form.part("image", file_part(image).await?);
        }
        if let Some(video) = &update.video {
            form = form.part("video", file_part(video).await?);
        }

        let path = format!("/api/blogs/{}", id);
        let builder = self.request(reqwest::Method::PUT, &path, token).multipart(form);
        self.send_json(builder).await
    }

    async fn delete_post(&self, token: Option<&str>, id: &str) -> Result<(), BlogError> {
        let path = format!("/api/blogs/{}", id);
        self.send(self.request(reqwest::Method::DELETE, &path, token))
            .await
            .map(|_| ())
    }

    async fn list_stories(&self, token: Option<&str>) -> Result<Vec<Story>, BlogError> {
        self.send_json(self.request(reqwest::Method::GET, "/api/stories", token)).await
    }

    async fn create_story(&self, token: Option<&str>, story: &NewStory) -> Result<Story, BlogError> {
        let image = story.validate()?;
        let form = Form::new()
            .part("image", file_part(image).await?)
            .text("caption", story.caption.clone());

        let builder = self.request(reqwest::Method::POST, "/api/stories", token).multipart(form);
        self.send_json(builder).await
    }
}
