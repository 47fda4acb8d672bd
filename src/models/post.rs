use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::BlogError;
use crate::models::document::{Content, Document};

pub const UNKNOWN_AUTHOR: &str = "Unknown Author";

/// Authors arrive either as a bare id or as a populated user object.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum Author {
    Id(String),
    User {
        #[serde(rename = "_id", alias = "id", default)]
        id: Option<String>,
        #[serde(default)]
        username: Option<String>,
        #[serde(default)]
        name: Option<String>,
    },
}

impl Author {
    pub fn id(&self) -> Option<&str> {
        match self {
            Author::Id(id) => Some(id),
            Author::User { id, .. } => id.as_deref(),
        }
    }

    pub fn display_name(&self) -> Option<&str> {
        match self {
            Author::Id(id) => Some(id),
            Author::User { username, name, .. } => username.as_deref().or(name.as_deref()),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    /// Serialized document; interpreted only by the document model.
    #[serde(default, deserialize_with = "content_as_string")]
    pub content: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub author: Option<Author>,
    #[serde(default)]
    pub author_name: Option<Author>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Some servers hand back the body already parsed; keep it as text either way.
fn content_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    })
}

impl Post {
    pub fn body(&self) -> Content {
        Content::from_wire(Some(&self.content))
    }

    pub fn author_display(&self) -> &str {
        self.author_name
            .as_ref()
            .and_then(Author::display_name)
            .or_else(|| self.author.as_ref().and_then(Author::display_name))
            .unwrap_or(UNKNOWN_AUTHOR)
    }

    /// Only the author is offered destructive actions; the server decides.
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.author.as_ref().and_then(Author::id) == Some(user_id)
    }

    pub fn image_link(&self, api_url: &str) -> Option<String> {
        if let Some(url) = self.image_url.as_deref().filter(|u| !u.is_empty()) {
            return Some(url.to_string());
        }
        self.image
            .as_deref()
            .filter(|i| !i.is_empty())
            .map(|image| {
                if image.starts_with("http://") || image.starts_with("https://") {
                    image.to_string()
                } else {
                    format!("{}/uploads/{}", api_url.trim_end_matches('/'), image)
                }
            })
    }

    pub fn created_label(&self, format: &str) -> String {
        self.created_at
            .map(|at| at.format(format).to_string())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewPost {
    pub title: String,
    pub content: Document,
    pub image: Option<PathBuf>,
    pub location: Option<String>,
}

impl NewPost {
    pub fn validate(&self) -> Result<(), BlogError> {
        require_title(&self.title)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostUpdate {
    pub title: String,
    pub content: Document,
    pub location: Option<String>,
    pub image: Option<PathBuf>,
    pub video: Option<PathBuf>,
}

impl PostUpdate {
    /// Start an update from what the server holds now.
    pub fn from_post(post: &Post) -> Self {
        let content = match post.body() {
            Content::Structured(doc) => doc,
            Content::Empty => Document::default(),
            Content::Unstructured(text) => Document::from_plain_text(&text),
        };
        PostUpdate {
            title: post.title.clone(),
            content,
            location: post.location.clone(),
            image: None,
            video: None,
        }
    }

    pub fn validate(&self) -> Result<(), BlogError> {
        require_title(&self.title)
    }
}

fn require_title(title: &str) -> Result<(), BlogError> {
    if title.trim().is_empty() {
        return Err(BlogError::Validation("Title is required".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::document::Block;

    #[test]
    fn decodes_populated_author() {
        let post: Post = serde_json::from_str(
            r#"{"_id":"p1","title":"Hi","content":"{\"blocks\":[]}","author":{"_id":"u1","username":"ana"},"createdAt":"2024-03-05T10:00:00.000Z"}"#,
        )
        .unwrap();
        assert_eq!(post.id, "p1");
        assert_eq!(post.author_display(), "ana");
        assert!(post.is_owned_by("u1"));
        assert!(!post.is_owned_by("u2"));
        assert_eq!(post.created_label("%b %d, %Y"), "Mar 05, 2024");
    }

    #[test]
    fn author_fallbacks() {
        let post: Post = serde_json::from_str(r#"{"_id":"p","author":"u9"}"#).unwrap();
        assert_eq!(post.author_display(), "u9");
        assert!(post.is_owned_by("u9"));

        let post: Post = serde_json::from_str(r#"{"_id":"p","author":{"name":"Named"}}"#).unwrap();
        assert_eq!(post.author_display(), "Named");

        let post: Post = serde_json::from_str(r#"{"_id":"p"}"#).unwrap();
        assert_eq!(post.author_display(), UNKNOWN_AUTHOR);
        assert!(!post.is_owned_by("anyone"));
    }

    #[test]
    fn parsed_content_is_kept_as_text() {
        let post: Post = serde_json::from_str(
            r#"{"_id":"p","content":{"blocks":[{"type":"paragraph","data":{"text":"x"}}]}}"#,
        )
        .unwrap();
        assert_eq!(
            post.body(),
            Content::Structured(Document::new(vec![Block::paragraph("x")]))
        );
    }

    #[test]
    fn image_links() {
        let mut post: Post = serde_json::from_str(r#"{"_id":"p","image":"a.png"}"#).unwrap();
        assert_eq!(post.image_link("https://api.test/").as_deref(), Some("https://api.test/uploads/a.png"));

        post.image = Some("https://cdn.test/b.png".into());
        assert_eq!(post.image_link("https://api.test").as_deref(), Some("https://cdn.test/b.png"));

        post.image = None;
        assert_eq!(post.image_link("https://api.test"), None);
    }

    #[test]
    fn title_is_required() {
        let post = NewPost { title: "  ".into(), ..Default::default() };
        assert!(matches!(post.validate(), Err(BlogError::Validation(_))));

        let post = NewPost { title: "Hi".into(), ..Default::default() };
        assert!(post.validate().is_ok());
    }

    #[test]
    fn update_from_legacy_text_post() {
        let post: Post = serde_json::from_str(r#"{"_id":"p","title":"Old","content":"plain words"}"#).unwrap();
        let update = PostUpdate::from_post(&post);
        assert_eq!(update.title, "Old");
        assert_eq!(update.content.blocks, vec![Block::paragraph("plain words")]);
    }
}
