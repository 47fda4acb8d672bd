use std::collections::HashSet;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::BlogError;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub caption: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewStory {
    pub image: Option<PathBuf>,
    pub caption: String,
}

impl NewStory {
    pub fn validate(&self) -> Result<&PathBuf, BlogError> {
        self.image
            .as_ref()
            .ok_or_else(|| BlogError::Validation("Please select an image".to_string()))
    }
}

/// Stories opened during this session. Never persisted.
#[derive(Debug, Default, Clone)]
pub struct ViewedStories {
    seen: HashSet<String>,
}

impl ViewedStories {
    pub fn mark(&mut self, story_id: &str) {
        self.seen.insert(story_id.to_string());
    }

    pub fn is_viewed(&self, story_id: &str) -> bool {
        self.seen.contains(story_id)
    }

    pub fn clear(&mut self) {
        self.seen.clear();
    }

    pub fn next_unviewed<'a>(&self, stories: &'a [Story]) -> Option<&'a Story> {
        stories.iter().find(|s| !self.is_viewed(&s.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn story(id: &str) -> Story {
        Story {
            id: id.to_string(),
            image_url: format!("https://img.test/{}.jpg", id),
            caption: String::new(),
            username: "sam".to_string(),
            created_at: None,
        }
    }

    #[test]
    fn decodes_wire_story() {
        let s: Story = serde_json::from_str(
            r#"{"_id":"s1","imageUrl":"https://img.test/s1.jpg","caption":"sunset","username":"sam","createdAt":"2024-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(s.id, "s1");
        assert_eq!(s.caption, "sunset");
        assert!(s.created_at.is_some());
    }

    #[test]
    fn image_is_required() {
        let draft = NewStory { image: None, caption: "hi".into() };
        assert_eq!(
            draft.validate(),
            Err(BlogError::Validation("Please select an image".into()))
        );
    }

    #[test]
    fn viewed_marks_are_per_id() {
        let stories = vec![story("a"), story("b")];
        let mut viewed = ViewedStories::default();
        assert_eq!(viewed.next_unviewed(&stories).map(|s| s.id.as_str()), Some("a"));

        viewed.mark("a");
        assert!(viewed.is_viewed("a"));
        assert_eq!(viewed.next_unviewed(&stories).map(|s| s.id.as_str()), Some("b"));

        viewed.mark("b");
        assert!(viewed.next_unviewed(&stories).is_none());

        viewed.clear();
        assert!(!viewed.is_viewed("a"));
    }
}
