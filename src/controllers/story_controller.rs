use std::path::PathBuf;

use crate::error::BlogError;
use crate::models::client::BlogApi;
use crate::models::repository::StoryRepository;
use crate::models::story::{NewStory, Story};

pub fn format_story(story: &Story) -> String {
    let mut line = format!("{}  {}", story.username, story.image_url);
    if !story.caption.is_empty() {
        line.push_str(&format!("\n    {}", story.caption));
    }
    if let Some(at) = story.created_at {
        line.push_str(&format!("\n    {}", at.format("%b %d, %Y %H:%M")));
    }
    line
}

pub async fn list_stories(repo: &StoryRepository<dyn BlogApi>) -> Result<(), BlogError> {
    let stories = repo.list_stories().await?;
    if stories.is_empty() {
        println!("No stories yet");
    }
    for story in &stories {
        println!("{}", format_story(story));
    }
    Ok(())
}

pub async fn create_story(
    repo: &StoryRepository<dyn BlogApi>,
    image: Option<PathBuf>,
    caption: String,
) -> Result<(), BlogError> {
    let story = repo.create_story(&NewStory { image, caption }).await?;
    println!("Story shared ({})", story.id);
    Ok(())
}
