//! Non-interactive post commands.

use std::env;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::cli::ComposeArgs;
use crate::error::BlogError;
use crate::models::client::BlogApi;
use crate::models::document::Document;
use crate::models::post::{NewPost, Post, PostUpdate};
use crate::models::render::render;
use crate::models::repository::{confirm_delete, PostRepository};
use crate::models::user::User;
use crate::views::blocks::plain_text;
use crate::views::dashboard::post_excerpt;

pub async fn list_posts(repo: &PostRepository<dyn BlogApi>, excerpt_chars: usize) -> Result<(), BlogError> {
    let posts = repo.list_posts().await?;
    if posts.is_empty() {
        println!("No blogs found. Create your first blog!");
        return Ok(());
    }

    for post in posts {
        println!("{}  {}", post.id, post.title);
        println!("    {} · {}", post.author_display(), post.created_label("%b %d, %Y"));
        println!("    {}", post_excerpt(&post, excerpt_chars));
    }
    Ok(())
}

/// Title, byline, links and rendered body as plain text.
pub fn format_post(post: &Post, api_url: &str) -> String {
    let mut out = vec![
        post.title.clone(),
        format!("By {} • {}", post.author_display(), post.created_label("%B %-d, %Y")),
    ];
    if let Some(location) = post.location.as_deref().filter(|l| !l.is_empty()) {
        out.push(location.to_string());
    }
    if let Some(link) = post.image_link(api_url) {
        out.push(format!("image: {}", link));
    }
    if let Some(video) = post.video_url.as_deref().filter(|v| !v.is_empty()) {
        out.push(format!("video: {}", video));
    }
    out.push(String::new());
    out.push(plain_text(&render(&post.content)));
    out.join("\n")
}

pub async fn show_post(repo: &PostRepository<dyn BlogApi>, id: &str, api_url: &str) -> Result<(), BlogError> {
    let post = repo.get_post(id).await?;
    println!("{}", format_post(&post, api_url));
    Ok(())
}

/// Body from `--body-file`, `$EDITOR`, or nothing.
fn body_from(args: &ComposeArgs, seed: &str) -> Result<Option<Document>, BlogError> {
    if let Some(path) = &args.body_file {
        let text = fs::read_to_string(path)
            .map_err(|e| BlogError::Io(format!("Failed to read {:?}: {}", path, e)))?;
        return Ok(Some(Document::from_plain_text(&text)));
    }
    if args.external {
        let text = create_post_via_editor(seed)?;
        return Ok(Some(Document::from_plain_text(&text)));
    }
    Ok(None)
}

pub async fn create_post(repo: &PostRepository<dyn BlogApi>, args: &ComposeArgs) -> Result<(), BlogError> {
    let post = NewPost {
        title: args.title.clone().unwrap_or_default(),
        content: body_from(args, "")?.unwrap_or_default(),
        image: args.image.clone(),
        location: args.location.clone(),
    };

    let created = repo.create_post(&post).await?;
    println!("Blog created successfully! ({})", created.id);
    Ok(())
}

pub async fn edit_post(
    repo: &PostRepository<dyn BlogApi>,
    id: &str,
    args: &ComposeArgs,
    video: Option<PathBuf>,
) -> Result<(), BlogError> {
    let current = repo.get_post(id).await?;
    let mut update = PostUpdate::from_post(&current);

    if let Some(title) = &args.title {
        update.title = title.clone();
    }
    if let Some(location) = &args.location {
        update.location = Some(location.clone());
    }
    let seed = plain_text(&render(&update.content));
    if let Some(content) = body_from(args, &seed)? {
        update.content = content;
    }
    update.image = args.image.clone();
    update.video = video;

    let updated = repo.update_post(id, &update).await?;
    println!("Blog updated successfully! ({})", updated.id);
    Ok(())
}

pub async fn delete_post(
    repo: &PostRepository<dyn BlogApi>,
    user: &User,
    id: &str,
    assume_yes: bool,
) -> Result<(), BlogError> {
    let post = repo.get_post(id).await?;
    if !post.is_owned_by(&user.user_id) {
        return Err(BlogError::Validation("You can only delete your own blogs".to_string()));
    }

    let answer = if assume_yes {
        "y".to_string()
    } else {
        ask(&format!("Are you sure you want to delete \"{}\"? [y/N] ", post.title))?
    };

    match confirm_delete(id, &answer) {
        Some(confirmed) => {
            repo.delete_post(confirmed).await?;
            println!("Blog deleted successfully");
        }
        None => println!("Cancelled"),
    }
    Ok(())
}

fn ask(prompt: &str) -> Result<String, BlogError> {
    print!("{}", prompt);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line)
}

/// Open `$EDITOR` (default `vi`) on a scratch file seeded with `seed`.
pub fn create_post_via_editor(seed: &str) -> Result<String, BlogError> {
    let editor = env::var("EDITOR")
        .unwrap_or_else(|_| "vi".to_string());

    let mut temp_path = env::temp_dir();
    temp_path.push(format!("blogterm-{}.md", std::process::id()));
    fs::write(&temp_path, seed)?;

    let result = run_editor(&editor, &temp_path);
    let _ = fs::remove_file(&temp_path);
    result
}

fn run_editor(editor: &str, path: &Path) -> Result<String, BlogError> {
    let status = Command::new(editor)
        .arg(path)
        .status()?;

    if !status.success() {
        return Err(BlogError::Io("Editor exited with non-zero status".to_string()));
    }

    Ok(fs::read_to_string(path)?)
}
