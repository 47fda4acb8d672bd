use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::models::document::Content;
use crate::models::post::Post;
use crate::models::render::NO_CONTENT;
use crate::models::story::{Story, ViewedStories};
use crate::models::user::User;
use crate::views::blocks::plain_inline;
use crate::views::widgets::StatefulList;

pub const HINTS: &str =
    "j/k move  enter open  n new  e edit  d delete  s stories  r refresh  L logout  q quit";

pub struct DashboardView {
    pub posts: StatefulList<Post>,
    pub loading: bool,
    pub error: Option<String>,
}

impl DashboardView {
    pub fn new() -> Self {
        DashboardView {
            posts: StatefulList::with_items(Vec::new()),
            loading: true,
            error: None,
        }
    }
}

impl Default for DashboardView {
    fn default() -> Self {
        Self::new()
    }
}

pub struct FeedContext<'a> {
    pub user: Option<&'a User>,
    pub stories: &'a [Story],
    pub viewed: &'a ViewedStories,
    pub excerpt_chars: usize,
}

pub fn post_excerpt(post: &Post, max_chars: usize) -> String {
    let text = match post.body() {
        Content::Structured(doc) => doc.excerpt(max_chars),
        Content::Unstructured(text) => {
            let cut: String = text.chars().take(max_chars).collect();
            Some(format!("{}...", cut))
        }
        Content::Empty => None,
    };
    text.map(|t| plain_inline(&t).replace('\n', " "))
        .unwrap_or_else(|| NO_CONTENT.to_string())
}

fn story_strip(ctx: &FeedContext) -> Line<'static> {
    if ctx.stories.is_empty() {
        return Line::from(Span::styled(
            "No stories yet",
            Style::default().fg(Color::DarkGray),
        ));
    }

    let mut spans = Vec::new();
    for story in ctx.stories {
        let (marker, style) = if ctx.viewed.is_viewed(&story.id) {
            ("○ ", Style::default().fg(Color::DarkGray))
        } else {
            ("● ", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
        };
        spans.push(Span::styled(format!("{}{}", marker, story.username), style));
        spans.push(Span::raw("   "));
    }
    Line::from(spans)
}

pub fn render_dashboard<B: Backend>(
    f: &mut Frame<B>,
    area: Rect,
    view: &mut DashboardView,
    ctx: &FeedContext,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)].as_ref())
        .split(area);

    let strip = Paragraph::new(story_strip(ctx))
        .block(Block::default().title("Stories").borders(Borders::ALL));
    f.render_widget(strip, chunks[0]);

    let title = match ctx.user {
        Some(user) => format!("Welcome to the My Blog, {}!", user.username),
        None => "My Blog".to_string(),
    };
    let title = if view.loading { format!("{} (loading...)", title) } else { title };
    let frame = Block::default().title(title).borders(Borders::ALL);

    if let Some(error) = &view.error {
        let message = Paragraph::new(format!("Error: {}", error))
            .style(Style::default().fg(Color::Red))
            .wrap(Wrap { trim: true })
            .block(frame);
        f.render_widget(message, chunks[1]);
        return;
    }

    if view.posts.items.is_empty() {
        let text = if view.loading { "Loading..." } else { "No blogs found. Create your first blog!" };
        f.render_widget(Paragraph::new(text).block(frame), chunks[1]);
        return;
    }

    let user_id = ctx.user.map(|u| u.user_id.as_str());
    let items: Vec<ListItem> = view.posts.items
        .iter()
        .map(|post| {
            let mut title = vec![Span::styled(
                post.title.clone(),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )];
            if user_id.is_some_and(|id| post.is_owned_by(id)) {
                title.push(Span::styled("  [yours]", Style::default().fg(Color::Green)));
            }

            let mut meta = format!("{} · {}", post.author_display(), post.created_label("%b %d, %Y"));
            if let Some(location) = post.location.as_deref().filter(|l| !l.is_empty()) {
                meta.push_str(&format!(" · {}", location));
            }

            ListItem::new(vec![
                Line::from(title),
                Line::from(Span::styled(meta, Style::default().fg(Color::DarkGray))),
                Line::from(post_excerpt(post, ctx.excerpt_chars)),
                Line::from(""),
            ])
        })
        .collect();

    let list = List::new(items)
        .block(frame)
        .highlight_style(
            Style::default()
                .bg(Color::Gray)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD)
        );

    f.render_stateful_widget(list, chunks[1], &mut view.posts.state);
}
