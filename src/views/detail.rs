use ratatui::{
    backend::Backend,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::models::post::Post;
use crate::models::render::render;
use crate::views::blocks::body_lines;

pub const HINTS: &str = "j/k scroll  e edit  d delete  esc back";

pub struct DetailView {
    pub post_id: String,
    pub post: Option<Post>,
    pub error: Option<String>,
    pub scroll: u16,
}

impl DetailView {
    pub fn new(post_id: impl Into<String>) -> Self {
        DetailView {
            post_id: post_id.into(),
            post: None,
            error: None,
            scroll: 0,
        }
    }

    pub fn scroll_down(&mut self) {
        self.scroll = self.scroll.saturating_add(1);
    }

    pub fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }
}

pub fn post_lines(post: &Post, api_url: &str) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(Span::styled(
            post.title.clone(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        )),
        Line::from(Span::styled(
            format!("By {} • {}", post.author_display(), post.created_label("%B %-d, %Y")),
            Style::default().fg(Color::DarkGray),
        )),
    ];

    if let Some(location) = post.location.as_deref().filter(|l| !l.is_empty()) {
        lines.push(Line::from(Span::styled(
            location.to_string(),
            Style::default().fg(Color::DarkGray),
        )));
    }
    if let Some(link) = post.image_link(api_url) {
        lines.push(Line::from(vec![
            Span::styled("image: ", Style::default().fg(Color::DarkGray)),
            Span::styled(link, Style::default().fg(Color::Blue)),
        ]));
    }
    if let Some(video) = post.video_url.as_deref().filter(|v| !v.is_empty()) {
        lines.push(Line::from(vec![
            Span::styled("video: ", Style::default().fg(Color::DarkGray)),
            Span::styled(video.to_string(), Style::default().fg(Color::Blue)),
        ]));
    }

    lines.push(Line::from(""));
    lines.extend(body_lines(&render(&post.content)));
    lines
}

pub fn render_detail<B: Backend>(f: &mut Frame<B>, area: Rect, view: &DetailView, api_url: &str) {
    let frame = Block::default().title("Blog post").borders(Borders::ALL);

    let paragraph = match (&view.post, &view.error) {
        (_, Some(error)) => Paragraph::new(format!("Error: {}", error))
            .style(Style::default().fg(Color::Red)),
        (Some(post), None) => Paragraph::new(post_lines(post, api_url)).scroll((view.scroll, 0)),
        (None, None) => Paragraph::new("Loading..."),
    };

    f.render_widget(paragraph.wrap(Wrap { trim: false }).block(frame), area);
}
