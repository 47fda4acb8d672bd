use ratatui::{
    backend::Backend,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::models::story::Story;
use crate::views::tui::centered_rect;

pub const STORY_HINTS: &str = "n next story  esc close";
pub const CONFIRM_HINTS: &str = "y delete  any other key cancels";

pub fn render_story<B: Backend>(f: &mut Frame<B>, area: Rect, story: &Story) {
    let popup = centered_rect(60, 40, area);
    let mut lines = vec![
        Line::from(Span::styled(
            story.username.clone(),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(story.image_url.clone(), Style::default().fg(Color::Blue))),
        Line::from(""),
    ];
    if !story.caption.is_empty() {
        lines.push(Line::from(story.caption.clone()));
    }
    if let Some(at) = story.created_at {
        lines.push(Line::from(Span::styled(
            at.format("%b %d, %Y %H:%M").to_string(),
            Style::default().fg(Color::DarkGray),
        )));
    }

    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().title("Story").borders(Borders::ALL));

    f.render_widget(Clear, popup);
    f.render_widget(paragraph, popup);
}

pub fn render_confirm_delete<B: Backend>(f: &mut Frame<B>, area: Rect, title: &str) {
    let popup = centered_rect(50, 20, area);
    let paragraph = Paragraph::new(vec![
        Line::from("Are you sure you want to delete this blog?"),
        Line::from(""),
        Line::from(Span::styled(title.to_string(), Style::default().add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from(Span::styled("y / N", Style::default().fg(Color::Red))),
    ])
    .wrap(Wrap { trim: true })
    .block(Block::default().title("Delete").borders(Borders::ALL));

    f.render_widget(Clear, popup);
    f.render_widget(paragraph, popup);
}
