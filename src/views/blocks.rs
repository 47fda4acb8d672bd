//! Drawing rendered nodes as terminal lines.

use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

use crate::models::document::ListStyle;
use crate::models::render::{Node, NO_CONTENT};

/// Strip inline HTML the browser editor leaves in block text.
pub fn plain_inline(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find('<') {
        out.push_str(&rest[..start]);
        match rest[start..].find('>') {
            Some(end) => {
                let tag = rest[start + 1..start + end].trim().to_ascii_lowercase();
                if tag == "br" || tag == "br/" || tag == "br /" {
                    out.push('\n');
                }
                rest = &rest[start + end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);

    out.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

fn heading_style(rank: u8) -> Style {
    let style = Style::default().add_modifier(Modifier::BOLD);
    match rank {
        1 => style.fg(Color::Cyan).add_modifier(Modifier::UNDERLINED),
        2 => style.fg(Color::Cyan),
        3 => style.fg(Color::LightBlue),
        _ => style,
    }
}

pub fn node_lines(node: &Node) -> Vec<Line<'static>> {
    match node {
        Node::Placeholder => vec![Line::from(Span::styled(
            NO_CONTENT,
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        ))],
        Node::Text(text) => plain_inline(text)
            .lines()
            .map(|l| Line::from(l.to_string()))
            .collect(),
        Node::Heading { rank, text } => vec![Line::from(Span::styled(
            plain_inline(text).replace('\n', " "),
            heading_style(*rank),
        ))],
        Node::List { style, items } => items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let marker = match style {
                    ListStyle::Ordered => format!("  {}. ", i + 1),
                    ListStyle::Unordered => "  • ".to_string(),
                };
                Line::from(vec![
                    Span::styled(marker, Style::default().fg(Color::Yellow)),
                    Span::raw(plain_inline(item).replace('\n', " ")),
                ])
            })
            .collect(),
        Node::Fallback { kind, raw } => vec![Line::from(vec![
            Span::styled(format!("[{}] ", kind), Style::default().fg(Color::Magenta)),
            Span::styled(raw.clone(), Style::default().fg(Color::DarkGray)),
        ])],
    }
}

/// Every node, separated by blank lines.
pub fn body_lines(nodes: &[Node]) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for (i, node) in nodes.iter().enumerate() {
        if i > 0 {
            lines.push(Line::from(""));
        }
        lines.extend(node_lines(node));
    }
    lines
}

/// Unstyled text for printing outside the full-screen UI.
pub fn plain_text(nodes: &[Node]) -> String {
    body_lines(nodes)
        .iter()
        .map(|line| {
            line.spans
                .iter()
                .map(|span| span.content.as_ref())
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}
