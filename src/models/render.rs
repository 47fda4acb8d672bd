//! Tolerant rendering of post bodies into presentational nodes.
//!
//! Rendering never fails: unreadable bodies degrade to one literal text node
//! and unknown blocks to an inspectable dump of their payload.

use serde_json::Value;

use crate::models::document::{Block, BlockBody, Content, Document, ListStyle};

pub const NO_CONTENT: &str = "No content available";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Nothing to show.
    Placeholder,
    Text(String),
    Heading { rank: u8, text: String },
    List { style: ListStyle, items: Vec<String> },
    /// Block of a type we do not draw; `raw` is its payload as JSON.
    Fallback { kind: String, raw: String },
}

pub enum Source<'a> {
    Wire(Option<&'a str>),
    Document(&'a Document),
}

impl<'a> From<&'a str> for Source<'a> {
    fn from(wire: &'a str) -> Self {
        Source::Wire(Some(wire))
    }
}

impl<'a> From<&'a String> for Source<'a> {
    fn from(wire: &'a String) -> Self {
        Source::Wire(Some(wire.as_str()))
    }
}

impl<'a> From<Option<&'a str>> for Source<'a> {
    fn from(wire: Option<&'a str>) -> Self {
        Source::Wire(wire)
    }
}

impl<'a> From<&'a Document> for Source<'a> {
    fn from(doc: &'a Document) -> Self {
        Source::Document(doc)
    }
}

/// Heading ranks run 1 through 6.
pub fn heading_rank(level: i64) -> u8 {
    level.clamp(1, 6) as u8
}

pub fn render<'a>(source: impl Into<Source<'a>>) -> Vec<Node> {
    match source.into() {
        Source::Wire(wire) => render_content(&Content::from_wire(wire)),
        Source::Document(doc) => render_document(doc),
    }
}

pub fn render_content(content: &Content) -> Vec<Node> {
    match content {
        Content::Empty => vec![Node::Placeholder],
        Content::Structured(doc) => render_document(doc),
        Content::Unstructured(text) => vec![Node::Text(text.clone())],
    }
}

pub fn render_document(doc: &Document) -> Vec<Node> {
    if doc.is_empty() {
        return vec![Node::Placeholder];
    }
    doc.blocks.iter().map(render_block).collect()
}

pub fn render_block(block: &Block) -> Node {
    match &block.body {
        BlockBody::Paragraph(p) => Node::Text(p.text.clone()),
        BlockBody::Header(h) => Node::Heading {
            rank: heading_rank(h.level),
            text: h.text.clone(),
        },
        BlockBody::List(l) => Node::List {
            style: l.style,
            items: l.items.clone(),
        },
        BlockBody::Other { kind, data } => Node::Fallback {
            kind: kind.clone(),
            raw: Value::Object(data.clone()).to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_json_renders_as_literal_text() {
        assert_eq!(render("not valid json"), vec![Node::Text("not valid json".into())]);
    }

    #[test]
    fn json_without_blocks_renders_as_literal_text() {
        assert_eq!(render(r#"{"foo":1}"#), vec![Node::Text(r#"{"foo":1}"#.into())]);
    }

    #[test]
    fn absent_or_empty_content_renders_placeholder() {
        assert_eq!(render(None::<&str>), vec![Node::Placeholder]);
        assert_eq!(render(""), vec![Node::Placeholder]);
        assert_eq!(render(&Document::default()), vec![Node::Placeholder]);
    }

    #[test]
    fn unknown_block_renders_fallback_with_payload() {
        let nodes = render(r#"{"blocks":[{"type":"quote","data":{"text":"x"}}]}"#);
        assert_eq!(nodes.len(), 1);
        match &nodes[0] {
            Node::Fallback { kind, raw } => {
                assert_eq!(kind, "quote");
                assert!(raw.contains("\"x\""));
            }
            other => panic!("expected fallback node, got {:?}", other),
        }
    }

    #[test]
    fn header_level_is_clamped() {
        let nodes = render(r#"{"blocks":[{"type":"header","data":{"text":"big","level":9}}]}"#);
        assert_eq!(nodes, vec![Node::Heading { rank: 6, text: "big".into() }]);

        let nodes = render(r#"{"blocks":[{"type":"header","data":{"text":"tiny","level":-3}}]}"#);
        assert_eq!(nodes, vec![Node::Heading { rank: 1, text: "tiny".into() }]);
    }

    #[test]
    fn blocks_render_in_document_order() {
        let doc = Document::new(vec![
            Block::header("Plan", 2),
            Block::paragraph("Steps:"),
            Block::list(ListStyle::Ordered, vec!["wake".into(), "write".into()]),
        ]);
        assert_eq!(
            render(&doc),
            vec![
                Node::Heading { rank: 2, text: "Plan".into() },
                Node::Text("Steps:".into()),
                Node::List { style: ListStyle::Ordered, items: vec!["wake".into(), "write".into()] },
            ]
        );
    }

    #[test]
    fn rendering_is_deterministic() {
        let wire = r#"{"blocks":[{"type":"paragraph","data":{"text":"same"}},{"type":"embed","data":{"url":"u"}}]}"#;
        assert_eq!(render(wire), render(wire));
    }
}
