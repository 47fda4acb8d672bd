//! Block-structured post bodies.
//!
//! A post body travels as a JSON string of the form
//! `{"blocks":[{"type":"paragraph","data":{"text":"..."}}]}`. Known block
//! types are decoded into typed payloads; anything else (including a known
//! type whose payload does not fit) is kept verbatim as [`BlockBody::Other`]
//! so it survives a round-trip untouched. Keys a known payload does not model
//! are carried in its `extra` map.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::BlogError;

pub const DEFAULT_HEADER_LEVEL: i64 = 2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListStyle {
    Ordered,
    #[default]
    Unordered,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParagraphData {
    #[serde(default)]
    pub text: String,
    /// Tool settings we do not interpret (`alignment`, ...), kept for the round-trip.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderData {
    #[serde(default)]
    pub text: String,
    /// Stored as received; clamped only when rendered.
    #[serde(default = "default_level")]
    pub level: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListData {
    #[serde(default)]
    pub style: ListStyle,
    #[serde(default)]
    pub items: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_level() -> i64 {
    DEFAULT_HEADER_LEVEL
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockBody {
    Paragraph(ParagraphData),
    Header(HeaderData),
    List(ListData),
    /// Unrecognized type, or a recognized type with a payload we cannot read.
    Other { kind: String, data: Map<String, Value> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawBlock", into = "RawBlock")]
pub struct Block {
    pub id: Option<String>,
    pub body: BlockBody,
}

/// Wire shape of a single block.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawBlock {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(rename = "type")]
    kind: String,
    data: Map<String, Value>,
}

impl From<RawBlock> for Block {
    fn from(raw: RawBlock) -> Self {
        let payload = Value::Object(raw.data.clone());
        let typed = match raw.kind.as_str() {
            "paragraph" => serde_json::from_value(payload).map(BlockBody::Paragraph).ok(),
            "header" => serde_json::from_value(payload).map(BlockBody::Header).ok(),
            "list" => serde_json::from_value(payload).map(BlockBody::List).ok(),
            _ => None,
        };

        Block {
            id: raw.id,
            body: typed.unwrap_or(BlockBody::Other {
                kind: raw.kind,
                data: raw.data,
            }),
        }
    }
}

impl From<Block> for RawBlock {
    fn from(block: Block) -> Self {
        let (kind, data) = match block.body {
            BlockBody::Paragraph(p) => ("paragraph".to_string(), to_map(&p)),
            BlockBody::Header(h) => ("header".to_string(), to_map(&h)),
            BlockBody::List(l) => ("list".to_string(), to_map(&l)),
            BlockBody::Other { kind, data } => (kind, data),
        };
        RawBlock { id: block.id, kind, data }
    }
}

fn to_map<T: Serialize>(payload: &T) -> Map<String, Value> {
    match serde_json::to_value(payload) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

impl Block {
    pub fn paragraph(text: impl Into<String>) -> Self {
        Block {
            id: None,
            body: BlockBody::Paragraph(ParagraphData { text: text.into(), extra: Map::new() }),
        }
    }

    pub fn header(text: impl Into<String>, level: i64) -> Self {
        Block {
            id: None,
            body: BlockBody::Header(HeaderData { text: text.into(), level, extra: Map::new() }),
        }
    }

    pub fn list(style: ListStyle, items: Vec<String>) -> Self {
        Block {
            id: None,
            body: BlockBody::List(ListData { style, items, extra: Map::new() }),
        }
    }

    pub fn other(kind: impl Into<String>, data: Map<String, Value>) -> Self {
        Block {
            id: None,
            body: BlockBody::Other { kind: kind.into(), data },
        }
    }

    /// The wire `type` tag.
    pub fn kind(&self) -> &str {
        match &self.body {
            BlockBody::Paragraph(_) => "paragraph",
            BlockBody::Header(_) => "header",
            BlockBody::List(_) => "list",
            BlockBody::Other { kind, .. } => kind,
        }
    }

    /// Editable text of the block. List items are newline separated.
    pub fn text(&self) -> String {
        match &self.body {
            BlockBody::Paragraph(p) => p.text.clone(),
            BlockBody::Header(h) => h.text.clone(),
            BlockBody::List(l) => l.items.join("\n"),
            BlockBody::Other { data, .. } => data
                .get("text")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<i64>,
    pub blocks: Vec<Block>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl Document {
    pub fn new(blocks: Vec<Block>) -> Self {
        Document { time: None, blocks, version: None }
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn serialize(&self) -> Result<String, BlogError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse the wire form. An empty string is an empty document; one level of
    /// string encoding (`"\"{...}\""`) is unwrapped. Anything else that is not
    /// an object with a `blocks` array of `{type, data}` entries is a
    /// [`BlogError::Parse`] for the caller to recover from.
    pub fn deserialize(wire: &str) -> Result<Document, BlogError> {
        let trimmed = wire.trim();
        if trimmed.is_empty() {
            return Ok(Document::default());
        }

        match parse_value(trimmed)? {
            Value::String(inner) => {
                let inner = inner.trim();
                if inner.is_empty() {
                    return Ok(Document::default());
                }
                match parse_value(inner)? {
                    Value::String(_) => Err(BlogError::Parse(
                        "content is encoded more than once".to_string(),
                    )),
                    value => from_value(value),
                }
            }
            value => from_value(value),
        }
    }

    /// Plain text of every block joined by spaces, cut at `max_chars` and
    /// suffixed with `...`. `None` when the document carries no text.
    pub fn excerpt(&self, max_chars: usize) -> Option<String> {
        let joined = self
            .blocks
            .iter()
            .map(|b| b.text().replace('\n', " "))
            .filter(|t| !t.trim().is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        if joined.trim().is_empty() {
            return None;
        }

        let cut: String = joined.chars().take(max_chars).collect();
        Some(format!("{}...", cut))
    }

    /// Import plain text: blank lines separate paragraphs, `#` prefixes make
    /// headers, and runs of `- `/`* ` or `1. ` lines make lists.
    pub fn from_plain_text(text: &str) -> Document {
        let mut blocks = Vec::new();
        let mut paragraph: Vec<&str> = Vec::new();
        let mut list: Option<(ListStyle, Vec<String>)> = None;

        fn flush_paragraph(paragraph: &mut Vec<&str>, blocks: &mut Vec<Block>) {
            if !paragraph.is_empty() {
                blocks.push(Block::paragraph(paragraph.join(" ")));
                paragraph.clear();
            }
        }

        fn flush_list(list: &mut Option<(ListStyle, Vec<String>)>, blocks: &mut Vec<Block>) {
            if let Some((style, items)) = list.take() {
                blocks.push(Block::list(style, items));
            }
        }

        for line in text.lines() {
            let line = line.trim_end();
            let trimmed = line.trim_start();

            if trimmed.is_empty() {
                flush_paragraph(&mut paragraph, &mut blocks);
                flush_list(&mut list, &mut blocks);
                continue;
            }

            if let Some((level, heading)) = heading_line(trimmed) {
                flush_paragraph(&mut paragraph, &mut blocks);
                flush_list(&mut list, &mut blocks);
                blocks.push(Block::header(heading, level));
                continue;
            }

            if let Some((style, item)) = list_line(trimmed) {
                flush_paragraph(&mut paragraph, &mut blocks);
                match list.as_mut() {
                    Some((current, items)) if *current == style => {
                        items.push(item.to_string());
                        continue;
                    }
                    _ => {}
                }
                flush_list(&mut list, &mut blocks);
                list = Some((style, vec![item.to_string()]));
                continue;
            }

            flush_list(&mut list, &mut blocks);
            paragraph.push(trimmed);
        }

        flush_paragraph(&mut paragraph, &mut blocks);
        flush_list(&mut list, &mut blocks);
        Document::new(blocks)
    }
}

fn parse_value(text: &str) -> Result<Value, BlogError> {
    serde_json::from_str(text).map_err(|e| BlogError::Parse(e.to_string()))
}

fn from_value(value: Value) -> Result<Document, BlogError> {
    serde_json::from_value(value).map_err(|e| BlogError::Parse(e.to_string()))
}

fn heading_line(line: &str) -> Option<(i64, &str)> {
    let hashes = line.chars().take_while(|c| *c == '#').count();
    if hashes == 0 || hashes > 6 {
        return None;
    }
    let rest = &line[hashes..];
    rest.strip_prefix(' ')
        .map(|text| (hashes as i64, text.trim()))
}

fn list_line(line: &str) -> Option<(ListStyle, &str)> {
    if let Some(item) = line.strip_prefix("- ").or_else(|| line.strip_prefix("* ")) {
        return Some((ListStyle::Unordered, item.trim()));
    }

    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        if let Some(item) = line[digits..].strip_prefix(". ") {
            return Some((ListStyle::Ordered, item.trim()));
        }
    }
    None
}

/// A post body as found on the wire, classified for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Empty,
    Structured(Document),
    /// Legacy or free text; shown verbatim.
    Unstructured(String),
}

impl Content {
    pub fn from_wire(wire: Option<&str>) -> Content {
        let raw = match wire {
            Some(raw) if !raw.trim().is_empty() => raw,
            _ => return Content::Empty,
        };

        // A JSON-encoded empty string.
        if raw.trim() == "\"\"" {
            return Content::Empty;
        }

        match Document::deserialize(raw) {
            Ok(doc) if !doc.is_empty() => Content::Structured(doc),
            Ok(_) => Content::Unstructured(raw.to_string()),
            Err(e) => {
                log::debug!("content is not a block document, showing as text: {}", e);
                Content::Unstructured(raw.to_string())
            }
        }
    }
}
