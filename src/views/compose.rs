//! Create/edit screen: form fields plus the block editor.

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block as BlockWidget, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::models::document::{BlockBody, Document, ListStyle};
use crate::models::editor::{BlockEditor, EditorHandle};
use crate::models::post::{NewPost, Post, PostUpdate};
use crate::models::render::render;
use crate::views::blocks::body_lines;

pub const HINTS: &str =
    "tab field  p/h/l add  enter edit  t convert  +/- level  o list style  J/K move  x remove  ctrl-p preview  ctrl-s save  esc cancel";
pub const EDITING_HINTS: &str = "typing edits the block  enter new item (lists)  esc done";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComposeMode {
    Create,
    Edit { post_id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Location,
    Image,
    Video,
    Body,
}

pub struct ComposeView {
    pub mode: ComposeMode,
    pub title: String,
    pub location: String,
    pub image: String,
    pub video: String,
    pub focus: Field,
    pub editor: EditorHandle<'static>,
    /// Latest document reported by the editor.
    pub draft: Rc<RefCell<Document>>,
    pub selected: usize,
    pub editing: bool,
    pub buffer: String,
    pub preview: bool,
    pub saving: bool,
}

impl ComposeView {
    pub fn create() -> Self {
        Self::open(ComposeMode::Create, String::new(), String::new(), Document::default())
    }

    pub fn edit(post: &Post) -> Self {
        let update = PostUpdate::from_post(post);
        Self::open(
            ComposeMode::Edit { post_id: post.id.clone() },
            update.title,
            update.location.unwrap_or_default(),
            update.content,
        )
    }

    fn open(mode: ComposeMode, title: String, location: String, seed: Document) -> Self {
        let draft = Rc::new(RefCell::new(seed.clone()));
        let sink = Rc::clone(&draft);
        let editor = BlockEditor::open(seed, move |doc: &Document| {
            *sink.borrow_mut() = doc.clone();
        });

        ComposeView {
            mode,
            title,
            location,
            image: String::new(),
            video: String::new(),
            focus: Field::Title,
            editor,
            draft,
            selected: 0,
            editing: false,
            buffer: String::new(),
            preview: false,
            saving: false,
        }
    }

    pub fn fields(&self) -> &'static [Field] {
        match self.mode {
            ComposeMode::Create => &[Field::Title, Field::Location, Field::Image, Field::Body],
            ComposeMode::Edit { .. } => &[Field::Title, Field::Location, Field::Image, Field::Video, Field::Body],
        }
    }

    pub fn focus_next(&mut self) {
        let fields = self.fields();
        let at = fields.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = fields[(at + 1) % fields.len()];
    }

    pub fn focus_previous(&mut self) {
        let fields = self.fields();
        let at = fields.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = fields[(at + fields.len() - 1) % fields.len()];
    }

    /// Text of the focused form field; `None` while the body has focus.
    pub fn field_mut(&mut self) -> Option<&mut String> {
        match self.focus {
            Field::Title => Some(&mut self.title),
            Field::Location => Some(&mut self.location),
            Field::Image => Some(&mut self.image),
            Field::Video => Some(&mut self.video),
            Field::Body => None,
        }
    }

    pub fn content(&self) -> Document {
        self.draft.borrow().clone()
    }

    pub fn new_post(&self) -> NewPost {
        NewPost {
            title: self.title.trim().to_string(),
            content: self.content(),
            image: path_field(&self.image),
            location: text_field(&self.location),
        }
    }

    pub fn update(&self) -> PostUpdate {
        PostUpdate {
            title: self.title.trim().to_string(),
            content: self.content(),
            location: text_field(&self.location),
            image: path_field(&self.image),
            video: path_field(&self.video),
        }
    }
}

fn text_field(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn path_field(value: &str) -> Option<PathBuf> {
    text_field(value).map(PathBuf::from)
}

fn block_label(body: &BlockBody) -> String {
    match body {
        BlockBody::Paragraph(_) => "P".to_string(),
        BlockBody::Header(h) => format!("H{}", h.level),
        BlockBody::List(l) => match l.style {
            ListStyle::Ordered => "OL".to_string(),
            ListStyle::Unordered => "UL".to_string(),
        },
        BlockBody::Other { kind, .. } => kind.clone(),
    }
}

fn input<'a>(label: &'a str, value: &'a str, focused: bool) -> Paragraph<'a> {
    let style = if focused {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    Paragraph::new(value).block(BlockWidget::default().title(label).borders(Borders::ALL).border_style(style))
}

pub fn render_compose<B: Backend>(f: &mut Frame<B>, area: Rect, view: &ComposeView) {
    let heading = match view.mode {
        ComposeMode::Create => "Create a New Blog Post",
        ComposeMode::Edit { .. } => "Edit Blog",
    };
    let heading = if view.saving { format!("{} (saving...)", heading) } else { heading.to_string() };

    let fields = view.fields();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            fields
                .iter()
                .map(|f| if *f == Field::Body { Constraint::Min(3) } else { Constraint::Length(3) })
                .collect::<Vec<_>>(),
        )
        .split(area);

    for (i, field) in fields.iter().enumerate() {
        let focused = *field == view.focus;
        match field {
            Field::Title => f.render_widget(input("Title", &view.title, focused), chunks[i]),
            Field::Location => f.render_widget(input("Location", &view.location, focused), chunks[i]),
            Field::Image => f.render_widget(input("Image file", &view.image, focused), chunks[i]),
            Field::Video => f.render_widget(input("Video file", &view.video, focused), chunks[i]),
            Field::Body => render_body(f, chunks[i], view, focused, &heading),
        }
    }
}

fn render_body<B: Backend>(f: &mut Frame<B>, area: Rect, view: &ComposeView, focused: bool, heading: &str) {
    let border = if focused { Style::default().fg(Color::Yellow) } else { Style::default() };

    if view.preview {
        let doc = view.content();
        let mut lines = vec![
            Line::from(Span::styled(view.title.clone(), Style::default().add_modifier(Modifier::BOLD))),
            Line::from(Span::styled(view.location.clone(), Style::default().fg(Color::DarkGray))),
            Line::from(""),
        ];
        lines.extend(body_lines(&render(&doc)));
        let preview = Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(BlockWidget::default().title(format!("{} - preview", heading)).borders(Borders::ALL).border_style(border));
        f.render_widget(preview, area);
        return;
    }

    let doc = view.editor.document();
    if doc.is_empty() {
        let hint = Paragraph::new("Start writing your blog post here... (p paragraph, h header, l list)")
            .style(Style::default().fg(Color::DarkGray))
            .block(BlockWidget::default().title(heading.to_string()).borders(Borders::ALL).border_style(border));
        f.render_widget(hint, area);
        return;
    }

    let items: Vec<ListItem> = doc
        .blocks
        .iter()
        .enumerate()
        .map(|(i, block)| {
            let text = if view.editing && i == view.selected {
                format!("{}▏", view.buffer)
            } else {
                block.text()
            };
            let mut lines: Vec<Line> = text
                .split('\n')
                .map(|l| Line::from(format!("      {}", l)))
                .collect();
            if let Some(first) = lines.first_mut() {
                *first = Line::from(vec![
                    Span::styled(
                        format!("{:<5} ", block_label(&block.body)),
                        Style::default().fg(Color::Magenta),
                    ),
                    Span::raw(text.split('\n').next().unwrap_or_default().to_string()),
                ]);
            }
            ListItem::new(lines)
        })
        .collect();

    let mut state = ListState::default();
    state.select(Some(view.selected.min(doc.blocks.len() - 1)));

    let list = List::new(items)
        .block(BlockWidget::default().title(heading.to_string()).borders(Borders::ALL).border_style(border))
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD));
    f.render_stateful_widget(list, area, &mut state);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::document::Block;
    use crate::models::editor::Edit;

    #[test]
    fn draft_follows_editor() {
        let mut view = ComposeView::create();
        view.editor.apply(Edit::Insert { index: 0, block: Block::paragraph("hi") }).unwrap();
        assert_eq!(view.content().blocks, vec![Block::paragraph("hi")]);
    }

    #[test]
    fn optional_fields_are_trimmed_away() {
        let mut view = ComposeView::create();
        view.title = " Hi ".into();
        view.location = "   ".into();
        view.image = "/tmp/a.png".into();
        let post = view.new_post();
        assert_eq!(post.title, "Hi");
        assert_eq!(post.location, None);
        assert_eq!(post.image, Some(PathBuf::from("/tmp/a.png")));
    }

    #[test]
    fn edit_mode_has_video_field() {
        let post: Post = serde_json::from_str(r#"{"_id":"p","title":"Old","location":"Oslo"}"#).unwrap();
        let mut view = ComposeView::edit(&post);
        assert_eq!(view.title, "Old");
        assert_eq!(view.location, "Oslo");
        assert!(view.fields().contains(&Field::Video));

        view.focus_previous();
        assert_eq!(view.focus, Field::Body);
        view.focus_next();
        assert_eq!(view.focus, Field::Title);
    }
}
