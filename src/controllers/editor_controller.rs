//! Key handling for the compose screen.
//!
//! Outside the body the keys type into the focused form field. In the body
//! there are two modes: block commands, and editing the selected block's
//! text. While editing, every keystroke goes through the editor as a
//! `SetText`, so the draft always holds what is on screen.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::models::document::{Block, BlockBody, ListStyle, DEFAULT_HEADER_LEVEL};
use crate::models::editor::{BlockKind, Edit};
use crate::views::compose::{ComposeView, Field};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComposeAction {
    None,
    Submit,
    Cancel,
    Notice(String),
}

pub fn handle_key(view: &mut ComposeView, key: KeyEvent) -> ComposeAction {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('s') => {
                finish_editing(view);
                ComposeAction::Submit
            }
            KeyCode::Char('p') => {
                finish_editing(view);
                view.preview = !view.preview;
                ComposeAction::None
            }
            _ => ComposeAction::None,
        };
    }

    if view.editing {
        return editing_key(view, key);
    }

    match key.code {
        KeyCode::Tab => {
            view.focus_next();
            return ComposeAction::None;
        }
        KeyCode::BackTab => {
            view.focus_previous();
            return ComposeAction::None;
        }
        KeyCode::Esc => return ComposeAction::Cancel,
        _ => {}
    }

    if view.preview {
        return ComposeAction::None;
    }

    if view.focus == Field::Body {
        return block_key(view, key);
    }

    if key.code == KeyCode::Enter {
        view.focus_next();
    } else if let Some(field) = view.field_mut() {
        match key.code {
            KeyCode::Char(c) => field.push(c),
            KeyCode::Backspace => {
                field.pop();
            }
            _ => {}
        }
    }
    ComposeAction::None
}

fn apply(view: &mut ComposeView, edit: Edit) -> ComposeAction {
    match view.editor.apply(edit) {
        Ok(()) => ComposeAction::None,
        Err(e) => ComposeAction::Notice(e.to_string()),
    }
}

fn selected_body(view: &ComposeView) -> Option<&BlockBody> {
    view.editor.document().blocks.get(view.selected).map(|b| &b.body)
}

fn insert(view: &mut ComposeView, block: Block) -> ComposeAction {
    let index = if view.editor.is_empty() { 0 } else { view.selected + 1 };
    let action = apply(view, Edit::Insert { index, block });
    if action == ComposeAction::None {
        view.selected = index;
        view.buffer.clear();
        view.editing = true;
    }
    action
}

fn block_key(view: &mut ComposeView, key: KeyEvent) -> ComposeAction {
    let len = view.editor.len();
    let index = view.selected;

    match key.code {
        KeyCode::Down | KeyCode::Char('j') => {
            if index + 1 < len {
                view.selected += 1;
            }
            ComposeAction::None
        }
        KeyCode::Up | KeyCode::Char('k') => {
            view.selected = index.saturating_sub(1);
            ComposeAction::None
        }
        KeyCode::Char('p') => insert(view, Block::paragraph("")),
        KeyCode::Char('h') => insert(view, Block::header("", DEFAULT_HEADER_LEVEL)),
        KeyCode::Char('l') => insert(view, Block::list(ListStyle::Unordered, vec![String::new()])),
        KeyCode::Enter | KeyCode::Char('i') => {
            let text = match view.editor.document().blocks.get(index) {
                None => return ComposeAction::None,
                Some(block) => match &block.body {
                    BlockBody::Other { kind, .. } => {
                        return ComposeAction::Notice(format!("{} blocks are kept as they are", kind))
                    }
                    _ => block.text(),
                },
            };
            view.buffer = text;
            view.editing = true;
            ComposeAction::None
        }
        KeyCode::Char('x') | KeyCode::Delete => {
            if len == 0 {
                return ComposeAction::None;
            }
            let action = apply(view, Edit::Remove { index });
            view.selected = view.selected.min(view.editor.len().saturating_sub(1));
            action
        }
        KeyCode::Char('J') if index + 1 < len => {
            view.selected += 1;
            apply(view, Edit::Move { from: index, to: index + 1 })
        }
        KeyCode::Char('K') if index > 0 && index < len => {
            view.selected -= 1;
            apply(view, Edit::Move { from: index, to: index - 1 })
        }
        KeyCode::Char(c @ ('+' | '-')) => {
            let level = match selected_body(view) {
                Some(BlockBody::Header(h)) => h.level,
                Some(_) => return ComposeAction::Notice("Only headers have a level".to_string()),
                None => return ComposeAction::None,
            };
            let level = if c == '+' { level + 1 } else { level - 1 };
            apply(view, Edit::SetHeaderLevel { index, level })
        }
        KeyCode::Char('o') => {
            let style = match selected_body(view) {
                Some(BlockBody::List(l)) => match l.style {
                    ListStyle::Ordered => ListStyle::Unordered,
                    ListStyle::Unordered => ListStyle::Ordered,
                },
                Some(_) => return ComposeAction::Notice("Only lists have a style".to_string()),
                None => return ComposeAction::None,
            };
            apply(view, Edit::SetListStyle { index, style })
        }
        KeyCode::Char('t') => {
            let to = match selected_body(view) {
                Some(BlockBody::Paragraph(_)) => BlockKind::Header,
                Some(BlockBody::Header(_)) => BlockKind::List,
                Some(BlockBody::List(_)) => BlockKind::Paragraph,
                Some(BlockBody::Other { kind, .. }) => {
                    return ComposeAction::Notice(format!("{} blocks cannot be converted", kind))
                }
                None => return ComposeAction::None,
            };
            apply(view, Edit::Convert { index, to })
        }
        _ => ComposeAction::None,
    }
}

fn editing_key(view: &mut ComposeView, key: KeyEvent) -> ComposeAction {
    match key.code {
        KeyCode::Esc => {
            finish_editing(view);
            return ComposeAction::None;
        }
        KeyCode::Enter => {
            if matches!(selected_body(view), Some(BlockBody::List(_))) {
                view.buffer.push('\n');
            } else {
                finish_editing(view);
                return ComposeAction::None;
            }
        }
        KeyCode::Backspace => {
            view.buffer.pop();
        }
        KeyCode::Char(c) => view.buffer.push(c),
        _ => return ComposeAction::None,
    }

    let text = view.buffer.clone();
    apply(view, Edit::SetText { index: view.selected, text })
}

fn finish_editing(view: &mut ComposeView) {
    view.editing = false;
    view.buffer.clear();
}
