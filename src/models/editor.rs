//! Interactive block editing session.
//!
//! [`BlockEditor::open`] seeds a session once and hands back an
//! [`EditorHandle`]. From then on the handle owns the document; every
//! successful [`Edit`] reports the whole document to the host callback
//! before `apply` returns. Closing (or dropping) the handle releases the
//! callback and anything it captured.

use thiserror::Error;
use serde_json::Map;

use crate::models::document::{Block, BlockBody, Document, HeaderData, ListData, ListStyle, ParagraphData, DEFAULT_HEADER_LEVEL};

/// Block kinds a user can create or convert between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Paragraph,
    Header,
    List,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Edit {
    Insert { index: usize, block: Block },
    /// Replace the text; for lists each line becomes an item.
    SetText { index: usize, text: String },
    SetHeaderLevel { index: usize, level: i64 },
    SetListStyle { index: usize, style: ListStyle },
    Convert { index: usize, to: BlockKind },
    Remove { index: usize },
    Move { from: usize, to: usize },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("No block at position {index} (document has {len})")]
    OutOfRange { index: usize, len: usize },

    #[error("Cannot {action} a {kind} block")]
    NotApplicable { action: &'static str, kind: String },
}

pub type ChangeCallback<'a> = Box<dyn FnMut(&Document) + 'a>;

pub struct BlockEditor;

impl BlockEditor {
    pub fn open<'a, F>(initial: Document, on_change: F) -> EditorHandle<'a>
    where
        F: FnMut(&Document) + 'a,
    {
        log::debug!("editor opened with {} blocks", initial.blocks.len());
        EditorHandle {
            document: initial,
            on_change: Some(Box::new(on_change)),
        }
    }
}

pub struct EditorHandle<'a> {
    document: Document,
    on_change: Option<ChangeCallback<'a>>,
}

impl<'a> EditorHandle<'a> {
    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn len(&self) -> usize {
        self.document.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.document.blocks.is_empty()
    }

    pub fn apply(&mut self, edit: Edit) -> Result<(), EditError> {
        apply_edit(&mut self.document, edit)?;
        if let Some(callback) = self.on_change.as_mut() {
            callback(&self.document);
        }
        Ok(())
    }

    /// End the session and take the final document.
    pub fn close(mut self) -> Document {
        self.release();
        std::mem::take(&mut self.document)
    }

    fn release(&mut self) {
        if self.on_change.take().is_some() {
            log::debug!("editor closed with {} blocks", self.document.blocks.len());
        }
    }
}

impl Drop for EditorHandle<'_> {
    fn drop(&mut self) {
        self.release();
    }
}

fn check(doc: &Document, index: usize) -> Result<(), EditError> {
    if index < doc.blocks.len() {
        Ok(())
    } else {
        Err(EditError::OutOfRange { index, len: doc.blocks.len() })
    }
}

fn apply_edit(doc: &mut Document, edit: Edit) -> Result<(), EditError> {
    match edit {
        Edit::Insert { index, block } => {
            if index > doc.blocks.len() {
                return Err(EditError::OutOfRange { index, len: doc.blocks.len() });
            }
            doc.blocks.insert(index, block);
        }
        Edit::SetText { index, text } => {
            check(doc, index)?;
            let block = &mut doc.blocks[index];
            match &mut block.body {
                BlockBody::Paragraph(p) => p.text = text,
                BlockBody::Header(h) => h.text = text,
                BlockBody::List(l) => l.items = text.split('\n').map(str::to_string).collect(),
                BlockBody::Other { kind, .. } => {
                    return Err(EditError::NotApplicable { action: "edit", kind: kind.clone() })
                }
            }
        }
        Edit::SetHeaderLevel { index, level } => {
            check(doc, index)?;
            let block = &mut doc.blocks[index];
            match &mut block.body {
                BlockBody::Header(h) => h.level = level.clamp(1, 6),
                _ => {
                    return Err(EditError::NotApplicable {
                        action: "set the level of",
                        kind: block.kind().to_string(),
                    })
                }
            }
        }
        Edit::SetListStyle { index, style } => {
            check(doc, index)?;
            let block = &mut doc.blocks[index];
            match &mut block.body {
                BlockBody::List(l) => l.style = style,
                _ => {
                    return Err(EditError::NotApplicable {
                        action: "restyle",
                        kind: block.kind().to_string(),
                    })
                }
            }
        }
        Edit::Convert { index, to } => {
            check(doc, index)?;
            let block = &mut doc.blocks[index];
            if let BlockBody::Other { kind, .. } = &block.body {
                return Err(EditError::NotApplicable { action: "convert", kind: kind.clone() });
            }
            let text = block.text();
            block.body = match to {
                BlockKind::Paragraph => BlockBody::Paragraph(ParagraphData {
                    text: text.replace('\n', " "),
                    extra: Map::new(),
                }),
                BlockKind::Header => BlockBody::Header(HeaderData {
                    text: text.replace('\n', " "),
                    level: DEFAULT_HEADER_LEVEL,
                    extra: Map::new(),
                }),
                BlockKind::List => BlockBody::List(ListData {
                    style: ListStyle::Unordered,
                    items: text.split('\n').map(str::to_string).collect(),
                    extra: Map::new(),
                }),
            };
        }
        Edit::Remove { index } => {
            check(doc, index)?;
            doc.blocks.remove(index);
        }
        Edit::Move { from, to } => {
            check(doc, from)?;
            check(doc, to)?;
            let block = doc.blocks.remove(from);
            doc.blocks.insert(to, block);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn every_edit_emits_the_whole_document() {
        let emitted = RefCell::new(Vec::new());
        {
            let mut editor = BlockEditor::open(Document::default(), |doc: &Document| {
                emitted.borrow_mut().push(doc.clone())
            });
            editor.apply(Edit::Insert { index: 0, block: Block::paragraph("") }).unwrap();
            editor.apply(Edit::SetText { index: 0, text: "hello".into() }).unwrap();
            editor.apply(Edit::Insert { index: 1, block: Block::header("Next", 2) }).unwrap();
            editor.close();
        }

        let emitted = emitted.into_inner();
        assert_eq!(emitted.len(), 3);
        assert_eq!(emitted[0].blocks, vec![Block::paragraph("")]);
        assert_eq!(emitted[1].blocks, vec![Block::paragraph("hello")]);
        assert_eq!(emitted[2].blocks, vec![Block::paragraph("hello"), Block::header("Next", 2)]);
    }

    #[test]
    fn rejected_edit_does_not_emit() {
        let mut calls = 0;
        {
            let mut editor = BlockEditor::open(Document::default(), |_: &Document| calls += 1);
            assert_eq!(
                editor.apply(Edit::Remove { index: 0 }),
                Err(EditError::OutOfRange { index: 0, len: 0 })
            );
            assert_eq!(
                editor.apply(Edit::Insert { index: 2, block: Block::paragraph("x") }),
                Err(EditError::OutOfRange { index: 2, len: 0 })
            );
        }
        assert_eq!(calls, 0);
    }

    #[test]
    fn seeded_document_is_edited_in_place() {
        let seed = Document::new(vec![
            Block::paragraph("a"),
            Block::list(ListStyle::Unordered, vec!["x".into()]),
            Block::header("c", 3),
        ]);
        let mut editor = BlockEditor::open(seed, |_: &Document| {});
        editor.apply(Edit::Move { from: 2, to: 0 }).unwrap();
        editor.apply(Edit::SetText { index: 2, text: "x\ny".into() }).unwrap();
        editor.apply(Edit::SetListStyle { index: 2, style: ListStyle::Ordered }).unwrap();
        editor.apply(Edit::SetHeaderLevel { index: 0, level: 12 }).unwrap();
        editor.apply(Edit::Convert { index: 1, to: BlockKind::Header }).unwrap();

        assert_eq!(
            editor.close().blocks,
            vec![
                Block::header("c", 6),
                Block::header("a", DEFAULT_HEADER_LEVEL),
                Block::list(ListStyle::Ordered, vec!["x".into(), "y".into()]),
            ]
        );
    }

    #[test]
    fn edits_that_do_not_fit_the_block_are_refused() {
        let seed = Document::new(vec![Block::paragraph("p"), Block::other("embed", Default::default())]);
        let mut editor = BlockEditor::open(seed, |_: &Document| {});
        assert!(matches!(
            editor.apply(Edit::SetHeaderLevel { index: 0, level: 2 }),
            Err(EditError::NotApplicable { .. })
        ));
        assert!(matches!(
            editor.apply(Edit::SetText { index: 1, text: "t".into() }),
            Err(EditError::NotApplicable { .. })
        ));
    }

    #[test]
    fn closing_releases_the_callback() {
        let witness = Rc::new(());
        let held = Rc::clone(&witness);
        let editor = BlockEditor::open(Document::default(), move |_: &Document| {
            let _keep = &held;
        });
        assert_eq!(Rc::strong_count(&witness), 2);
        editor.close();
        assert_eq!(Rc::strong_count(&witness), 1);

        let held = Rc::clone(&witness);
        let editor = BlockEditor::open(Document::default(), move |_: &Document| {
            let _keep = &held;
        });
        drop(editor);
        assert_eq!(Rc::strong_count(&witness), 1);
    }
}
