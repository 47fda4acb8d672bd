use std::time::{Duration, Instant};

use ratatui::widgets::ListState;

pub struct StatefulList<T> {
    pub state: ListState,
    pub items: Vec<T>,
}

impl<T> StatefulList<T> {
    pub fn with_items(items: Vec<T>) -> StatefulList<T> {
        let mut state = ListState::default();
        // Start with the first item selected
        if !items.is_empty() {
            state.select(Some(0));
        }
        StatefulList {
            state,
            items,
        }
    }

    /// Swap in a fresh set of items, keeping the cursor in range.
    pub fn set_items(&mut self, items: Vec<T>) {
        self.items = items;
        let selected = match (self.state.selected(), self.items.len()) {
            (_, 0) => None,
            (Some(i), len) => Some(i.min(len - 1)),
            (None, _) => Some(0),
        };
        self.state.select(selected);
    }

    pub fn selected(&self) -> Option<&T> {
        self.state.selected().and_then(|i| self.items.get(i))
    }

    pub fn next(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let i = match self.state.selected() {
            Some(i) => {
                if i >= self.items.len() - 1 {
                    i
                } else {
                    i + 1
                }
            }
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let i = match self.state.selected() {
            Some(i) => i.saturating_sub(1),
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn first(&mut self) {
        if !self.items.is_empty() {
            self.state.select(Some(0));
        }
    }

    pub fn last(&mut self) {
        if !self.items.is_empty() {
            self.state.select(Some(self.items.len() - 1));
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
    expires: Instant,
}

/// One transient status-line message at a time; newer replaces older.
#[derive(Debug, Default)]
pub struct Notices {
    current: Option<Notice>,
}

pub const NOTICE_TTL: Duration = Duration::from_secs(3);

impl Notices {
    pub fn info(&mut self, text: impl Into<String>) {
        self.push(NoticeKind::Info, text.into());
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.push(NoticeKind::Error, text.into());
    }

    fn push(&mut self, kind: NoticeKind, text: String) {
        match kind {
            NoticeKind::Info => log::info!("{}", text),
            NoticeKind::Error => log::warn!("{}", text),
        }
        self.current = Some(Notice {
            kind,
            text,
            expires: Instant::now() + NOTICE_TTL,
        });
    }

    pub fn current(&self) -> Option<&Notice> {
        self.current.as_ref()
    }

    pub fn expire(&mut self, now: Instant) {
        if self.current.as_ref().is_some_and(|n| now >= n.expires) {
            self.current = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn navigation_on_empty_list_is_a_no_op() {
        let mut list: StatefulList<u8> = StatefulList::with_items(vec![]);
        list.next();
        list.previous();
        list.last();
        assert_eq!(list.state.selected(), None);
        assert!(list.selected().is_none());
    }

    #[test]
    fn cursor_stays_in_range_after_reload() {
        let mut list = StatefulList::with_items(vec![1, 2, 3]);
        list.last();
        list.set_items(vec![7]);
        assert_eq!(list.selected(), Some(&7));

        list.set_items(vec![]);
        assert_eq!(list.state.selected(), None);
    }

    #[test]
    fn notices_expire() {
        let mut notices = Notices::default();
        notices.error("Failed to fetch blogs");
        assert_eq!(notices.current().map(|n| n.kind), Some(NoticeKind::Error));

        notices.expire(Instant::now());
        assert!(notices.current().is_some());

        notices.expire(Instant::now() + NOTICE_TTL + Duration::from_millis(1));
        assert!(notices.current().is_none());
    }
}
