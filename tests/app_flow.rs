mod common;

use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{backend::TestBackend, Terminal};
use tokio::sync::mpsc;

use blogterm::controllers::app_controller::{App, Message, Screen};
use blogterm::models::client::BlogApi;
use blogterm::models::config::Config;
use blogterm::models::session::SessionStore;
use blogterm::models::storage::{MemoryStorage, Storage, TOKEN_KEY, USERNAME_KEY, USER_ID_KEY};
use blogterm::views::widgets::NoticeKind;

use common::{FakeApi, TOKEN, USERNAME, USER_ID};

struct Harness {
    app: App<MemoryStorage>,
    rx: mpsc::UnboundedReceiver<Message>,
}

impl Harness {
    fn new(fake: Arc<FakeApi>, storage: MemoryStorage) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let api: Arc<dyn BlogApi> = fake;
        let mut app = App::new(api, SessionStore::new(storage), Config::default(), tx);
        app.start();
        Harness { app, rx }
    }

    /// Deliver background results until nothing more arrives.
    async fn settle(&mut self) {
        while let Ok(Some(message)) = tokio::time::timeout(Duration::from_millis(100), self.rx.recv()).await {
            self.app.handle(message);
        }
    }

    /// Take finished background results without applying them.
    async fn hold(&mut self) -> Vec<Message> {
        let mut held = Vec::new();
        while let Ok(Some(message)) = tokio::time::timeout(Duration::from_millis(100), self.rx.recv()).await {
            held.push(message);
        }
        held
    }

    fn deliver(&mut self, messages: Vec<Message>) {
        for message in messages {
            self.app.handle(message);
        }
    }

    fn press(&mut self, code: KeyCode) {
        self.app.on_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn ctrl(&mut self, c: char) {
        self.app.on_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL));
    }

    fn typed(&mut self, text: &str) {
        for c in text.chars() {
            self.press(KeyCode::Char(c));
        }
    }

    fn notice(&self) -> Option<(NoticeKind, String)> {
        self.app.notices().current().map(|n| (n.kind, n.text.clone()))
    }
}

fn stored_session() -> MemoryStorage {
    let mut storage = MemoryStorage::new();
    storage.set(TOKEN_KEY, TOKEN).unwrap();
    storage.set(USER_ID_KEY, USER_ID).unwrap();
    storage.set(USERNAME_KEY, USERNAME).unwrap();
    storage
}

#[tokio::test]
async fn anonymous_start_lands_on_login_then_dashboard() {
    let fake = Arc::new(FakeApi::new());
    fake.seed_post("p1", "First", "someone-else");
    let mut h = Harness::new(fake, MemoryStorage::new());
    assert!(matches!(h.app.screen(), Screen::Auth(_)));

    h.typed("a@b.c");
    h.press(KeyCode::Tab);
    h.typed("secret");
    h.press(KeyCode::Enter);
    h.settle().await;

    assert!(h.app.session().is_authenticated());
    assert!(matches!(h.app.screen(), Screen::Dashboard));
    assert_eq!(h.app.dashboard().posts.items.len(), 1);
    assert_eq!(h.app.session().storage().len(), 3);
}

#[tokio::test]
async fn wrong_password_stays_on_login() {
    let mut h = Harness::new(Arc::new(FakeApi::new()), MemoryStorage::new());
    h.typed("a@b.c");
    h.press(KeyCode::Tab);
    h.typed("nope");
    h.press(KeyCode::Enter);
    h.settle().await;

    assert!(matches!(h.app.screen(), Screen::Auth(view) if !view.busy));
    assert_eq!(h.notice(), Some((NoticeKind::Error, "Invalid credentials".to_string())));
}

#[tokio::test]
async fn rejected_stored_session_returns_to_login() {
    let fake = Arc::new(FakeApi::rejecting_sessions());
    fake.seed_post("p1", "First", USER_ID);
    let mut h = Harness::new(fake, stored_session());
    h.settle().await;

    assert!(!h.app.session().is_authenticated());
    assert!(h.app.session().storage().is_empty());
    assert!(matches!(h.app.screen(), Screen::Auth(_)));
    assert!(h.app.dashboard().posts.items.is_empty());
}

#[tokio::test]
async fn only_own_posts_can_be_deleted_and_only_after_yes() {
    let fake = Arc::new(FakeApi::new());
    fake.seed_post("p1", "Mine", USER_ID);
    fake.seed_post("p2", "Theirs", "someone-else");
    let mut h = Harness::new(fake.clone(), stored_session());
    h.settle().await;
    assert_eq!(h.app.dashboard().posts.items.len(), 2);

    h.press(KeyCode::Char('j'));
    h.press(KeyCode::Char('d'));
    assert!(matches!(h.app.screen(), Screen::Dashboard));
    assert_eq!(
        h.notice(),
        Some((NoticeKind::Error, "You can only delete your own blogs".to_string()))
    );

    h.press(KeyCode::Char('k'));
    h.press(KeyCode::Char('d'));
    assert!(matches!(h.app.screen(), Screen::ConfirmDelete { .. }));
    h.press(KeyCode::Char('n'));
    assert!(matches!(h.app.screen(), Screen::Dashboard));
    h.settle().await;
    assert_eq!(fake.post_count(), 2);

    h.press(KeyCode::Char('d'));
    h.press(KeyCode::Char('y'));
    h.settle().await;
    assert_eq!(fake.post_count(), 1);
    assert_eq!(h.app.dashboard().posts.items.len(), 1);
    assert_eq!(h.app.dashboard().posts.items[0].id, "p2");
}

#[tokio::test]
async fn compose_and_publish() {
    let fake = Arc::new(FakeApi::new());
    let mut h = Harness::new(fake.clone(), stored_session());
    h.settle().await;

    h.press(KeyCode::Char('n'));
    assert!(matches!(h.app.screen(), Screen::Compose(_)));

    h.ctrl('s');
    assert_eq!(h.notice(), Some((NoticeKind::Error, "Title is required".to_string())));

    h.typed("Hi");
    for _ in 0..3 {
        h.press(KeyCode::Tab);
    }
    h.press(KeyCode::Char('p'));
    h.typed("world");
    h.press(KeyCode::Esc);
    h.ctrl('s');
    h.settle().await;

    assert!(matches!(h.app.screen(), Screen::Dashboard));
    assert_eq!(
        h.notice(),
        Some((NoticeKind::Info, "Blog created successfully!".to_string()))
    );
    assert_eq!(fake.post_count(), 1);
    assert_eq!(h.app.dashboard().posts.items[0].title, "Hi");
}

#[tokio::test]
async fn opening_stories_marks_them_viewed() {
    let fake = Arc::new(FakeApi::new());
    fake.seed_story("s1", "ann");
    fake.seed_story("s2", "bob");
    let mut h = Harness::new(fake, stored_session());
    h.settle().await;

    h.press(KeyCode::Char('s'));
    assert!(matches!(h.app.screen(), Screen::Story(0)));
    h.press(KeyCode::Char('n'));
    assert!(matches!(h.app.screen(), Screen::Story(1)));
    h.press(KeyCode::Char('n'));
    assert!(matches!(h.app.screen(), Screen::Dashboard));

    assert!(h.app.session().viewed().is_viewed("s1"));
    assert!(h.app.session().viewed().is_viewed("s2"));
}

#[tokio::test]
async fn dashboard_draws_welcome_and_posts() {
    let fake = Arc::new(FakeApi::new());
    fake.seed_post("p1", "Mine", USER_ID);
    let mut h = Harness::new(fake, stored_session());
    h.settle().await;

    let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
    terminal.draw(|f| h.app.draw(f)).unwrap();

    let screen: String = terminal
        .backend()
        .buffer()
        .content
        .iter()
        .map(|cell| cell.symbol.as_str())
        .collect();
    assert!(screen.contains("Welcome to the My Blog, ann!"));
    assert!(screen.contains("Mine"));
    assert!(screen.contains("[yours]"));
}

#[tokio::test]
async fn older_feed_response_does_not_replace_newer_one() {
    let fake = Arc::new(FakeApi::new());
    fake.seed_post("p1", "First", USER_ID);
    let mut h = Harness::new(fake.clone(), stored_session());
    h.settle().await;

    h.press(KeyCode::Char('r'));
    let older = h.hold().await;
    fake.seed_post("p2", "Second", USER_ID);
    h.press(KeyCode::Char('r'));
    let newer = h.hold().await;

    h.deliver(newer);
    h.deliver(older);
    assert_eq!(h.app.dashboard().posts.items.len(), 2);
}

#[tokio::test]
async fn late_post_from_a_left_detail_view_is_dropped() {
    let fake = Arc::new(FakeApi::new());
    fake.seed_post("p1", "First", USER_ID);
    fake.seed_post("p2", "Second", USER_ID);
    let mut h = Harness::new(fake, stored_session());
    h.settle().await;

    h.press(KeyCode::Enter);
    let first_visit = h.hold().await;
    h.press(KeyCode::Esc);
    h.settle().await;
    h.press(KeyCode::Char('j'));
    h.press(KeyCode::Enter);
    let second_visit = h.hold().await;

    h.deliver(first_visit);
    match h.app.screen() {
        Screen::Detail(view) => {
            assert_eq!(view.post_id, "p2");
            assert!(view.post.is_none());
        }
        _ => panic!("expected the detail screen"),
    }

    h.deliver(second_visit);
    match h.app.screen() {
        Screen::Detail(view) => assert_eq!(view.post.as_ref().map(|p| p.id.as_str()), Some("p2")),
        _ => panic!("expected the detail screen"),
    }
}

#[tokio::test]
async fn save_finishing_after_cancel_leaves_new_draft_alone() {
    let fake = Arc::new(FakeApi::new());
    let mut h = Harness::new(fake.clone(), stored_session());
    h.settle().await;

    h.press(KeyCode::Char('n'));
    h.typed("Hi");
    h.ctrl('s');
    let saved = h.hold().await;
    h.press(KeyCode::Esc);
    h.settle().await;

    h.press(KeyCode::Char('n'));
    h.typed("Draft");
    h.deliver(saved);

    match h.app.screen() {
        Screen::Compose(view) => {
            assert_eq!(view.title, "Draft");
            assert!(!view.saving);
        }
        _ => panic!("expected the compose screen to stay open"),
    }
    assert_eq!(fake.post_count(), 1);
}
