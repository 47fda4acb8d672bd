mod common;

use std::path::PathBuf;
use std::sync::Arc;

use blogterm::error::BlogError;
use blogterm::models::client::BlogApi;
use blogterm::models::document::{Block, Document};
use blogterm::models::post::NewPost;
use blogterm::models::render::{render, Node};
use blogterm::models::repository::{confirm_delete, PostRepository, StoryRepository};
use blogterm::models::session::{SessionState, SessionStore};
use blogterm::models::storage::{FileStorage, MemoryStorage, Storage, TOKEN_KEY, USERNAME_KEY, USER_ID_KEY};
use blogterm::models::story::NewStory;
use blogterm::models::user::User;

use common::{FakeApi, TOKEN, USERNAME, USER_ID};

fn signed_in() -> SessionStore<MemoryStorage> {
    let mut session = SessionStore::new(MemoryStorage::new());
    session.login(FakeApi::credentials()).unwrap();
    session
}

#[tokio::test]
async fn created_post_reads_back_with_its_paragraph() {
    let api: Arc<dyn BlogApi> = Arc::new(FakeApi::new());
    let session = signed_in();
    let repo = PostRepository::new(api, session.token().map(str::to_string));

    let created = repo
        .create_post(&NewPost {
            title: "Hello".into(),
            content: Document::new(vec![Block::paragraph("world")]),
            ..NewPost::default()
        })
        .await
        .unwrap();

    let fetched = repo.get_post(&created.id).await.unwrap();
    assert_eq!(fetched.title, "Hello");
    assert_eq!(render(&fetched.content), vec![Node::Text("world".into())]);
}

#[tokio::test]
async fn untitled_post_never_reaches_the_server() {
    let fake = Arc::new(FakeApi::new());
    let api: Arc<dyn BlogApi> = fake.clone();
    let repo = PostRepository::new(api, Some(TOKEN.to_string()));

    let err = repo.create_post(&NewPost::default()).await.unwrap_err();
    assert_eq!(err, BlogError::Validation("Title is required".into()));
    assert_eq!(fake.post_count(), 0);
}

#[tokio::test]
async fn delete_needs_confirmation() {
    let fake = Arc::new(FakeApi::new());
    fake.seed_post("p1", "Doomed", USER_ID);
    let api: Arc<dyn BlogApi> = fake.clone();
    let repo = PostRepository::new(api, Some(TOKEN.to_string()));

    assert!(confirm_delete("p1", "no").is_none());
    assert_eq!(fake.post_count(), 1);

    let confirmed = confirm_delete("p1", "y").unwrap();
    repo.delete_post(confirmed).await.unwrap();
    assert_eq!(fake.post_count(), 0);

    let again = confirm_delete("p1", "y").unwrap();
    assert!(matches!(repo.delete_post(again).await, Err(BlogError::NotFound(_))));
}

#[tokio::test]
async fn writes_without_a_token_are_auth_errors() {
    let api: Arc<dyn BlogApi> = Arc::new(FakeApi::new());
    let repo = PostRepository::new(api, None);
    let err = repo
        .create_post(&NewPost { title: "t".into(), ..NewPost::default() })
        .await
        .unwrap_err();
    assert!(err.is_auth());

    let mut session = signed_in();
    assert!(session.handle_error(&err));
    assert_eq!(session.state(), &SessionState::Anonymous);
}

#[tokio::test]
async fn story_without_image_is_rejected_locally() {
    let api: Arc<dyn BlogApi> = Arc::new(FakeApi::new());
    let repo = StoryRepository::new(api, Some(TOKEN.to_string()));

    let err = repo
        .create_story(&NewStory { image: None, caption: "hi".into() })
        .await
        .unwrap_err();
    assert_eq!(err, BlogError::Validation("Please select an image".into()));

    let story = repo
        .create_story(&NewStory { image: Some(PathBuf::from("s.png")), caption: "hi".into() })
        .await
        .unwrap();
    assert_eq!(repo.list_stories().await.unwrap()[0].id, story.id);
}

#[tokio::test]
async fn rejected_stored_session_ends_anonymous_and_purged() {
    let mut storage = MemoryStorage::new();
    storage.set(TOKEN_KEY, TOKEN).unwrap();
    storage.set(USER_ID_KEY, USER_ID).unwrap();
    storage.set(USERNAME_KEY, USERNAME).unwrap();

    let mut session = SessionStore::new(storage);
    let api = FakeApi::rejecting_sessions();
    assert_eq!(session.start(&api).await, &SessionState::Anonymous);
    assert_eq!(session.token(), None);
    assert!(session.storage().is_empty());
}

#[tokio::test]
async fn accepted_stored_session_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");

    {
        let mut session = SessionStore::new(FileStorage::open(&path).unwrap());
        session.login(FakeApi::credentials()).unwrap();
    }

    let mut session = SessionStore::new(FileStorage::open(&path).unwrap());
    let state = session.start(&FakeApi::new()).await.clone();
    assert_eq!(
        state,
        SessionState::Authenticated(User { user_id: USER_ID.into(), username: USERNAME.into() })
    );
}
