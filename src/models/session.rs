//! Session lifecycle: `Unknown` until bootstrap, then `Authenticated` or
//! `Anonymous` for the rest of the process.

use crate::error::BlogError;
use crate::models::client::BlogApi;
use crate::models::storage::{Storage, TOKEN_KEY, USERNAME_KEY, USER_ID_KEY};
use crate::models::story::{Story, ViewedStories};
use crate::models::user::{Credentials, User};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Unknown,
    Authenticated(User),
    Anonymous,
}

pub struct SessionStore<S: Storage> {
    storage: S,
    state: SessionState,
    token: Option<String>,
    /// Cleared on logout.
    stories: Vec<Story>,
    viewed: ViewedStories,
}

impl<S: Storage> SessionStore<S> {
    pub fn new(storage: S) -> Self {
        SessionStore {
            storage,
            state: SessionState::Unknown,
            token: None,
            stories: Vec::new(),
            viewed: ViewedStories::default(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.state, SessionState::Authenticated(_))
    }

    pub fn user(&self) -> Option<&User> {
        match &self.state {
            SessionState::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn persisted(&self) -> Option<Credentials> {
        let read = |key: &str| self.storage.get(key).filter(|v| !v.is_empty());
        Some(Credentials {
            token: read(TOKEN_KEY)?,
            user_id: read(USER_ID_KEY)?,
            username: read(USERNAME_KEY)?,
        })
    }

    /// Load persisted credentials. With a full triple the session becomes
    /// provisionally authenticated and the returned token still has to be
    /// verified; otherwise the session is anonymous.
    pub fn bootstrap(&mut self) -> Option<String> {
        match self.persisted() {
            Some(credentials) => {
                log::info!("restored session for {}", credentials.username);
                self.state = SessionState::Authenticated(credentials.user());
                self.token = Some(credentials.token.clone());
                Some(credentials.token)
            }
            None => {
                self.state = SessionState::Anonymous;
                self.token = None;
                None
            }
        }
    }

    /// Apply the verification outcome for `token`. A result for a token that
    /// is no longer current (the user logged in again meanwhile) is ignored.
    pub fn complete_verification(&mut self, token: &str, result: Result<(), BlogError>) {
        if self.token.as_deref() != Some(token) {
            log::debug!("dropping verification result for a replaced session");
            return;
        }
        if let Err(e) = result {
            log::warn!("stored session rejected: {}", e);
            self.logout();
        }
    }

    pub async fn verify<A: BlogApi + ?Sized>(&mut self, api: &A) -> &SessionState {
        if let Some(token) = self.token.clone() {
            let result = api.verify_session(&token).await;
            self.complete_verification(&token, result);
        }
        &self.state
    }

    /// Bootstrap and, when there is something to check, verify.
    pub async fn start<A: BlogApi + ?Sized>(&mut self, api: &A) -> &SessionState {
        if self.bootstrap().is_some() {
            self.verify(api).await;
        }
        &self.state
    }

    /// Replace whatever session exists. The in-memory session is switched even
    /// when persisting fails; the error tells the caller it won't survive a restart.
    pub fn login(&mut self, credentials: Credentials) -> Result<(), BlogError> {
        log::info!("logged in as {}", credentials.username);
        self.stories.clear();
        self.viewed.clear();
        self.state = SessionState::Authenticated(credentials.user());
        self.token = Some(credentials.token.clone());

        self.storage.set(TOKEN_KEY, &credentials.token)?;
        self.storage.set(USER_ID_KEY, &credentials.user_id)?;
        self.storage.set(USERNAME_KEY, &credentials.username)?;
        Ok(())
    }

    pub fn logout(&mut self) {
        for key in [TOKEN_KEY, USER_ID_KEY, USERNAME_KEY] {
            if let Err(e) = self.storage.remove(key) {
                log::warn!("failed to remove {} from storage: {}", key, e);
            }
        }
        if self.is_authenticated() {
            log::info!("logged out");
        }
        self.token = None;
        self.stories.clear();
        self.viewed.clear();
        self.state = SessionState::Anonymous;
    }

    /// Auth failures end the session. Returns whether that happened.
    pub fn handle_error(&mut self, err: &BlogError) -> bool {
        if err.is_auth() {
            self.logout();
            return true;
        }
        false
    }

    pub fn stories(&self) -> &[Story] {
        &self.stories
    }

    pub fn set_stories(&mut self, stories: Vec<Story>) {
        self.stories = stories;
    }

    pub fn viewed(&self) -> &ViewedStories {
        &self.viewed
    }

    pub fn viewed_mut(&mut self) -> &mut ViewedStories {
        &mut self.viewed
    }
}
