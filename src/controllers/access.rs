//! Route-level access gate.

use crate::models::session::{SessionState, SessionStore};
use crate::models::storage::Storage;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Login,
    Register,
    Dashboard,
    PostDetail(String),
    Create,
    Edit(String),
    Stories,
}

impl Route {
    /// Post detail pages are public, as are the auth screens.
    pub fn requires_auth(&self) -> bool {
        !matches!(self, Route::Login | Route::Register | Route::PostDetail(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Allow(Route),
    Redirect(Route),
    /// Session not bootstrapped yet; show nothing.
    Pending,
}

pub fn gate<S: Storage>(route: Route, session: &SessionStore<S>) -> Access {
    match session.state() {
        SessionState::Authenticated(_) => Access::Allow(route),
        _ if !route.requires_auth() => Access::Allow(route),
        SessionState::Unknown => Access::Pending,
        SessionState::Anonymous => {
            log::debug!("redirecting {:?} to login", route);
            Access::Redirect(Route::Login)
        }
    }
}
