use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::models::user::{LoginRequest, RegisterRequest};
use crate::views::tui::centered_rect;

pub const HINTS: &str = "tab next field  enter submit  ctrl-r switch sign in/register  esc quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Login,
    Register,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthField {
    Username,
    Email,
    Password,
}

pub struct AuthView {
    pub mode: AuthMode,
    pub username: String,
    pub email: String,
    pub password: String,
    pub focus: AuthField,
    pub busy: bool,
}

impl AuthView {
    pub fn new(mode: AuthMode) -> Self {
        AuthView {
            mode,
            username: String::new(),
            email: String::new(),
            password: String::new(),
            focus: match mode {
                AuthMode::Login => AuthField::Email,
                AuthMode::Register => AuthField::Username,
            },
            busy: false,
        }
    }

    pub fn fields(&self) -> &'static [AuthField] {
        match self.mode {
            AuthMode::Login => &[AuthField::Email, AuthField::Password],
            AuthMode::Register => &[AuthField::Username, AuthField::Email, AuthField::Password],
        }
    }

    pub fn focus_next(&mut self) {
        let fields = self.fields();
        let at = fields.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = fields[(at + 1) % fields.len()];
    }

    pub fn switch_mode(&mut self) {
        let mode = match self.mode {
            AuthMode::Login => AuthMode::Register,
            AuthMode::Register => AuthMode::Login,
        };
        *self = AuthView { email: std::mem::take(&mut self.email), ..AuthView::new(mode) };
    }

    pub fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            AuthField::Username => &mut self.username,
            AuthField::Email => &mut self.email,
            AuthField::Password => &mut self.password,
        }
    }

    pub fn login_request(&self) -> LoginRequest {
        LoginRequest {
            email: self.email.trim().to_string(),
            password: self.password.clone(),
        }
    }

    pub fn register_request(&self) -> RegisterRequest {
        RegisterRequest {
            username: self.username.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.password.clone(),
        }
    }
}

pub fn render_auth<B: Backend>(f: &mut Frame<B>, area: Rect, view: &AuthView) {
    let title = match view.mode {
        AuthMode::Login => "Sign in to MY BLOG",
        AuthMode::Register => "Create your account",
    };
    let popup = centered_rect(60, 60, area);
    let outer = Block::default().title(title).borders(Borders::ALL);
    let inner = outer.inner(popup);
    f.render_widget(outer, popup);

    let fields = view.fields();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(
            fields
                .iter()
                .map(|_| Constraint::Length(3))
                .chain(std::iter::once(Constraint::Min(0)))
                .collect::<Vec<_>>(),
        )
        .split(inner);

    for (i, field) in fields.iter().enumerate() {
        let (label, value) = match field {
            AuthField::Username => ("Username", view.username.clone()),
            AuthField::Email => ("Email address", view.email.clone()),
            AuthField::Password => ("Password", "*".repeat(view.password.chars().count())),
        };
        let style = if *field == view.focus {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let input = Paragraph::new(value)
            .block(Block::default().title(label).borders(Borders::ALL).border_style(style));
        f.render_widget(input, chunks[i]);
    }

    if view.busy {
        f.render_widget(Paragraph::new("Working..."), chunks[fields.len()]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn focus_cycles_through_visible_fields() {
        let mut view = AuthView::new(AuthMode::Login);
        assert_eq!(view.focus, AuthField::Email);
        view.focus_next();
        assert_eq!(view.focus, AuthField::Password);
        view.focus_next();
        assert_eq!(view.focus, AuthField::Email);
    }

    #[test]
    fn switching_mode_keeps_email_only() {
        let mut view = AuthView::new(AuthMode::Login);
        view.email = "a@b.c".into();
        view.password = "secret".into();
        view.switch_mode();
        assert_eq!(view.mode, AuthMode::Register);
        assert_eq!(view.email, "a@b.c");
        assert!(view.password.is_empty());
        assert_eq!(view.focus, AuthField::Username);
    }
}
