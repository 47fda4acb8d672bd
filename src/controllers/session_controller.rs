//! Sign-in, registration and sign-out from the command line.

use std::io::{self, BufRead, Write};

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};

use crate::error::BlogError;
use crate::models::client::BlogApi;
use crate::models::session::SessionStore;
use crate::models::storage::Storage;
use crate::models::user::{LoginRequest, RegisterRequest};

pub async fn login<S: Storage>(
    api: &dyn BlogApi,
    session: &mut SessionStore<S>,
    email: Option<String>,
) -> Result<(), BlogError> {
    let email = match email {
        Some(email) => email,
        None => prompt("Email address: ")?,
    };
    let password = prompt_hidden("Password: ")?;

    let request = LoginRequest { email: email.trim().to_string(), password };
    if request.email.is_empty() || request.password.is_empty() {
        return Err(BlogError::Validation("Email and password are required".to_string()));
    }

    let credentials = api.login(&request).await?;
    let name = credentials.username.clone();
    session.login(credentials)?;
    println!("Logged in as {}", name);
    Ok(())
}

pub async fn register<S: Storage>(
    api: &dyn BlogApi,
    session: &mut SessionStore<S>,
    username: Option<String>,
    email: Option<String>,
) -> Result<(), BlogError> {
    let username = match username {
        Some(username) => username,
        None => prompt("Username: ")?,
    };
    let email = match email {
        Some(email) => email,
        None => prompt("Email address: ")?,
    };
    let password = prompt_hidden("Password: ")?;

    let request = RegisterRequest {
        username: username.trim().to_string(),
        email: email.trim().to_string(),
        password,
    };
    request.validate()?;

    let credentials = api.register(&request).await?;
    let name = credentials.username.clone();
    session.login(credentials)?;
    println!("Account created. Logged in as {}", name);
    Ok(())
}

pub fn logout<S: Storage>(session: &mut SessionStore<S>) {
    session.bootstrap();
    let was_in = session.is_authenticated();
    session.logout();
    if was_in {
        println!("Logged out");
    } else {
        println!("Not logged in");
    }
}

pub fn prompt(label: &str) -> Result<String, BlogError> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Raw mode for as long as this lives.
struct RawMode;

impl RawMode {
    fn enable() -> io::Result<Self> {
        enable_raw_mode()?;
        Ok(RawMode)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
    }
}

/// Read a line without echoing it.
pub fn prompt_hidden(label: &str) -> Result<String, BlogError> {
    print!("{}", label);
    io::stdout().flush()?;

    let mut value = String::new();
    {
        let _raw = RawMode::enable()?;
        loop {
            let Event::Key(key) = event::read()? else {
                continue;
            };
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match key.code {
                KeyCode::Enter => break,
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    return Err(BlogError::Io("Cancelled".to_string()));
                }
                KeyCode::Char(c) => value.push(c),
                KeyCode::Backspace => {
                    value.pop();
                }
                _ => {}
            }
        }
    }

    println!();
    Ok(value)
}
