use serde::{Deserialize, Serialize};

use crate::error::BlogError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub user_id: String,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub token: String,
    pub user_id: String,
    pub username: String,
}

impl Credentials {
    pub fn user(&self) -> User {
        User {
            user_id: self.user_id.clone(),
            username: self.username.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<(), BlogError> {
        for (field, value) in [
            ("Username", &self.username),
            ("Email", &self.email),
            ("Password", &self.password),
        ] {
            if value.trim().is_empty() {
                return Err(BlogError::Validation(format!("{} is required", field)));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct WireUser {
    #[serde(rename = "_id", alias = "id", alias = "userId")]
    pub id: String,
    pub username: String,
}

/// Login answers flat; registration may nest the user.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum AuthResponse {
    Flat {
        token: String,
        #[serde(rename = "userId")]
        user_id: String,
        username: String,
    },
    Wrapped {
        token: String,
        user: WireUser,
    },
}

impl From<AuthResponse> for Credentials {
    fn from(response: AuthResponse) -> Self {
        match response {
            AuthResponse::Flat { token, user_id, username } => Credentials { token, user_id, username },
            AuthResponse::Wrapped { token, user } => Credentials {
                token,
                user_id: user.id,
                username: user.username,
            },
        }
    }
}
