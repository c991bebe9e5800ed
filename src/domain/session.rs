//! Admin gate for catalog changes
//!
//! A plain comparison against the configured credential pair. Front ends
//! hold one [`Session`] per user interaction and ask it before adding books.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Admin access required")]
    AdminRequired,

    #[error("Invalid credentials")]
    InvalidCredentials,
}

/// Configured admin username and password
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminCredentials {
    pub username: String,
    pub password: String,
}

impl AdminCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn matches(&self, username: &str, password: &str) -> bool {
        self.username == username && self.password == password
    }
}

impl Default for AdminCredentials {
    fn default() -> Self {
        Self::new("admin", "password")
    }
}

impl fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Per-user context carried by a front end
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    admin: bool,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grants admin rights if both fields match exactly
    pub fn login(
        &mut self,
        credentials: &AdminCredentials,
        username: &str,
        password: &str,
    ) -> Result<(), SessionError> {
        if credentials.matches(username, password) {
            self.admin = true;
            Ok(())
        } else {
            Err(SessionError::InvalidCredentials)
        }
    }

    pub fn logout(&mut self) {
        self.admin = false;
    }

    pub fn is_admin(&self) -> bool {
        self.admin
    }

    pub fn require_admin(&self) -> Result<(), SessionError> {
        if self.admin {
            Ok(())
        } else {
            Err(SessionError::AdminRequired)
        }
    }
}
