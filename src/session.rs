//! Explicit login sessions. A [`Session`] is created by
//! [`Authenticator::login`] and ends when it is passed to [`Session::logout`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};
use crate::config::Account;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Cashier,
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("{0} is not allowed for role {1:?}")]
    Forbidden(&'static str, Role),
}

/// Represents a signed-in user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub role: Role,
}

#[derive(Debug)]
pub struct Session {
    user: User,
    started_at: DateTime<Utc>,
}

impl Session {
    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn role(&self) -> Role {
        self.user.role
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Fails unless the session belongs to an admin.
    pub fn require_admin(&self, operation: &'static str) -> Result<(), AuthError> {
        match self.user.role {
            Role::Admin => Ok(()),
            role => Err(AuthError::Forbidden(operation, role)),
        }
    }

    pub fn logout(self) {
        info!(user = %self.user.name, "Logged out");
    }
}

/// Checks credentials against the configured accounts.
pub struct Authenticator {
    accounts: Vec<Account>,
}

impl Authenticator {
    pub fn new(accounts: Vec<Account>) -> Self {
        Self { accounts }
    }

    pub fn login(&self, username: &str, password: &str) -> Result<Session, AuthError> {
        let Some((index, account)) = self
            .accounts
            .iter()
            .enumerate()
            .find(|(_, a)| a.username == username && a.password == password)
        else {
            warn!(username, "Login rejected");
            return Err(AuthError::InvalidCredentials);
        };

        let user = User {
            id: (index + 1).to_string(),
            name: account.name.clone(),
            role: account.role,
        };
        info!(user = %user.name, role = ?user.role, "Logged in");
        Ok(Session { user, started_at: Utc::now() })
    }
}
