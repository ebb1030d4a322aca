use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Permission tier, stored as the Postgres enum `user_role`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    Anonymous,
    Authenticated,
    Manager,
    Admin,
}

impl UserRole {
    /// Roles allowed to browse other accounts.
    pub fn can_search_users(self) -> bool {
        matches!(self, UserRole::Admin | UserRole::Manager)
    }
}

impl Default for UserRole {
    fn default() -> Self {
        Self::Anonymous
    }
}

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub nickname: String,
    pub email: String,
    pub role: UserRole,
    #[serde(skip_serializing)]
    pub hashed_password: String, // Argon2 PHC string
    pub is_locked: bool,
    pub email_verified: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Insert payload; `created_at` falls back to `now()` when absent.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub nickname: String,
    pub email: String,
    pub role: UserRole,
    pub hashed_password: String,
    pub is_locked: bool,
    pub email_verified: bool,
    pub created_at: Option<OffsetDateTime>,
}

impl NewUser {
    pub fn new(
        nickname: impl Into<String>,
        email: impl Into<String>,
        hashed_password: impl Into<String>,
    ) -> Self {
        Self {
            nickname: nickname.into(),
            email: email.into(),
            role: UserRole::Authenticated,
            hashed_password: hashed_password.into(),
            is_locked: false,
            email_verified: false,
            created_at: None,
        }
    }

    pub fn role(mut self, role: UserRole) -> Self {
        self.role = role;
        self
    }

    pub fn locked(mut self, is_locked: bool) -> Self {
        self.is_locked = is_locked;
        self
    }

    pub fn email_verified(mut self, email_verified: bool) -> Self {
        self.email_verified = email_verified;
        self
    }

    pub fn created_at(mut self, created_at: OffsetDateTime) -> Self {
        self.created_at = Some(created_at);
        self
    }
}
