use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::filter::UserSearchFilter;
use super::repo_types::{User, UserRole};

pub const MAX_LIMIT: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}
fn default_limit() -> i64 { 20 }

impl Default for Pagination {
    fn default() -> Self {
        Self { limit: default_limit(), offset: 0 }
    }
}

impl Pagination {
    pub fn new(limit: i64, offset: i64) -> Self {
        Self { limit, offset }.clamped()
    }

    /// Limit in `1..=MAX_LIMIT`, offset non-negative.
    pub fn clamped(self) -> Self {
        Self {
            limit: self.limit.clamp(1, MAX_LIMIT),
            offset: self.offset.max(0),
        }
    }
}

/// One page of search results with the total number of matches.
#[derive(Debug, Clone)]
pub struct UserPage {
    pub users: Vec<User>,
    pub total: i64,
    pub page: Pagination,
}

/// Query string of `GET /users/search`.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub username: Option<String>,
    pub email: Option<String>,
    pub role: Option<UserRole>,
    pub is_locked: Option<bool>,
    pub email_verified: Option<bool>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub date_from: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub date_to: Option<OffsetDateTime>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl SearchParams {
    pub fn into_parts(self) -> (UserSearchFilter, Pagination) {
        let page = Pagination::new(
            self.limit.unwrap_or_else(default_limit),
            self.offset.unwrap_or(0),
        );
        let filter = UserSearchFilter {
            username: self.username,
            email: self.email,
            role: self.role,
            is_locked: self.is_locked,
            email_verified: self.email_verified,
            date_from: self.date_from,
            date_to: self.date_to,
        };
        (filter, page)
    }
}

/// Public part of the user returned to the client.
#[derive(Debug, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub nickname: String,
    pub email: String,
    pub role: UserRole,
    pub is_locked: bool,
    pub email_verified: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            nickname: u.nickname,
            email: u.email,
            role: u.role,
            is_locked: u.is_locked,
            email_verified: u.email_verified,
            created_at: u.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserSearchResponse {
    pub items: Vec<PublicUser>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

impl From<UserPage> for UserSearchResponse {
    fn from(p: UserPage) -> Self {
        Self {
            items: p.users.into_iter().map(PublicUser::from).collect(),
            total: p.total,
            limit: p.page.limit,
            offset: p.page.offset,
        }
    }
}
