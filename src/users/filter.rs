use sqlx::{Postgres, QueryBuilder};
use time::OffsetDateTime;

use super::repo_types::{User, UserRole};

/// Optional predicates for a user search; unset fields are not applied.
///
/// `matches` and `push_where` must agree: the first is used by the in-memory
/// store, the second renders the same conjunction for Postgres. Case folding
/// agrees for ASCII only; for other scripts `ILIKE` follows the database
/// ctype while `matches` uses Unicode lowercasing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserSearchFilter {
    /// Case-insensitive substring of `nickname`.
    pub username: Option<String>,
    /// Case-insensitive substring of `email`.
    pub email: Option<String>,
    pub role: Option<UserRole>,
    pub is_locked: Option<bool>,
    pub email_verified: Option<bool>,
    /// Inclusive lower bound on `created_at`.
    pub date_from: Option<OffsetDateTime>,
    /// Inclusive upper bound on `created_at`.
    pub date_to: Option<OffsetDateTime>,
}

impl UserSearchFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn username(mut self, needle: impl Into<String>) -> Self {
        self.username = Some(needle.into());
        self
    }

    pub fn email(mut self, needle: impl Into<String>) -> Self {
        self.email = Some(needle.into());
        self
    }

    pub fn role(mut self, role: UserRole) -> Self {
        self.role = Some(role);
        self
    }

    pub fn is_locked(mut self, is_locked: bool) -> Self {
        self.is_locked = Some(is_locked);
        self
    }

    pub fn email_verified(mut self, email_verified: bool) -> Self {
        self.email_verified = Some(email_verified);
        self
    }

    pub fn date_from(mut self, from: OffsetDateTime) -> Self {
        self.date_from = Some(from);
        self
    }

    pub fn date_to(mut self, to: OffsetDateTime) -> Self {
        self.date_to = Some(to);
        self
    }

    fn username_needle(&self) -> Option<&str> {
        non_blank(self.username.as_deref())
    }

    fn email_needle(&self) -> Option<&str> {
        non_blank(self.email.as_deref())
    }

    /// True when no predicate would be applied.
    pub fn is_empty(&self) -> bool {
        self.username_needle().is_none()
            && self.email_needle().is_none()
            && self.role.is_none()
            && self.is_locked.is_none()
            && self.email_verified.is_none()
            && self.date_from.is_none()
            && self.date_to.is_none()
    }

    pub fn matches(&self, user: &User) -> bool {
        if let Some(needle) = self.username_needle() {
            if !contains_ignore_case(&user.nickname, needle) {
                return false;
            }
        }
        if let Some(needle) = self.email_needle() {
            if !contains_ignore_case(&user.email, needle) {
                return false;
            }
        }
        if self.role.is_some_and(|r| r != user.role) {
            return false;
        }
        if self.is_locked.is_some_and(|v| v != user.is_locked) {
            return false;
        }
        if self.email_verified.is_some_and(|v| v != user.email_verified) {
            return false;
        }
        if self.date_from.is_some_and(|from| user.created_at < from) {
            return false;
        }
        if self.date_to.is_some_and(|to| user.created_at > to) {
            return false;
        }
        true
    }

    /// Appends ` WHERE ... AND ...` to `qb`, or nothing for an empty filter.
    pub fn push_where(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        let mut sep = " WHERE ";

        if let Some(needle) = self.username_needle() {
            qb.push(sep).push("nickname ILIKE ").push_bind(like_pattern(needle));
            sep = " AND ";
        }
        if let Some(needle) = self.email_needle() {
            qb.push(sep).push("email ILIKE ").push_bind(like_pattern(needle));
            sep = " AND ";
        }
        if let Some(role) = self.role {
            qb.push(sep).push("role = ").push_bind(role);
            sep = " AND ";
        }
        if let Some(is_locked) = self.is_locked {
            qb.push(sep).push("is_locked = ").push_bind(is_locked);
            sep = " AND ";
        }
        if let Some(email_verified) = self.email_verified {
            qb.push(sep).push("email_verified = ").push_bind(email_verified);
            sep = " AND ";
        }
        if let Some(from) = self.date_from {
            qb.push(sep).push("created_at >= ").push_bind(from);
            sep = " AND ";
        }
        if let Some(to) = self.date_to {
            qb.push(sep).push("created_at <= ").push_bind(to);
        }
    }
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// `%needle%` with LIKE metacharacters escaped (backslash is the default escape).
fn like_pattern(needle: &str) -> String {
    let mut out = String::with_capacity(needle.len() + 2);
    out.push('%');
    for c in needle.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}
