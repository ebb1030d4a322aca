//! Shared fixtures for integration tests.
#![allow(dead_code)]

use time::{Duration, OffsetDateTime};
use usersearch::users::{NewUser, User, UserRole, UserStore};

/// Well-formed PHC string; HTTP tests never check passwords, so no Argon2 run.
pub const FIXTURE_PASSWORD_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$c2FsdHNhbHRzYWx0$0R4M4kNpQ8fC7h1pu7hS1x0bk2VYqFJ0m2L6cXr5m3E";

/// Two accounts: an unlocked, verified admin registered 40 days ago and a
/// locked, unverified regular user registered 20 days ago.
pub fn sample_users(now: OffsetDateTime, hashed_password: &str) -> [NewUser; 2] {
    [
        NewUser::new("crazy_koala_22", "john.doe@example.com", hashed_password)
            .role(UserRole::Admin)
            .locked(false)
            .email_verified(true)
            .created_at(now - Duration::days(40)),
        NewUser::new("fat_pelican_12", "prince_devitt@example.com", hashed_password)
            .role(UserRole::Authenticated)
            .locked(true)
            .email_verified(false)
            .created_at(now - Duration::days(20)),
    ]
}

pub async fn seed(store: &dyn UserStore, hashed_password: &str) -> Vec<User> {
    let mut out = Vec::new();
    for new in sample_users(OffsetDateTime::now_utc(), hashed_password) {
        out.push(store.insert(new).await.expect("seed user"));
    }
    out
}
