use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::dto::{Pagination, UserPage};
use super::filter::UserSearchFilter;
use super::repo::UserStore;
use super::repo_types::{NewUser, User};

/// Process-local store used by `AppState::fake` and tests.
#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<Vec<User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn insert(&self, new: NewUser) -> anyhow::Result<User> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.nickname == new.nickname) {
            anyhow::bail!("nickname {} already taken", new.nickname);
        }
        if users.iter().any(|u| u.email == new.email) {
            anyhow::bail!("email {} already registered", new.email);
        }
        let user = User {
            id: Uuid::new_v4(),
            nickname: new.nickname,
            email: new.email,
            role: new.role,
            hashed_password: new.hashed_password,
            is_locked: new.is_locked,
            email_verified: new.email_verified,
            created_at: new.created_at.unwrap_or_else(OffsetDateTime::now_utc),
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        Ok(self.users.read().await.iter().find(|u| u.id == id).cloned())
    }

    async fn search(
        &self,
        filter: &UserSearchFilter,
        page: Option<Pagination>,
    ) -> anyhow::Result<Vec<User>> {
        let users = self.users.read().await;
        let hits = matching(&users, filter);
        Ok(match page.map(Pagination::clamped) {
            Some(page) => paged(hits, page),
            None => hits,
        })
    }

    async fn count(&self, filter: &UserSearchFilter) -> anyhow::Result<i64> {
        let n = self.users.read().await.iter().filter(|u| filter.matches(u)).count();
        Ok(n as i64)
    }

    async fn search_page(&self, filter: &UserSearchFilter, page: Pagination) -> anyhow::Result<UserPage> {
        let page = page.clamped();
        let users = self.users.read().await;
        let hits = matching(&users, filter);
        let total = hits.len() as i64;
        Ok(UserPage { users: paged(hits, page), total, page })
    }
}

/// Matches newest first, ties broken by id.
fn matching(users: &[User], filter: &UserSearchFilter) -> Vec<User> {
    let mut hits: Vec<User> = users.iter().filter(|u| filter.matches(u)).cloned().collect();
    hits.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
    hits
}

fn paged(hits: Vec<User>, page: Pagination) -> Vec<User> {
    hits.into_iter()
        .skip(page.offset as usize)
        .take(page.limit as usize)
        .collect()
}
