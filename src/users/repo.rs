use anyhow::Context;
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::dto::{Pagination, UserPage};
use super::filter::UserSearchFilter;
use super::repo_types::{NewUser, User};

const USER_COLUMNS: &str =
    "id, nickname, email, role, hashed_password, is_locked, email_verified, created_at";

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert(&self, new: NewUser) -> anyhow::Result<User>;
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>>;
    /// Matching users, newest first; every match when `page` is `None`.
    async fn search(
        &self,
        filter: &UserSearchFilter,
        page: Option<Pagination>,
    ) -> anyhow::Result<Vec<User>>;
    async fn count(&self, filter: &UserSearchFilter) -> anyhow::Result<i64>;
    /// One page plus the total match count, read from the same snapshot.
    async fn search_page(&self, filter: &UserSearchFilter, page: Pagination) -> anyhow::Result<UserPage>;
}

fn search_query(filter: &UserSearchFilter, page: Option<Pagination>) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {USER_COLUMNS} FROM users"));
    filter.push_where(&mut qb);
    qb.push(" ORDER BY created_at DESC, id");
    if let Some(page) = page.map(Pagination::clamped) {
        qb.push(" LIMIT ")
            .push_bind(page.limit)
            .push(" OFFSET ")
            .push_bind(page.offset);
    }
    qb
}

fn count_query(filter: &UserSearchFilter) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM users");
    filter.push_where(&mut qb);
    qb
}

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn insert(&self, new: NewUser) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (id, nickname, email, role, hashed_password, is_locked, email_verified, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, COALESCE($8, now()))
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&new.nickname)
        .bind(&new.email)
        .bind(new.role)
        .bind(&new.hashed_password)
        .bind(new.is_locked)
        .bind(new.email_verified)
        .bind(new.created_at)
        .fetch_one(&self.db)
        .await
        .with_context(|| format!("insert user {}", new.nickname))?;
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("find user by id")?;
        Ok(user)
    }

    async fn search(
        &self,
        filter: &UserSearchFilter,
        page: Option<Pagination>,
    ) -> anyhow::Result<Vec<User>> {
        let rows = search_query(filter, page)
            .build_query_as::<User>()
            .fetch_all(&self.db)
            .await
            .context("search users")?;
        Ok(rows)
    }

    async fn count(&self, filter: &UserSearchFilter) -> anyhow::Result<i64> {
        let total = count_query(filter)
            .build_query_scalar::<i64>()
            .fetch_one(&self.db)
            .await
            .context("count users")?;
        Ok(total)
    }

    async fn search_page(&self, filter: &UserSearchFilter, page: Pagination) -> anyhow::Result<UserPage> {
        let page = page.clamped();
        let mut tx = self.db.begin().await.context("begin tx")?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ READ ONLY")
            .execute(&mut *tx)
            .await
            .context("set isolation")?;

        let users = search_query(filter, Some(page))
            .build_query_as::<User>()
            .fetch_all(&mut *tx)
            .await
            .context("search users page")?;
        let total = count_query(filter)
            .build_query_scalar::<i64>()
            .fetch_one(&mut *tx)
            .await
            .context("count users page")?;
        tx.commit().await.context("commit tx")?;

        Ok(UserPage { users, total, page })
    }
}
