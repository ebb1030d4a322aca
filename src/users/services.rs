use tracing::{debug, instrument};

use super::dto::{Pagination, UserPage};
use super::filter::UserSearchFilter;
use super::repo::UserStore;
use super::repo_types::User;

/// Every persisted user satisfying all supplied predicates of `filter`.
#[instrument(skip(store))]
pub async fn search_users(store: &dyn UserStore, filter: &UserSearchFilter) -> anyhow::Result<Vec<User>> {
    let users = store.search(filter, None).await?;
    debug!(found = users.len(), unfiltered = filter.is_empty(), "user search done");
    Ok(users)
}

/// One page of `search_users` along with the total match count.
#[instrument(skip(store))]
pub async fn search_users_page(
    store: &dyn UserStore,
    filter: &UserSearchFilter,
    page: Pagination,
) -> anyhow::Result<UserPage> {
    let result = store.search_page(filter, page).await?;
    debug!(found = result.users.len(), total = result.total, "user page done");
    Ok(result)
}

#[instrument(skip(store))]
pub async fn count_users(store: &dyn UserStore, filter: &UserSearchFilter) -> anyhow::Result<i64> {
    store.count(filter).await
}
