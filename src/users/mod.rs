pub mod dto;
pub mod filter;
pub mod handlers;
pub mod memory;
pub mod repo;
pub mod repo_types;
pub mod services;

use crate::state::AppState;
use axum::Router;

pub use filter::UserSearchFilter;
pub use repo::{PgUserStore, UserStore};
pub use repo_types::{NewUser, User, UserRole};
pub use services::{search_users, search_users_page};

pub fn router() -> Router<AppState> {
    handlers::user_routes()
}
