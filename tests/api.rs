/// HTTP tests for the search endpoint over the in-memory store
mod common;

use axum::{
    body::Body,
    extract::FromRef,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::Value;
use time::{format_description::well_known::Rfc3339, Duration, OffsetDateTime};
use tower::util::ServiceExt;
use usersearch::{
    app::build_app,
    auth::JwtKeys,
    state::AppState,
    users::{dto::UserSearchResponse, NewUser, User, UserRole},
};

struct TestApp {
    app: Router,
    state: AppState,
    seeded: Vec<User>,
}

async fn create_test_app() -> TestApp {
    let state = AppState::fake();
    let seeded = common::seed(state.users.as_ref(), common::FIXTURE_PASSWORD_HASH).await;
    TestApp {
        app: build_app(state.clone()),
        state,
        seeded,
    }
}

impl TestApp {
    fn token_for(&self, user: &User) -> String {
        JwtKeys::from_ref(&self.state)
            .sign_access(user.id, user.role)
            .expect("sign access")
    }

    fn admin(&self) -> &User {
        self.seeded
            .iter()
            .find(|u| u.role == UserRole::Admin)
            .expect("seeded admin")
    }

    async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        let mut req = Request::builder().uri(uri);
        if let Some(token) = token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let response = self
            .app
            .clone()
            .oneshot(req.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);
        (status, body)
    }

    async fn search(&self, query: &str) -> UserSearchResponse {
        let token = self.token_for(self.admin());
        let (status, body) = self
            .get(&format!("/api/v1/users/search{}", query), Some(&token))
            .await;
        assert_eq!(status, StatusCode::OK, "body: {body}");
        serde_json::from_value(body).expect("search response")
    }
}

fn rfc3339(t: OffsetDateTime) -> String {
    t.format(&Rfc3339).unwrap()
}

#[tokio::test]
async fn health_is_public() {
    let t = create_test_app().await;
    let response = t
        .app
        .clone()
        .oneshot(Request::builder().uri("/api/v1/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn search_requires_token() {
    let t = create_test_app().await;
    let (status, body) = t.get("/api/v1/users/search", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Missing Authorization header");

    let (status, _) = t.get("/api/v1/users/search", Some("garbage")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn search_rejects_non_admin_callers() {
    let t = create_test_app().await;
    let regular = t
        .state
        .users
        .insert(NewUser::new("plain_user", "plain@example.net", common::FIXTURE_PASSWORD_HASH))
        .await
        .unwrap();
    let (status, _) = t
        .get("/api/v1/users/search", Some(&t.token_for(&regular)))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn token_with_outdated_role_is_rejected() {
    let t = create_test_app().await;
    let regular = t
        .state
        .users
        .insert(NewUser::new("demoted", "demoted@example.net", common::FIXTURE_PASSWORD_HASH))
        .await
        .unwrap();
    let token = JwtKeys::from_ref(&t.state)
        .sign_access(regular.id, UserRole::Admin)
        .unwrap();
    let (status, body) = t.get("/api/v1/users/search", Some(&token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Token role is out of date");
}

#[tokio::test]
async fn locked_admin_cannot_search() {
    let t = create_test_app().await;
    let locked_admin = t
        .state
        .users
        .insert(
            NewUser::new("locked_boss", "boss@example.net", common::FIXTURE_PASSWORD_HASH)
                .role(UserRole::Admin)
                .locked(true),
        )
        .await
        .unwrap();
    let (status, body) = t
        .get("/api/v1/users/search", Some(&t.token_for(&locked_admin)))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Account is locked");
}

#[tokio::test]
async fn search_by_username() {
    let t = create_test_app().await;
    let res = t.search("?username=koala").await;
    assert_eq!(res.total, 1);
    assert_eq!(res.items[0].nickname, "crazy_koala_22");
}

#[tokio::test]
async fn search_by_email_and_role() {
    let t = create_test_app().await;
    let res = t.search("?email=example.com").await;
    assert_eq!(res.items.len(), 2);

    let res = t.search("?role=ADMIN").await;
    assert!(!res.items.is_empty());
    assert!(res.items.iter().all(|u| u.role == UserRole::Admin));
}

#[tokio::test]
async fn search_by_flags() {
    let t = create_test_app().await;
    let locked = t.search("?is_locked=true").await;
    let unlocked = t.search("?is_locked=false").await;
    assert!(locked.items.iter().all(|u| u.is_locked));
    assert!(unlocked.items.iter().all(|u| !u.is_locked));
    assert_eq!(locked.total + unlocked.total, t.seeded.len() as i64);

    let verified = t.search("?email_verified=true").await;
    assert!(verified.items.iter().all(|u| u.email_verified));
}

#[tokio::test]
async fn search_by_registration_date() {
    let t = create_test_app().await;
    let date_from = OffsetDateTime::now_utc() - Duration::days(30);
    let res = t.search(&format!("?date_from={}", rfc3339(date_from))).await;
    assert_eq!(res.total, 1);
    assert!(res.items.iter().all(|u| u.created_at >= date_from));

    let date_to = OffsetDateTime::now_utc() - Duration::days(10);
    let res = t.search(&format!("?date_to={}", rfc3339(date_to))).await;
    assert!(res.items.iter().all(|u| u.created_at <= date_to));
}

#[tokio::test]
async fn search_pages_and_echoes_limits() {
    let t = create_test_app().await;
    let res = t.search("?limit=1&offset=1").await;
    assert_eq!(res.items.len(), 1);
    assert_eq!(res.total, 2);
    assert_eq!((res.limit, res.offset), (1, 1));

    let res = t.search("?limit=5000").await;
    assert_eq!(res.limit, 100);
}

#[tokio::test]
async fn search_never_exposes_password_hash() {
    let t = create_test_app().await;
    let token = t.token_for(t.admin());
    let (_, body) = t.get("/api/v1/users/search", Some(&token)).await;
    let text = body.to_string();
    assert!(!text.contains("hashed_password"));
    assert!(!text.contains("argon2"));
}

#[tokio::test]
async fn malformed_query_is_bad_request() {
    let t = create_test_app().await;
    let token = t.token_for(t.admin());
    for query in ["?role=SUPERUSER", "?is_locked=maybe", "?date_from=yesterday"] {
        let (status, body) = t
            .get(&format!("/api/v1/users/search{}", query), Some(&token))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "query {query}");
        assert!(body["error"].is_string());
    }
}
