/*
 * Responsibility
 * - GET /hello (認証不要)
 * - GET /api/user/hello, /api/admin/hello (role は policy 側で判定済み)
 * - GET /api/me
 */
use axum::{Json, extract::Query};
use serde::Deserialize;

use crate::api::dto::auth::MeResponse;
use crate::api::extractors::CurrentUser;

#[derive(Debug, Deserialize)]
pub struct HelloParams {
    pub name: Option<String>,
}

pub async fn hello(Query(params): Query<HelloParams>) -> String {
    let name = params
        .name
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or("World");
    format!("Hello, {name}")
}

pub async fn user_hello() -> &'static str {
    "Hello USER"
}

pub async fn admin_hello() -> &'static str {
    "Hello ADMIN"
}

pub async fn me(CurrentUser(principal): CurrentUser) -> Json<MeResponse> {
    Json(MeResponse {
        username: principal.username,
        role: principal.role,
        authorities: principal.authorities,
    })
}
