/*
 * Responsibility
 * - URL 構造を定義
 * - /auth, /api/user, /api/admin, /api/persons を route
 * - 認証・認可は middleware::auth 側で Router 全体に掛ける (ここでは決めない)
 */
use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use crate::api::handlers::{
    auth::{login, register},
    greeting::{admin_hello, hello, me, user_hello},
    health::health,
    persons::{
        create_person, delete_person, get_person, list_adults, list_persons, update_person,
    },
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/hello", get(hello))
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/api/me", get(me))
        .route("/api/user/hello", get(user_hello))
        .route("/api/admin/hello", get(admin_hello))
        .route("/api/persons", get(list_persons).post(create_person))
        .route("/api/persons/adults", get(list_adults))
        .route(
            "/api/persons/{person_id}",
            get(get_person).put(update_person).delete(delete_person),
        )
}
