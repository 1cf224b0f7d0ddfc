/*
 * Responsibility
 * - POST /auth/register, POST /auth/login
 * - DTO validation → AuthService 呼び出し
 */
use axum::{Json, extract::State, http::StatusCode};

use crate::{
    api::dto::auth::{LoginRequest, LoginResponse, RegisterRequest},
    error::AppError,
    state::AppState,
};

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, &'static str), AppError> {
    let role = req
        .validate()
        .map_err(|msg| AppError::bad_request("INVALID_REGISTRATION", msg))?;

    state.auth.register(&req.username, &req.password, role).await?;

    Ok((StatusCode::OK, "User registered"))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let issued = state.auth.login(&req.username, &req.password).await?;

    Ok(Json(LoginResponse {
        token: issued.token,
        token_type: "Bearer",
        expires_in: issued.expires_in,
    }))
}
