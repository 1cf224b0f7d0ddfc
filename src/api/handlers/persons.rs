/*
 * Responsibility
 * - /api/persons 系 CRUD handler
 * - Path/Json を extractor で受け、DTO validation → repo 呼び出し
 * - 見つからない場合は 404 (JSON error body)
 */
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    api::dto::persons::{ADULT_AGE, PersonRequest, PersonResponse},
    error::AppError,
    state::AppState,
};

pub async fn list_persons(
    State(state): State<AppState>,
) -> Result<Json<Vec<PersonResponse>>, AppError> {
    let rows = state.persons.list().await?;
    Ok(Json(rows.into_iter().map(PersonResponse::from).collect()))
}

pub async fn list_adults(
    State(state): State<AppState>,
) -> Result<Json<Vec<PersonResponse>>, AppError> {
    let rows = state.persons.list().await?;
    let adults = rows
        .into_iter()
        .filter(|p| p.age > ADULT_AGE)
        .map(PersonResponse::from)
        .collect();

    Ok(Json(adults))
}

pub async fn get_person(
    State(state): State<AppState>,
    Path(person_id): Path<i64>,
) -> Result<Json<PersonResponse>, AppError> {
    let row = state
        .persons
        .get(person_id)
        .await?
        .ok_or(AppError::not_found("person"))?;

    Ok(Json(row.into()))
}

pub async fn create_person(
    State(state): State<AppState>,
    Json(req): Json<PersonRequest>,
) -> Result<(StatusCode, Json<PersonResponse>), AppError> {
    req.validate()
        .map_err(|msg| AppError::bad_request("INVALID_PERSON", msg))?;

    let row = state.persons.create(req.name.trim(), req.age).await?;

    Ok((StatusCode::CREATED, Json(row.into())))
}

pub async fn update_person(
    State(state): State<AppState>,
    Path(person_id): Path<i64>,
    Json(req): Json<PersonRequest>,
) -> Result<Json<PersonResponse>, AppError> {
    req.validate()
        .map_err(|msg| AppError::bad_request("INVALID_PERSON", msg))?;

    let row = state
        .persons
        .update(person_id, req.name.trim(), req.age)
        .await?
        .ok_or(AppError::not_found("person"))?;

    Ok(Json(row.into()))
}

pub async fn delete_person(
    State(state): State<AppState>,
    Path(person_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    if state.persons.delete(person_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("person"))
    }
}
