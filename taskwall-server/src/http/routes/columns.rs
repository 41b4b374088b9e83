//! Column endpoints.
//!
//! Request bodies go through the transcoding layer, which validates
//! required fields before the store is touched.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use taskwall_core::codec;
use taskwall_core::model::Column;

use crate::http::error::{ApiError, ApiResult};
use crate::http::AppState;

/// GET /api/columns - all columns with nested items, ordered by position
async fn list_columns(State(state): State<AppState>) -> ApiResult<Json<Vec<Column>>> {
    let columns = state.store.columns().await?;
    Ok(Json(columns))
}

/// POST /api/columns - create a column at a free position
async fn create_column(
    State(state): State<AppState>,
    body: String,
) -> ApiResult<(StatusCode, Json<Column>)> {
    let draft = codec::column_from_json(&body)?;
    let column = state
        .store
        .create_column(&draft.name, draft.position)
        .await?;

    Ok((StatusCode::CREATED, Json(column)))
}

/// GET /api/columns/{id} - a single column with its items
async fn get_column(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Column>> {
    let column = state.store.column(id).await?.ok_or(ApiError::NotFound {
        resource: "column",
        id,
    })?;

    Ok(Json(column))
}

/// PUT /api/columns/{id} - full replace of name/position
async fn update_column(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    body: String,
) -> ApiResult<Json<Column>> {
    let draft = codec::column_from_json(&body)?;
    let column = state
        .store
        .update_column(id, &draft.name, draft.position)
        .await?
        .ok_or(ApiError::NotFound {
            resource: "column",
            id,
        })?;

    Ok(Json(column))
}

/// DELETE /api/columns/{id} - remove the column and its items; idempotent
async fn delete_column(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<StatusCode> {
    state.store.delete_column(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/columns", get(list_columns).post(create_column))
        .route(
            "/columns/{id}",
            get(get_column).put(update_column).delete(delete_column),
        )
}
