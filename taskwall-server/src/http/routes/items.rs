//! Item endpoints, always scoped to their owning column.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use taskwall_core::codec;
use taskwall_core::model::Item;

use crate::http::error::{ApiError, ApiResult};
use crate::http::AppState;

/// GET /api/columns/{id}/items - items of one column, ordered by position
async fn list_items(
    State(state): State<AppState>,
    Path(column_id): Path<i64>,
) -> ApiResult<Json<Vec<Item>>> {
    let items = state.store.items(column_id).await?;
    Ok(Json(items))
}

/// POST /api/columns/{id}/items - create an item; the store assigns the
/// timestamp
async fn create_item(
    State(state): State<AppState>,
    Path(column_id): Path<i64>,
    body: String,
) -> ApiResult<(StatusCode, Json<Item>)> {
    let draft = codec::item_from_json(&body)?;
    let item = state
        .store
        .create_item(column_id, &draft.title, draft.position)
        .await?;

    Ok((StatusCode::CREATED, Json(item)))
}

/// GET /api/columns/{id}/items/{item_id}
async fn get_item(
    State(state): State<AppState>,
    Path((column_id, item_id)): Path<(i64, i64)>,
) -> ApiResult<Json<Item>> {
    let item = state
        .store
        .item(column_id, item_id)
        .await?
        .ok_or(ApiError::NotFound {
            resource: "item",
            id: item_id,
        })?;

    Ok(Json(item))
}

/// PUT /api/columns/{id}/items/{item_id} - replace title/position and
/// refresh the timestamp
async fn update_item(
    State(state): State<AppState>,
    Path((column_id, item_id)): Path<(i64, i64)>,
    body: String,
) -> ApiResult<Json<Item>> {
    let draft = codec::item_from_json(&body)?;
    let item = state
        .store
        .update_item(column_id, item_id, &draft.title, draft.position)
        .await?
        .ok_or(ApiError::NotFound {
            resource: "item",
            id: item_id,
        })?;

    Ok(Json(item))
}

/// DELETE /api/columns/{id}/items/{item_id} - idempotent
async fn delete_item(
    State(state): State<AppState>,
    Path((column_id, item_id)): Path<(i64, i64)>,
) -> ApiResult<StatusCode> {
    state.store.delete_item(column_id, item_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/columns/{id}/items", get(list_items).post(create_item))
        .route(
            "/columns/{id}/items/{item_id}",
            get(get_item).put(update_item).delete(delete_item),
        )
}
