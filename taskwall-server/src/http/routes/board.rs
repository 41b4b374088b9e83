//! The board endpoint: the whole aggregate in one response.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use taskwall_core::model::Board;

use crate::http::error::ApiResult;
use crate::http::AppState;

/// GET /api/board - the singleton board with nested columns and items
async fn get_board(State(state): State<AppState>) -> ApiResult<Json<Board>> {
    let board = state.store.get_board().await?;
    Ok(Json(board))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/board", get(get_board))
}
