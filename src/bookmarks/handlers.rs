use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::instrument;

use crate::auth::extractors::AuthUser;
use crate::bookmarks::dto::{CreateBookmarkRequest, EditBookmarkRequest};
use crate::bookmarks::repo::{self, Bookmark};
use crate::error::ApiError;
use crate::state::AppState;

pub fn bookmark_routes() -> Router<AppState> {
    Router::new()
        .route("/bookmarks", get(list_bookmarks).post(create_bookmark))
        .route(
            "/bookmarks/:id",
            get(get_bookmark).patch(edit_bookmark).delete(delete_bookmark),
        )
}

#[instrument(skip(state))]
pub async fn list_bookmarks(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<Bookmark>>, ApiError> {
    let bookmarks = repo::list_by_user(&state.db, user_id).await?;
    Ok(Json(bookmarks))
}

#[instrument(skip(state, payload))]
pub async fn create_bookmark(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateBookmarkRequest>,
) -> Result<(StatusCode, Json<Bookmark>), ApiError> {
    let bookmark = repo::create(
        &state.db,
        user_id,
        &payload.title,
        payload.description.as_deref(),
        &payload.link,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(bookmark)))
}

#[instrument(skip(state))]
pub async fn get_bookmark(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(bookmark_id): Path<i64>,
) -> Result<Json<Bookmark>, ApiError> {
    let bookmark = repo::get_for_user(&state.db, user_id, bookmark_id)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(bookmark))
}

#[instrument(skip(state, payload))]
pub async fn edit_bookmark(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(bookmark_id): Path<i64>,
    Json(payload): Json<EditBookmarkRequest>,
) -> Result<Json<Bookmark>, ApiError> {
    let bookmark = repo::update(
        &state.db,
        user_id,
        bookmark_id,
        payload.title.as_deref(),
        payload.description.as_deref(),
        payload.link.as_deref(),
    )
    .await?
    .ok_or(ApiError::NotFound)?;
    Ok(Json(bookmark))
}

#[instrument(skip(state))]
pub async fn delete_bookmark(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(bookmark_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let deleted = repo::delete(&state.db, user_id, bookmark_id).await?;
    if !deleted {
        return Err(ApiError::NotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}
