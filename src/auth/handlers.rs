use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::instrument;

use crate::auth::dto::{PublicUser, SigninRequest, SigninResponse, SignupRequest};
use crate::auth::jwt::JwtKeys;
use crate::auth::services;
use crate::error::ApiError;
use crate::state::AppState;

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/signin", post(signin))
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    Json(mut payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<PublicUser>), ApiError> {
    payload.email = payload.email.trim().to_lowercase();
    payload.validate().map_err(ApiError::Validation)?;

    let user = services::signup(state.users.as_ref(), payload).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[instrument(skip(state, payload))]
pub async fn signin(
    State(state): State<AppState>,
    Json(mut payload): Json<SigninRequest>,
) -> Result<Json<SigninResponse>, ApiError> {
    payload.email = payload.email.trim().to_lowercase();
    payload.validate().map_err(ApiError::Validation)?;

    let keys = JwtKeys::from_ref(&state);
    let response = services::signin(state.users.as_ref(), &keys, payload).await?;
    Ok(Json(response))
}
