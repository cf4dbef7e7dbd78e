use axum::{extract::State, routing::get, Json, Router};
use tracing::{instrument, warn};

use crate::auth::dto::PublicUser;
use crate::auth::extractors::AuthUser;
use crate::auth::repo::{StoreError, UpdateProfile};
use crate::error::ApiError;
use crate::state::AppState;
use crate::users::dto::EditUserRequest;

pub fn user_routes() -> Router<AppState> {
    Router::new().route("/users/me", get(get_me).patch(edit_me))
}

fn map_user_lookup(e: StoreError) -> ApiError {
    match e {
        // A valid token for a user that no longer exists.
        StoreError::NotFound => {
            warn!("token subject no longer exists");
            ApiError::InvalidCredentials
        }
        other => ApiError::Unexpected(other.into()),
    }
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<PublicUser>, ApiError> {
    let user = state
        .users
        .find_by_id(user_id)
        .await
        .map_err(map_user_lookup)?;
    Ok(Json(PublicUser::from(user)))
}

#[instrument(skip(state, payload))]
pub async fn edit_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<EditUserRequest>,
) -> Result<Json<PublicUser>, ApiError> {
    let user = state
        .users
        .update_profile(
            user_id,
            UpdateProfile {
                first_name: payload.first_name,
                last_name: payload.last_name,
            },
        )
        .await
        .map_err(map_user_lookup)?;
    Ok(Json(PublicUser::from(user)))
}
