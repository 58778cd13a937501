//! Caller profile.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use boutique_core::User;

use super::ApiResponse;
use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::state::AppState;

/// What `GET /me` returns. Users who signed in but were never stored by
/// the login service only have their token claims.
#[derive(Debug, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum Profile {
    Stored(User),
    Token {
        google_id: String,
        email: String,
        is_admin: bool,
    },
}

/// `GET /me`
pub async fn me(State(state): State<AppState>, user: AuthUser) -> ApiResult<Json<ApiResponse<Profile>>> {
    let profile = match state.db.users().get_by_google_id(user.id()).await? {
        Some(stored) => Profile::Stored(stored),
        None => {
            let AuthUser(claims) = user;
            Profile::Token {
                google_id: claims.sub,
                email: claims.email,
                is_admin: claims.is_admin,
            }
        }
    };

    Ok(Json(ApiResponse::success(profile)))
}
