//! Session API endpoints

use axum::{Extension, extract::State, http::StatusCode};

use crate::{
    ServerError,
    server::{ServerState, SessionToken},
};

/// Revoke the token the request was authenticated with
pub async fn logout(
    Extension(token): Extension<SessionToken>,
    State(state): State<ServerState>,
) -> Result<StatusCode, ServerError> {
    state.engine.revoke_token(&token.0).await?;
    Ok(StatusCode::OK)
}

/// Revoke every session token, including the caller's
pub async fn clear_tokens(State(state): State<ServerState>) -> Result<StatusCode, ServerError> {
    state.engine.revoke_all_tokens().await?;
    Ok(StatusCode::OK)
}
