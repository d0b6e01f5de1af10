/*
 * Responsibility
 * - POST /authorize (gateway からの authorizer 呼び出し)
 * - Allow → 200 + policy/context, Deny → 401 (理由は返さない)
 */
use axum::{Json, extract::State, extract::rejection::JsonRejection};

use crate::{
    api::v1::dto::authorize::{AuthorizeRequest, AuthorizeResponse},
    error::AppError,
    services::authorizer::Decision,
    state::AppState,
};

pub async fn authorize(
    State(state): State<AppState>,
    payload: Result<Json<AuthorizeRequest>, JsonRejection>,
) -> Result<Json<AuthorizeResponse>, AppError> {
    // A malformed event is a gateway wiring problem, not a Deny.
    let Json(req) = payload.map_err(|rejection| {
        tracing::warn!(error = %rejection, "invalid authorizer event");
        AppError::bad_request("INVALID_AUTHORIZER_EVENT", rejection.body_text())
    })?;

    match state.authorizer.authorize(&req.into()).await {
        Decision::Allow { identity, resource } => {
            Ok(Json(AuthorizeResponse::allow(identity, resource)))
        }
        Decision::Deny => Err(AppError::Unauthorized),
    }
}
