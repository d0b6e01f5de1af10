//! Basic credential authorization → AuthCtx を extensions に入れる
//!
//! The same decision the gateway gets from `POST /authorize`, applied inline
//! to routes served by this process:
//! - Deny → 401 with the generic body
//! - Allow with identity → `AuthCtx` in request extensions
//! - anonymous Allow (OPTIONS) → passed through without `AuthCtx`

use axum::{
    Router,
    body::Body,
    extract::{OriginalUri, State},
    http::Request,
    middleware::{self, Next},
    response::Response,
};

use crate::api::v1::extractors::AuthCtx;
use crate::error::AppError;
use crate::services::authorizer::{AuthorizationRequest, Decision};
use crate::state::AppState;

/// Guard every route of `router` with the authorizer.
///
/// ```ignore
/// let protected = Router::new().route("/me", get(me));
/// let protected = middleware::auth::basic::apply(protected, state.clone());
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // axum 0.8 の from_fn は State extractor を受け取れないため、`from_fn_with_state` で明示的に state を渡す
    router.layer(middleware::from_fn_with_state(state, basic_middleware))
}

async fn basic_middleware(
    State(state): State<AppState>,
    OriginalUri(original_uri): OriginalUri,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let authz_req = AuthorizationRequest {
        http_method: req.method().as_str().to_string(),
        path: original_uri.path().to_string(),
        resource: original_uri.path().to_string(),
        headers: header_list(&req),
    };

    match state.authorizer.authorize(&authz_req).await {
        Decision::Allow {
            identity: Some(identity),
            ..
        } => {
            // middleware → extractor への受け渡し
            req.extensions_mut().insert(AuthCtx::from(identity));
        }
        Decision::Allow { identity: None, .. } => {}
        Decision::Deny => return Err(AppError::Unauthorized),
    }

    Ok(next.run(req).await)
}

// Values that are not visible ASCII are kept lossily decoded; a present
// `Authorization` header must never look absent.
fn header_list(req: &Request<Body>) -> Vec<(String, String)> {
    req.headers()
        .iter()
        .map(|(name, value)| {
            let value = match value.to_str() {
                Ok(v) => v.to_string(),
                Err(_) => String::from_utf8_lossy(value.as_bytes()).into_owned(),
            };
            (name.as_str().to_string(), value)
        })
        .collect()
}
