/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - /authorize は gateway 向け (middleware なし、判定結果を body で返す)
 * - /me は Basic middleware で保護 (OPTIONS は anonymous で通る)
 */
use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware;
use crate::state::AppState;

use crate::api::v1::handlers::{authorize::authorize, me::me, preflight::preflight};

pub fn routes(state: AppState) -> Router<AppState> {
    let protected = Router::new().route("/me", get(me).options(preflight));
    let protected = middleware::auth::basic::apply(protected, state);

    Router::new()
        .route("/authorize", post(authorize))
        .merge(protected)
}
