/*
 * Responsibility
 * - GET /me: middleware が載せた AuthCtx をそのまま返す
 * - store への再 lookup はしない
 */
use axum::Json;
use serde::Serialize;

use crate::api::v1::extractors::AuthCtxExtractor;

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user_id: String,
    pub credits: i64,
}

pub async fn me(AuthCtxExtractor(ctx): AuthCtxExtractor) -> Json<MeResponse> {
    Json(MeResponse {
        user_id: ctx.user_id,
        credits: ctx.credits,
    })
}
