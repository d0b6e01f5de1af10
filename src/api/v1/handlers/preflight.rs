/*
 * Responsibility
 * - 保護された route への CORS preflight (OPTIONS) に 204 を返す
 * - credentials なしの OPTIONS は middleware で anonymous Allow となりここに届く
 */
use axum::http::StatusCode;

pub async fn preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}
