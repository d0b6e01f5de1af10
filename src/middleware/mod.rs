/*
 * Responsibility
 * - middleware の公開インターフェース
 * - http: request-id / trace / body limit / timeout
 * - auth: Basic credential による認可 → AuthCtx を extensions に入れる
 */
pub mod auth;
pub mod http;
