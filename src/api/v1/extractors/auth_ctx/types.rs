/*
 * Responsibility
 * - Handler から見える「認可済みコンテキスト」の型
 * - middleware が Allow 時に request extensions に格納し、handler はこの型だけを受け取る
 */
use crate::services::authorizer::Identity;

/// Caller context of a credentialed request.
///
/// - `user_id` is the username the Basic credential was issued for
/// - `credits` is the balance read during authorization (0 when unset)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthCtx {
    pub user_id: String,
    pub credits: i64,
}

impl From<Identity> for AuthCtx {
    fn from(identity: Identity) -> Self {
        Self {
            user_id: identity.user_id,
            credits: identity.credits,
        }
    }
}
