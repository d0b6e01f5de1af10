/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 * - 起動時に一度だけ組み立て、以降は読み取り専用
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use std::sync::Arc;

use crate::services::authorizer::Authorizer;

#[derive(Clone)]
pub struct AppState {
    pub authorizer: Arc<Authorizer>,
}

impl AppState {
    pub fn new(authorizer: Arc<Authorizer>) -> Self {
        Self { authorizer }
    }
}
