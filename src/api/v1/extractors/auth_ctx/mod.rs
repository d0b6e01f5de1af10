/*!
 * Authorization context extractor
 *
 * Responsibility:
 * - Allow されたリクエストのコンテキスト（AuthCtx）を handler に提供する
 * - axum 依存は extractor に閉じ込め、型定義は types に分離する
 */

mod extractor;
mod types;

pub use extractor::AuthCtxExtractor;
pub use types::AuthCtx;
