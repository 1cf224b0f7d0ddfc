/*!
 * Principal extractor
 *
 * Responsibility:
 * - 認証済みリクエストの主体 (Principal) を handler に提供する
 * - axum 依存は core に閉じ込め、型定義は types に分離する
 */

mod core;
mod types;

pub use self::core::CurrentUser;
pub use self::types::{AuthScheme, Principal};
