//! 認証 (bearer / basic filter) と認可 (AccessPolicy) の配線
//!
//! filter は Principal を付けるだけで拒否しない。拒否は policy が行う。

pub mod bearer;
pub mod policy;

use axum::{Router, middleware};

use crate::state::AppState;

/// Router 全体に認証 filter → 認可 policy の順で掛ける。
///
/// ```ignore
/// let router = middleware::auth::apply(api::routes(), state.clone());
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // 後から layer したものが外側 = 先に実行される
    router
        .layer(middleware::from_fn_with_state(state.clone(), policy::enforce))
        .layer(middleware::from_fn_with_state(state, bearer::authenticate))
}
