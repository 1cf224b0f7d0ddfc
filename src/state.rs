/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - auth: AuthService, persons: PersonRepo, policy: AccessPolicy
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use std::sync::Arc;

use crate::middleware::auth::policy::AccessPolicy;
use crate::repos::person_repo::PersonRepo;
use crate::services::auth::AuthService;

#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub persons: Arc<dyn PersonRepo>,
    pub policy: Arc<AccessPolicy>,
}

impl AppState {
    pub fn new(
        auth: Arc<AuthService>,
        persons: Arc<dyn PersonRepo>,
        policy: Arc<AccessPolicy>,
    ) -> Self {
        Self {
            auth,
            persons,
            policy,
        }
    }
}
