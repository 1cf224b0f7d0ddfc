//! Demo credentials for local runs (`SEED_DEMO_USERS=true`).

use tracing::info;

use crate::error::AppError;
use crate::services::auth::{AuthService, Role};

pub const DEMO_USERS: &[(&str, &str, Role)] = &[
    ("user", "1234", Role::User),
    ("admin", "admin123", Role::Admin),
];

/// Register the demo users. Usernames that already exist are left alone.
///
/// Returns how many records were created.
pub async fn seed_demo_users(auth: &AuthService) -> Result<usize, AppError> {
    let mut created = 0;
    for (username, password, role) in DEMO_USERS {
        match auth.register(username, password, *role).await {
            Ok(_) => created += 1,
            Err(AppError::Conflict { .. }) => {
                info!(username, "demo user already present");
            }
            Err(e) => return Err(e),
        }
    }
    Ok(created)
}
