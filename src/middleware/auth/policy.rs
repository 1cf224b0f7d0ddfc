//! Declarative role → path authorization.
//!
//! Rules are checked in declaration order and the first match wins. The
//! policy only reads the `Principal` left by the authentication filter; it
//! never looks at credentials itself.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};

use crate::api::extractors::Principal;
use crate::error::AppError;
use crate::services::auth::Role;
use crate::state::AppState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    PermitAll,
    Authenticated,
    HasAnyRole(Vec<Role>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    // 401
    Unauthenticated,
    // 403
    Forbidden,
}

/// `/a/b` matches exactly; `/a/**` matches `/a` and everything below it.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PathPattern {
    base: String,
    subtree: bool,
}

impl PathPattern {
    fn parse(pattern: &str) -> Self {
        match pattern.strip_suffix("/**") {
            Some(base) => Self {
                base: base.to_string(),
                subtree: true,
            },
            None => Self {
                base: normalize(pattern).to_string(),
                subtree: false,
            },
        }
    }

    fn matches(&self, path: &str) -> bool {
        let path = normalize(path);
        if !self.subtree {
            return path == self.base;
        }
        match path.strip_prefix(self.base.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }
}

// "/api/user/" -> "/api/user"; "/" stays "/"
fn normalize(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() { "/" } else { trimmed }
}

#[derive(Debug, Clone)]
pub struct AccessPolicy {
    rules: Vec<(PathPattern, Rule)>,
    any_request: Rule,
}

impl AccessPolicy {
    pub fn builder() -> AccessPolicyBuilder {
        AccessPolicyBuilder::default()
    }

    /// The service's route policy.
    pub fn standard() -> Self {
        Self::builder()
            .permit_all("/health")
            .permit_all("/hello")
            .permit_all("/auth/**")
            .has_role("/api/admin/**", Role::Admin)
            .has_any_role("/api/user/**", &[Role::User, Role::Admin])
            .authenticated("/api/me")
            .any_request(Rule::Authenticated)
    }

    pub fn rule_for(&self, path: &str) -> &Rule {
        self.rules
            .iter()
            .find(|(pattern, _)| pattern.matches(path))
            .map(|(_, rule)| rule)
            .unwrap_or(&self.any_request)
    }

    pub fn decide(&self, path: &str, principal: Option<&Principal>) -> Decision {
        match (self.rule_for(path), principal) {
            (Rule::PermitAll, _) => Decision::Allow,
            (_, None) => Decision::Unauthenticated,
            (Rule::Authenticated, Some(_)) => Decision::Allow,
            (Rule::HasAnyRole(roles), Some(p)) if p.has_any_role(roles) => Decision::Allow,
            (Rule::HasAnyRole(_), Some(_)) => Decision::Forbidden,
        }
    }
}

#[derive(Debug, Default)]
pub struct AccessPolicyBuilder {
    rules: Vec<(PathPattern, Rule)>,
}

impl AccessPolicyBuilder {
    pub fn rule(mut self, pattern: &str, rule: Rule) -> Self {
        self.rules.push((PathPattern::parse(pattern), rule));
        self
    }

    pub fn permit_all(self, pattern: &str) -> Self {
        self.rule(pattern, Rule::PermitAll)
    }

    pub fn authenticated(self, pattern: &str) -> Self {
        self.rule(pattern, Rule::Authenticated)
    }

    pub fn has_role(self, pattern: &str, role: Role) -> Self {
        self.rule(pattern, Rule::HasAnyRole(vec![role]))
    }

    pub fn has_any_role(self, pattern: &str, roles: &[Role]) -> Self {
        self.rule(pattern, Rule::HasAnyRole(roles.to_vec()))
    }

    /// Catch-all for paths no rule matched. Finishes the builder.
    pub fn any_request(self, rule: Rule) -> AccessPolicy {
        AccessPolicy {
            rules: self.rules,
            any_request: rule,
        }
    }
}

pub async fn enforce(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let decision = state
        .policy
        .decide(req.uri().path(), req.extensions().get::<Principal>());

    match decision {
        Decision::Allow => Ok(next.run(req).await),
        Decision::Unauthenticated => {
            debug!(path = %req.uri().path(), "rejected: authentication required");
            Err(AppError::Unauthorized)
        }
        Decision::Forbidden => {
            let username = req
                .extensions()
                .get::<Principal>()
                .map(|p| p.username.as_str())
                .unwrap_or_default();
            warn!(path = %req.uri().path(), username, "rejected: insufficient role");
            Err(AppError::Forbidden)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::extractors::AuthScheme;

    fn principal(role: Role) -> Principal {
        Principal {
            username: "someone".into(),
            role,
            authorities: vec![role.authority()],
            scheme: AuthScheme::Bearer,
        }
    }

    #[test]
    fn pattern_matching() {
        let sub = PathPattern::parse("/api/admin/**");
        assert!(sub.matches("/api/admin"));
        assert!(sub.matches("/api/admin/"));
        assert!(sub.matches("/api/admin/hello"));
        assert!(!sub.matches("/api/administrator"));
        assert!(!sub.matches("/api"));

        let exact = PathPattern::parse("/health");
        assert!(exact.matches("/health"));
        assert!(exact.matches("/health/"));
        assert!(!exact.matches("/health/deep"));

        let all = PathPattern::parse("/**");
        assert!(all.matches("/"));
        assert!(all.matches("/anything/at/all"));
    }

    #[test]
    fn first_matching_rule_wins() {
        let policy = AccessPolicy::builder()
            .permit_all("/api/public/**")
            .has_role("/api/**", Role::Admin)
            .any_request(Rule::Authenticated);

        assert_eq!(policy.rule_for("/api/public/x"), &Rule::PermitAll);
        assert_eq!(
            policy.rule_for("/api/other"),
            &Rule::HasAnyRole(vec![Role::Admin])
        );
        assert_eq!(policy.rule_for("/elsewhere"), &Rule::Authenticated);
    }

    #[test]
    fn standard_policy_admin_routes() {
        let policy = AccessPolicy::standard();
        let admin = principal(Role::Admin);
        let user = principal(Role::User);

        assert_eq!(policy.decide("/api/admin/hello", Some(&admin)), Decision::Allow);
        assert_eq!(policy.decide("/api/admin/hello", Some(&user)), Decision::Forbidden);
        assert_eq!(policy.decide("/api/admin/hello", None), Decision::Unauthenticated);
    }

    #[test]
    fn standard_policy_user_routes_allow_admin_too() {
        let policy = AccessPolicy::standard();
        assert_eq!(
            policy.decide("/api/user/hello", Some(&principal(Role::User))),
            Decision::Allow
        );
        assert_eq!(
            policy.decide("/api/user/hello", Some(&principal(Role::Admin))),
            Decision::Allow
        );
    }

    #[test]
    fn standard_policy_public_and_fallback() {
        let policy = AccessPolicy::standard();
        assert_eq!(policy.decide("/auth/login", None), Decision::Allow);
        assert_eq!(policy.decide("/health", None), Decision::Allow);
        assert_eq!(policy.decide("/hello", None), Decision::Allow);
        assert_eq!(policy.rule_for("/api/me"), &Rule::Authenticated);
        assert_eq!(policy.decide("/api/me", None), Decision::Unauthenticated);
        assert_eq!(policy.decide("/api/persons", None), Decision::Unauthenticated);
        assert_eq!(
            policy.decide("/api/persons", Some(&principal(Role::User))),
            Decision::Allow
        );
    }
}
