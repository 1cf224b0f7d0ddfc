//! Authorization header → Principal を extensions に入れる (認証 filter)
//!
//! - `Authorization: Bearer <jwt>`: subject を取り出し、credential record を引いて検証する
//! - `Authorization: Basic <base64(user:pass)>`: credential store でパスワードを照合する
//! - 認証に失敗してもリクエストは必ず次へ流す。拒否は policy 側の責務

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
};
use base64::{Engine, engine::general_purpose::STANDARD};
use tracing::debug;

use crate::api::extractors::{AuthScheme, Principal};
use crate::state::AppState;

const BEARER_PREFIX: &str = "Bearer ";
const BASIC_PREFIX: &str = "Basic ";

#[derive(Debug, PartialEq, Eq)]
pub enum Credentials {
    Bearer(String),
    Basic { username: String, password: String },
}

/// Parse an `Authorization` header value. Unknown schemes and malformed
/// payloads yield `None`.
pub fn parse_authorization(value: &str) -> Option<Credentials> {
    if let Some(token) = value.strip_prefix(BEARER_PREFIX) {
        let token = token.trim();
        return (!token.is_empty()).then(|| Credentials::Bearer(token.to_string()));
    }

    if let Some(encoded) = value.strip_prefix(BASIC_PREFIX) {
        let decoded = STANDARD.decode(encoded.trim()).ok()?;
        let decoded = String::from_utf8(decoded).ok()?;
        let (username, password) = decoded.split_once(':')?;
        if username.is_empty() {
            return None;
        }
        return Some(Credentials::Basic {
            username: username.to_string(),
            password: password.to_string(),
        });
    }

    None
}

pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    // An upstream layer may already have authenticated this request.
    if req.extensions().get::<Principal>().is_none() {
        let credentials = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_authorization);

        if let Some(credentials) = credentials
            && let Some(principal) = resolve_principal(&state, credentials).await
        {
            debug!(
                username = %principal.username,
                scheme = ?principal.scheme,
                "request authenticated"
            );
            // middleware → extractor / policy への受け渡し
            req.extensions_mut().insert(principal);
        }
    }

    next.run(req).await
}

async fn resolve_principal(state: &AppState, credentials: Credentials) -> Option<Principal> {
    match credentials {
        Credentials::Bearer(token) => state
            .auth
            .authenticate_bearer(&token)
            .await
            .map(|user| Principal::from_record(&user, AuthScheme::Bearer)),
        Credentials::Basic { username, password } => state
            .auth
            .authenticate_basic(&username, &password)
            .await
            .map(|user| Principal::from_record(&user, AuthScheme::Basic)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bearer() {
        assert_eq!(
            parse_authorization("Bearer abc.def.ghi"),
            Some(Credentials::Bearer("abc.def.ghi".into()))
        );
        assert_eq!(parse_authorization("Bearer "), None);
        assert_eq!(parse_authorization("bearer abc"), None);
    }

    #[test]
    fn parses_basic() {
        // admin:admin123
        let header = format!("Basic {}", STANDARD.encode("admin:admin123"));
        assert_eq!(
            parse_authorization(&header),
            Some(Credentials::Basic {
                username: "admin".into(),
                password: "admin123".into(),
            })
        );

        // passwords may contain ':'
        let header = format!("Basic {}", STANDARD.encode("u:a:b"));
        assert_eq!(
            parse_authorization(&header),
            Some(Credentials::Basic {
                username: "u".into(),
                password: "a:b".into(),
            })
        );
    }

    #[test]
    fn rejects_malformed_basic_and_unknown_schemes() {
        assert_eq!(parse_authorization("Basic !!!not-base64"), None);
        let no_colon = format!("Basic {}", STANDARD.encode("admin"));
        assert_eq!(parse_authorization(&no_colon), None);
        let no_user = format!("Basic {}", STANDARD.encode(":pw"));
        assert_eq!(parse_authorization(&no_user), None);
        assert_eq!(parse_authorization("Digest foo"), None);
        assert_eq!(parse_authorization(""), None);
    }
}
