/*
 * Responsibility
 * - 環境変数や設定の読み込み (PORT, DATABASE_URL, JWT_SECRET, CORS 許可など)
 * - 設定値のバリデーション (不足なら起動失敗)
 */
use std::net::SocketAddr;
use std::str::FromStr;
use std::{env, fmt};

use thiserror::Error;

use crate::services::auth::token_issuer::MAX_TTL_SECONDS;
use crate::services::auth::token_validator::MAX_LEEWAY_SECONDS;

/// Minimum HS256 key length. Shorter secrets are rejected at startup.
pub const MIN_JWT_SECRET_BYTES: usize = 32;

const DEV_JWT_SECRET: &str = "dev-only-person-auth-api-signing-secret-change-me";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn from_value(raw: Option<&str>) -> Self {
        match raw.unwrap_or("development").trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing configuration: {0}")]
    Missing(&'static str),
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

#[derive(Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    // None -> in-memory stores
    pub database_url: Option<String>,

    pub cors_allowed_origins: Vec<String>,
    pub request_timeout_seconds: u64,

    pub jwt_secret: String,
    pub auth_issuer: String,
    pub access_token_ttl_seconds: u64,
    pub access_token_leeway_seconds: u64,

    pub bcrypt_cost: u32,
    pub seed_demo_users: bool,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print the signing secret or credentials in the database url
        f.debug_struct("Config")
            .field("addr", &self.addr)
            .field("app_env", &self.app_env)
            .field("database", &self.database_url.as_ref().map(|_| "postgres"))
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("request_timeout_seconds", &self.request_timeout_seconds)
            .field("auth_issuer", &self.auth_issuer)
            .field("access_token_ttl_seconds", &self.access_token_ttl_seconds)
            .field("access_token_leeway_seconds", &self.access_token_leeway_seconds)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("seed_demo_users", &self.seed_demo_users)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the config from any variable source. `from_env` passes the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port: u16 = parse_var(&lookup, "PORT", 3000)?;
        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::from_value(lookup("APP_ENV").as_deref());

        let database_url = lookup("DATABASE_URL")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let cors_allowed_origins =
            parse_list(&lookup("CORS_ALLOWED_ORIGINS").unwrap_or_default());

        let request_timeout_seconds: u64 = parse_var(&lookup, "REQUEST_TIMEOUT_SECONDS", 30)?;
        if request_timeout_seconds == 0 {
            return Err(ConfigError::Invalid("REQUEST_TIMEOUT_SECONDS"));
        }

        let jwt_secret = match lookup("JWT_SECRET") {
            Some(secret) => secret,
            // Production must never fall back to a well-known key.
            None if app_env.is_production() => {
                return Err(ConfigError::Missing("JWT_SECRET"));
            }
            None => {
                tracing::warn!("JWT_SECRET is not set; using the development signing secret");
                DEV_JWT_SECRET.to_string()
            }
        };
        if jwt_secret.len() < MIN_JWT_SECRET_BYTES {
            return Err(ConfigError::Invalid("JWT_SECRET"));
        }

        let auth_issuer =
            lookup("AUTH_ISSUER").unwrap_or_else(|| "person-auth-api".to_string());
        if auth_issuer.trim().is_empty() {
            return Err(ConfigError::Invalid("AUTH_ISSUER"));
        }

        let access_token_ttl_seconds: u64 =
            parse_var(&lookup, "ACCESS_TOKEN_TTL_SECONDS", 3600)?; // 1 hour
        if !(1..=MAX_TTL_SECONDS).contains(&access_token_ttl_seconds) {
            return Err(ConfigError::Invalid("ACCESS_TOKEN_TTL_SECONDS"));
        }

        let access_token_leeway_seconds: u64 =
            parse_var(&lookup, "ACCESS_TOKEN_LEEWAY_SECONDS", 0)?;
        if access_token_leeway_seconds > MAX_LEEWAY_SECONDS {
            return Err(ConfigError::Invalid("ACCESS_TOKEN_LEEWAY_SECONDS"));
        }

        let bcrypt_cost: u32 = parse_var(&lookup, "BCRYPT_COST", bcrypt::DEFAULT_COST)?;
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(ConfigError::Invalid("BCRYPT_COST"));
        }

        let seed_demo_users = lookup("SEED_DEMO_USERS")
            .map(|v| parse_bool(&v))
            .unwrap_or(false);

        Ok(Self {
            addr,
            app_env,
            database_url,
            cors_allowed_origins,
            request_timeout_seconds,
            jwt_secret,
            auth_issuer,
            access_token_ttl_seconds,
            access_token_leeway_seconds,
            bcrypt_cost,
            seed_demo_users,
        })
    }
}

/// Unset means `default`; set but unparsable fails startup.
fn parse_var<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(name)),
        None => Ok(default),
    }
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_bool(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn parse_list_drops_blank_entries() {
        let origins = parse_list(" https://a.example , ,https://b.example,");
        assert_eq!(origins, vec!["https://a.example", "https://b.example"]);
    }

    #[test]
    fn parse_bool_accepts_common_truthy_values() {
        for v in ["1", "true", "TRUE", " yes ", "on"] {
            assert!(parse_bool(v), "{v} should be truthy");
        }
        for v in ["0", "false", "", "nope"] {
            assert!(!parse_bool(v), "{v} should be falsy");
        }
    }

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.addr.port(), 3000);
        assert_eq!(config.app_env, AppEnv::Development);
        assert_eq!(config.request_timeout_seconds, 30);
        assert_eq!(config.access_token_ttl_seconds, 3600);
        assert_eq!(config.access_token_leeway_seconds, 0);
        assert_eq!(config.bcrypt_cost, bcrypt::DEFAULT_COST);
        assert!(config.database_url.is_none());
        assert!(!config.seed_demo_users);
    }

    #[test]
    fn unparsable_numbers_fail_instead_of_defaulting() {
        for (name, value) in [
            ("PORT", "not-a-port"),
            ("PORT", "70000"),
            ("REQUEST_TIMEOUT_SECONDS", "-5"),
            ("ACCESS_TOKEN_TTL_SECONDS", "one-hour"),
            ("ACCESS_TOKEN_LEEWAY_SECONDS", "soon"),
            ("BCRYPT_COST", "high"),
        ] {
            match Config::from_lookup(lookup(&[(name, value)])) {
                Err(ConfigError::Invalid(got)) => assert_eq!(got, name),
                other => panic!("{name}={value} gave {other:?}"),
            }
        }
    }

    #[test]
    fn out_of_range_values_fail() {
        let ttl_too_long = (MAX_TTL_SECONDS + 1).to_string();
        let leeway_too_long = (MAX_LEEWAY_SECONDS + 1).to_string();
        let huge = u64::MAX.to_string();
        for (name, value) in [
            ("REQUEST_TIMEOUT_SECONDS", "0"),
            ("ACCESS_TOKEN_TTL_SECONDS", "0"),
            ("ACCESS_TOKEN_TTL_SECONDS", ttl_too_long.as_str()),
            ("ACCESS_TOKEN_TTL_SECONDS", huge.as_str()),
            ("ACCESS_TOKEN_LEEWAY_SECONDS", leeway_too_long.as_str()),
            ("ACCESS_TOKEN_LEEWAY_SECONDS", huge.as_str()),
            ("BCRYPT_COST", "3"),
            ("JWT_SECRET", "too-short"),
            ("AUTH_ISSUER", "  "),
        ] {
            match Config::from_lookup(lookup(&[(name, value)])) {
                Err(ConfigError::Invalid(got)) => assert_eq!(got, name),
                other => panic!("{name}={value} gave {other:?}"),
            }
        }
    }

    #[test]
    fn production_requires_a_secret() {
        let err = Config::from_lookup(lookup(&[("APP_ENV", "production")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("JWT_SECRET")));

        let secret = "x".repeat(MIN_JWT_SECRET_BYTES);
        let vars = [("APP_ENV", "prod"), ("JWT_SECRET", secret.as_str())];
        let config = Config::from_lookup(lookup(&vars)).unwrap();
        assert!(config.app_env.is_production());
    }

    #[test]
    fn dev_secret_is_long_enough_for_hs256() {
        assert!(DEV_JWT_SECRET.len() >= MIN_JWT_SECRET_BYTES);
    }
}
