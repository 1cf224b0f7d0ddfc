pub mod claims;
pub mod factory;
pub mod password;
pub mod role;
pub mod service;
pub mod token_issuer;
pub mod token_validator;

pub use factory::build_auth_service;
pub use role::Role;
pub use service::{AuthService, IssuedToken};
pub use token_issuer::TokenIssuer;
pub use token_validator::{TokenError, TokenValidator};
