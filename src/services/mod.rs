pub mod auth;
pub mod seed;
