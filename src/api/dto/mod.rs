pub mod auth;
pub mod persons;
