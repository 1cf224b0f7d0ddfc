pub mod auth;
pub mod greeting;
pub mod health;
pub mod persons;
