pub mod principal;

pub use principal::{AuthScheme, CurrentUser, Principal};
