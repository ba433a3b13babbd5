pub mod auth;

pub use auth::{login_redirect, CurrentUser, MaybeUser};
