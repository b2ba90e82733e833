pub mod repo;
pub mod repo_types;
pub mod services;

pub use repo::{PgTokenStore, TokenStore};
pub use repo_types::VerificationToken;
pub use services::{check, dispatch, issue, verify, TokenCheck};
