//! OAuth 2.0 building blocks: PKCE helpers and token types.

pub mod pkce;
pub mod types;

pub use pkce::PkceChallenge;
pub use types::{TokenResponse, TokenSet};
