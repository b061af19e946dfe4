//! Session authentication.

mod auth_claims;
mod auth_state;

pub use self::auth_claims::AuthClaims;
pub use self::auth_state::{AuthState, SESSION_COOKIE};
