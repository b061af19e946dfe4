//! Application state and dependency injection.

mod comment_store;
mod config;
mod session_keys;

use oltm_core::CommentService;

pub use crate::service::comment_store::PgCommentStore;
pub use crate::service::config::ServiceConfig;
pub use crate::service::session_keys::SessionKeys;
pub use crate::{Error, Result};

/// Everything handlers depend on.
///
/// Handlers extract individual services through the [`FromRef`]
/// projections below.
///
/// [`FromRef`]: axum::extract::FromRef
#[must_use = "state does nothing unless you use it"]
#[derive(Debug, Clone)]
pub struct ServiceState {
    comment_service: CommentService,
    session_keys: SessionKeys,
}

impl ServiceState {
    /// Assembles the state from already built services.
    pub fn new(comment_service: CommentService, session_keys: SessionKeys) -> Self {
        Self {
            comment_service,
            session_keys,
        }
    }

    /// Connects to Postgres, applies migrations and derives the session keys.
    pub async fn from_config(config: &ServiceConfig) -> Result<Self> {
        let session_keys = config.session_keys()?;
        let comment_service = config.comment_service().await?;
        Ok(Self::new(comment_service, session_keys))
    }
}

macro_rules! impl_di {
    ($($f:ident: $t:ty),+) => {$(
        impl axum::extract::FromRef<ServiceState> for $t {
            fn from_ref(state: &ServiceState) -> Self {
                state.$f.clone()
            }
        }
    )+};
}

impl_di!(comment_service: CommentService);
impl_di!(session_keys: SessionKeys);
