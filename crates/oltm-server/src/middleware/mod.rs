//! Middleware for `axum::Router`.
//!
//! Each concern is an extension trait on [`Router`], applied by the binary
//! in this order:
//!
//! ```rust,no_run
//! use axum::Router;
//! use oltm_server::middleware::{
//!     CorsConfig, RecoveryConfig, RouterObservabilityExt, RouterRecoveryExt,
//!     RouterSecurityExt,
//! };
//!
//! let app: Router = Router::new()
//!     .with_security(CorsConfig::default())
//!     .with_observability()
//!     .with_recovery(&RecoveryConfig::default());
//! ```
//!
//! [`Router`]: axum::Router

mod observability;
mod recovery;
mod security;
mod specification;

pub use observability::{REQUEST_ID_HEADER, RouterObservabilityExt};
pub use recovery::{RecoveryConfig, RouterRecoveryExt};
pub use security::{CorsConfig, DEFAULT_CLIENT_ORIGIN, RouterSecurityExt};
pub use specification::{OpenApiConfig, RouterOpenApiExt};
