//! Authz Gate SDK
//!
//! This crate provides the decision-layer API of the authz gate:
//!
//! - [`DecisionClient`] - client trait for the remote policy server
//! - [`PermissionScope`] / [`AuthorizationRequest`] - request models
//! - [`DecisionToken`] / [`TokenIntrospection`] - decision models
//! - [`DecisionClientError`] - error types
//!
//! ## Usage
//!
//! ```ignore
//! use authz_gate_sdk::{AuthorizationRequest, DecisionClient, PermissionScope};
//!
//! let scope = PermissionScope::from_http_method("GET").unwrap();
//! let request = AuthorizationRequest { resource_id: "accounts/123".into(), scope };
//!
//! let decision = client.authorize(token, &request).await?;
//! let introspection = client.introspect(&decision).await?;
//! ```
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod api;
pub mod error;
pub mod models;

// Re-export main types at crate root
pub use api::DecisionClient;
pub use error::DecisionClientError;
pub use models::{AuthorizationRequest, DecisionToken, PermissionScope, TokenIntrospection};
