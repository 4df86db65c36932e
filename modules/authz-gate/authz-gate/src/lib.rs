//! Authz Gate
//!
//! Request-time access-control filter sitting in front of proxy routing.
//! Per request it resolves the target resource from the route table, maps
//! the HTTP verb to a permission scope, extracts the caller's access token,
//! and delegates the decision to the remote authorization server through a
//! bounded pool of decision-client handles. Every failure mode collapses to
//! a `403 Forbidden` — the gate fails closed.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod client;
pub mod config;
pub mod domain;
pub mod filter;
pub mod principal;
pub mod routes;

pub use config::{AuthzGateConfig, IssuerEndpoints, PoolSizing};
pub use domain::{DomainError, PooledDecisionClient, Service};
pub use filter::{AuthzGateState, authz_middleware};
pub use principal::{AuthenticatedPrincipal, SessionTokenStore, StoredAccessToken};
pub use routes::{RouteEntry, RouteTable};
