//! Domain layer for the authz gate.

pub mod error;
pub mod service;

pub use error::DomainError;
pub use service::{PooledDecisionClient, Service};
