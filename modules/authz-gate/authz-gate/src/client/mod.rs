//! Decision-client implementations.

pub mod http;

pub use http::{UmaClientFactory, UmaDecisionClient};
