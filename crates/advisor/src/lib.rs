//! `smartstore-advisor`
//!
//! **Responsibility:** restock-decision boundary over an optional external
//! advisory service.
//!
//! This crate is intentionally **not** part of the domain model:
//! - It must not mutate shelf state; it only reads the empty subset.
//! - Every external answer passes an explicit parse-and-validate step before
//!   it is trusted.
//! - Every failure degrades to the deterministic local fallback; nothing in
//!   here is fatal.

pub mod decision;
pub mod transport;

pub use decision::{fallback, Decision, DecisionSource, FallbackReason, RestockAdvisor};
pub use transport::{
    AdvisoryConfig, AdvisoryRequest, AdvisoryTransport, HttpAdvisoryTransport, TransportError,
};
