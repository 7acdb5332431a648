//! Gateway business logic.
//!
//! # Data Flow
//! ```text
//! /go/{domain}   → service.gate()          → policy::evaluate_access()      → events row
//! /admin/recalc  → service.recalculate()   → policy::evaluate_publication() → decisions row + domains patch
//! /allowed       → service.allowed_domains()
//! ```

pub mod error;
pub mod policy;
pub mod service;

pub use error::{GatewayError, GatewayResult};
pub use policy::ANOMALY_THRESHOLD;
pub use service::{AllowedDomain, GateOutcome, GatewayService, RecalcSummary};
