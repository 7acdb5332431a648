//! Domain registry access.
//!
//! # Data Flow
//! ```text
//! Environment (SUPABASE_URL, SUPABASE_SERVICE_ROLE_KEY)
//!     → client.rs (PostgREST calls over reqwest)
//!     → types.rs (row decoding, insert/patch payloads)
//!
//! Tests / local runs:
//!     → memory.rs (same contract, in-process tables)
//! ```
//!
//! # Contract
//! The gateway only needs point lookup by unique key, equality-filtered
//! reads, inserts and update-by-key. Every call is a single round-trip with no
//! retry; failures propagate to the caller.

pub mod client;
pub mod memory;
pub mod types;

use async_trait::async_trait;
use chrono::NaiveDate;

pub use client::RegistryClient;
pub use memory::InMemoryRegistry;
pub use types::{
    DailyMetric, Domain, DomainId, DomainStatus, DomainStatusUpdate, EventType, NewDecision,
    NewEvent, PublishDecision, RegistryError, RegistryResult,
};

/// Storage operations the gateway performs against the registry.
#[async_trait]
pub trait DomainRegistry: Send + Sync {
    /// Exact match on the unique `domain_name` column.
    async fn find_domain_by_name(&self, name: &str) -> RegistryResult<Option<Domain>>;

    /// Every registered domain, in registry order.
    async fn list_domains(&self) -> RegistryResult<Vec<Domain>>;

    /// Domains whose status equals `status`.
    async fn list_domains_by_status(&self, status: DomainStatus) -> RegistryResult<Vec<Domain>>;

    /// Anomaly count recorded for `domain_id` on `date`.
    ///
    /// `Ok(None)` means no metric row exists (or its count is null).
    async fn anomalies_on(&self, domain_id: DomainId, date: NaiveDate) -> RegistryResult<Option<i64>>;

    async fn insert_event(&self, event: NewEvent) -> RegistryResult<()>;

    async fn insert_decision(&self, decision: NewDecision) -> RegistryResult<()>;

    async fn update_domain_status(
        &self,
        domain_id: DomainId,
        update: DomainStatusUpdate,
    ) -> RegistryResult<()>;
}
