//! In-process registry with the same contract as the REST client.
//!
//! Used by the unit and integration tests. Rows are kept in insertion order
//! so "registry order" is deterministic. Individual operations can be made to fail to exercise the
//! upstream-failure paths.

use async_trait::async_trait;
use chrono::NaiveDate;
use dashmap::DashMap;
use std::sync::Mutex;

use crate::registry::types::{
    Domain, DomainId, DomainStatus, DomainStatusUpdate, NewDecision, NewEvent, RegistryError,
    RegistryResult,
};
use crate::registry::DomainRegistry;

/// Thread-safe in-memory tables.
#[derive(Default)]
pub struct InMemoryRegistry {
    domains: Mutex<Vec<Domain>>,
    metrics: DashMap<(DomainId, NaiveDate), Option<i64>>,
    events: Mutex<Vec<NewEvent>>,
    decisions: Mutex<Vec<NewDecision>>,
    /// Operation name → failing domain (`None` fails every call).
    failures: DashMap<&'static str, Option<DomainId>>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a domain and return its id.
    pub fn add_domain(&self, domain_name: &str, role: &str, status: DomainStatus) -> DomainId {
        let id = DomainId::new();
        self.domains
            .lock()
            .expect("domains mutex poisoned")
            .push(Domain {
                id: id.clone(),
                domain_name: domain_name.to_string(),
                role: role.to_string(),
                status: Some(status.as_str().to_string()),
                last_unpublish_reason: None,
            });
        id
    }

    /// Overwrite the status column with an arbitrary stored value.
    pub fn set_raw_status(&self, domain_id: &DomainId, raw: Option<&str>) {
        let mut domains = self.domains.lock().expect("domains mutex poisoned");
        if let Some(domain) = domains.iter_mut().find(|d| &d.id == domain_id) {
            domain.status = raw.map(str::to_string);
        }
    }

    /// Store a metric row. `None` models a row whose count column is null.
    pub fn set_anomalies(&self, domain_id: DomainId, date: NaiveDate, anomalies: Option<i64>) {
        self.metrics.insert((domain_id, date), anomalies);
    }

    /// Make every call of `op` fail with a 503.
    pub fn fail_operation(&self, op: &'static str) {
        self.failures.insert(op, None);
    }

    /// Make calls of `op` touching `domain_id` fail with a 503.
    pub fn fail_operation_for(&self, op: &'static str, domain_id: DomainId) {
        self.failures.insert(op, Some(domain_id));
    }

    pub fn domain(&self, domain_name: &str) -> Option<Domain> {
        self.domains
            .lock()
            .expect("domains mutex poisoned")
            .iter()
            .find(|d| d.domain_name == domain_name)
            .cloned()
    }

    pub fn events(&self) -> Vec<NewEvent> {
        self.events.lock().expect("events mutex poisoned").clone()
    }

    pub fn decisions(&self) -> Vec<NewDecision> {
        self.decisions.lock().expect("decisions mutex poisoned").clone()
    }

    fn check_failure(&self, op: &'static str, domain_id: Option<&DomainId>) -> RegistryResult<()> {
        let failing = match self.failures.get(op) {
            Some(entry) => match entry.value() {
                None => true,
                Some(target) => domain_id == Some(target),
            },
            None => false,
        };

        if failing {
            return Err(RegistryError::Status {
                status: 503,
                body: format!("injected failure for {}", op),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl DomainRegistry for InMemoryRegistry {
    async fn find_domain_by_name(&self, name: &str) -> RegistryResult<Option<Domain>> {
        self.check_failure("find_domain", None)?;
        Ok(self.domain(name))
    }

    async fn list_domains(&self) -> RegistryResult<Vec<Domain>> {
        self.check_failure("list_domains", None)?;
        Ok(self.domains.lock().expect("domains mutex poisoned").clone())
    }

    async fn list_domains_by_status(&self, status: DomainStatus) -> RegistryResult<Vec<Domain>> {
        self.check_failure("list_domains_by_status", None)?;
        Ok(self
            .domains
            .lock()
            .expect("domains mutex poisoned")
            .iter()
            .filter(|d| d.status.as_deref() == Some(status.as_str()))
            .cloned()
            .collect())
    }

    async fn anomalies_on(&self, domain_id: DomainId, date: NaiveDate) -> RegistryResult<Option<i64>> {
        self.check_failure("anomalies_on", Some(&domain_id))?;
        Ok(self
            .metrics
            .get(&(domain_id, date))
            .and_then(|entry| *entry.value()))
    }

    async fn insert_event(&self, event: NewEvent) -> RegistryResult<()> {
        self.check_failure("insert_event", Some(&event.domain_id))?;
        self.events.lock().expect("events mutex poisoned").push(event);
        Ok(())
    }

    async fn insert_decision(&self, decision: NewDecision) -> RegistryResult<()> {
        self.check_failure("insert_decision", Some(&decision.domain_id))?;
        self.decisions
            .lock()
            .expect("decisions mutex poisoned")
            .push(decision);
        Ok(())
    }

    async fn update_domain_status(
        &self,
        domain_id: DomainId,
        update: DomainStatusUpdate,
    ) -> RegistryResult<()> {
        self.check_failure("update_domain_status", Some(&domain_id))?;
        let mut domains = self.domains.lock().expect("domains mutex poisoned");
        // PostgREST treats a PATCH matching no rows as success.
        if let Some(domain) = domains.iter_mut().find(|d| d.id == domain_id) {
            domain.status = Some(update.status.as_str().to_string());
            domain.last_unpublish_reason = update.last_unpublish_reason;
        }
        Ok(())
    }
}
