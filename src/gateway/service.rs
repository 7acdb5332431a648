//! Request-level orchestration over a [`DomainRegistry`].
//!
//! Each operation is linear: read → decide → write audit row → return. There
//! is no locking or retry; concurrent calls interleave freely and every gate
//! call on a known domain appends its own event.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::gateway::error::{GatewayError, GatewayResult};
use crate::gateway::policy::{self, AccessDecision};
use crate::observability::metrics;
use crate::registry::{
    DomainId, DomainRegistry, DomainStatus, DomainStatusUpdate, EventType, NewDecision, NewEvent,
    PublishDecision,
};

/// Outcome of a gate request for a known domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    /// Access allowed; the client should be sent to `redirect_to`.
    Allowed { redirect_to: String, anomalies: i64 },
    /// Policy hold; no redirect.
    Blocked { status: DomainStatus, anomalies: i64 },
}

/// Public projection of an online domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowedDomain {
    pub domain_name: String,
    pub role: String,
}

/// Counts from one recalculation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecalcSummary {
    pub published: usize,
    pub unpublished: usize,
}

impl RecalcSummary {
    pub fn total(&self) -> usize {
        self.published + self.unpublished
    }
}

/// The gateway's business operations.
#[derive(Clone)]
pub struct GatewayService {
    registry: Arc<dyn DomainRegistry>,
    today: fn() -> NaiveDate,
}

impl GatewayService {
    pub fn new(registry: Arc<dyn DomainRegistry>) -> Self {
        Self::with_clock(registry, policy::today)
    }

    /// Use `today` instead of the host clock to pick the metric date.
    pub fn with_clock(registry: Arc<dyn DomainRegistry>, today: fn() -> NaiveDate) -> Self {
        Self { registry, today }
    }

    async fn anomalies_today(&self, domain_id: DomainId) -> GatewayResult<i64> {
        let recorded = self.registry.anomalies_on(domain_id, (self.today)()).await?;
        Ok(policy::anomalies_today(recorded))
    }

    /// Check `domain_name` against policy and record the attempt.
    pub async fn gate(&self, domain_name: &str) -> GatewayResult<GateOutcome> {
        let domain = match self.registry.find_domain_by_name(domain_name).await? {
            Some(domain) => domain,
            None => {
                tracing::info!(domain = %domain_name, "Gate request for unknown domain");
                metrics::record_access("not_found");
                return Err(GatewayError::NotFound(domain_name.to_string()));
            }
        };

        let anomalies = self.anomalies_today(domain.id.clone()).await?;
        let status = domain.publication_status();

        match policy::evaluate_access(status, anomalies) {
            AccessDecision::Block => {
                self.registry
                    .insert_event(NewEvent {
                        domain_id: domain.id,
                        event_type: EventType::AccessBlocked,
                        actor: policy::ACTOR.to_string(),
                        metadata: policy::blocked_metadata(domain.status.as_deref(), anomalies),
                    })
                    .await?;

                tracing::warn!(
                    domain = %domain.domain_name,
                    status = domain.status.as_deref().unwrap_or("null"),
                    anomalies,
                    threshold = policy::ANOMALY_THRESHOLD,
                    outcome = "blocked",
                    "Access blocked"
                );
                metrics::record_access("blocked");

                Ok(GateOutcome::Blocked { status, anomalies })
            }
            AccessDecision::Allow => {
                // Computed before the audit write; it cannot fail afterwards.
                let redirect_to = policy::redirect_target(&domain.domain_name);

                self.registry
                    .insert_event(NewEvent {
                        domain_id: domain.id,
                        event_type: EventType::AccessAllowed,
                        actor: policy::ACTOR.to_string(),
                        metadata: policy::evidence(anomalies),
                    })
                    .await?;

                tracing::info!(
                    domain = %domain.domain_name,
                    anomalies,
                    outcome = "allowed",
                    "Access allowed"
                );
                metrics::record_access("allowed");

                Ok(GateOutcome::Allowed {
                    redirect_to,
                    anomalies,
                })
            }
        }
    }

    /// Re-evaluate every domain and persist the resulting status.
    ///
    /// Not transactional: an error on one domain leaves earlier domains
    /// updated and later ones untouched.
    pub async fn recalculate(&self) -> GatewayResult<RecalcSummary> {
        let domains = self.registry.list_domains().await?;
        let mut summary = RecalcSummary::default();

        for domain in domains {
            let anomalies = self.anomalies_today(domain.id.clone()).await?;
            let decision = policy::evaluate_publication(anomalies);

            self.registry
                .insert_decision(NewDecision {
                    domain_id: domain.id.clone(),
                    decision,
                    reason: policy::decision_reason(decision).to_string(),
                    evidence: policy::evidence(anomalies),
                })
                .await?;

            self.registry
                .update_domain_status(
                    domain.id,
                    DomainStatusUpdate {
                        status: decision.resulting_status(),
                        last_unpublish_reason: policy::unpublish_reason(decision),
                    },
                )
                .await?;

            tracing::debug!(
                domain = %domain.domain_name,
                anomalies,
                decision = decision.as_str(),
                "Domain recalculated"
            );
            metrics::record_recalc_decision(decision.as_str());

            match decision {
                PublishDecision::Publish => summary.published += 1,
                PublishDecision::Unpublish => summary.unpublished += 1,
            }
        }

        tracing::info!(
            domains = summary.total(),
            published = summary.published,
            unpublished = summary.unpublished,
            "Recalculation complete"
        );
        Ok(summary)
    }

    /// Online domains, projected for bot consumers.
    pub async fn allowed_domains(&self) -> GatewayResult<Vec<AllowedDomain>> {
        let domains = self
            .registry
            .list_domains_by_status(DomainStatus::Online)
            .await?;

        Ok(domains
            .into_iter()
            .map(|d| AllowedDomain {
                domain_name: d.domain_name,
                role: d.role,
            })
            .collect())
    }
}
