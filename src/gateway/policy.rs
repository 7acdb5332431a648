//! Access and publication policy.
//!
//! Pure functions over a domain's status and today's anomaly count. The
//! threshold is fixed at build time.

use chrono::{Local, NaiveDate};
use serde_json::json;
use url::Host;

use crate::registry::{DomainStatus, PublishDecision};

/// Anomalies at or above this count block access and unpublish the domain.
pub const ANOMALY_THRESHOLD: i64 = 10;

/// Actor tag written on every access event.
pub const ACTOR: &str = "portal-gateway";

/// Reason stored in `access_blocked` event metadata.
pub const BLOCK_EVENT_REASON: &str = "Domain offline or anomalies above threshold";

/// Reason returned to clients on a 423.
pub const COMPLIANCE_HOLD_REASON: &str = "Temporarily unpublished or under compliance hold";

pub const WITHIN_THRESHOLD_REASON: &str = "Anomalies within threshold";
pub const THRESHOLD_EXCEEDED_REASON: &str = "Anomaly threshold exceeded";

/// Result of evaluating a single access attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Allow,
    Block,
}

/// A missing metric row is a quiet day, not an error.
pub fn anomalies_today(recorded: Option<i64>) -> i64 {
    recorded.unwrap_or(0)
}

/// Block when the domain is not online or the threshold is reached.
pub fn evaluate_access(status: DomainStatus, anomalies: i64) -> AccessDecision {
    if status != DomainStatus::Online || anomalies >= ANOMALY_THRESHOLD {
        AccessDecision::Block
    } else {
        AccessDecision::Allow
    }
}

/// Publish while under the threshold, unpublish otherwise.
pub fn evaluate_publication(anomalies: i64) -> PublishDecision {
    if anomalies < ANOMALY_THRESHOLD {
        PublishDecision::Publish
    } else {
        PublishDecision::Unpublish
    }
}

pub fn decision_reason(decision: PublishDecision) -> &'static str {
    match decision {
        PublishDecision::Publish => WITHIN_THRESHOLD_REASON,
        PublishDecision::Unpublish => THRESHOLD_EXCEEDED_REASON,
    }
}

/// Value written to `last_unpublish_reason`; cleared on publish.
pub fn unpublish_reason(decision: PublishDecision) -> Option<String> {
    match decision {
        PublishDecision::Publish => None,
        PublishDecision::Unpublish => Some(THRESHOLD_EXCEEDED_REASON.to_string()),
    }
}

/// Snapshot stored with allowed events and decisions.
pub fn evidence(anomalies: i64) -> serde_json::Value {
    json!({
        "anomalies_today": anomalies,
        "threshold": ANOMALY_THRESHOLD,
    })
}

/// Snapshot stored with blocked events. `status` is the raw stored column.
pub fn blocked_metadata(status: Option<&str>, anomalies: i64) -> serde_json::Value {
    json!({
        "reason": BLOCK_EVENT_REASON,
        "status": status,
        "anomalies_today": anomalies,
        "threshold": ANOMALY_THRESHOLD,
    })
}

/// `Location` for an allowed domain, always a valid header value.
///
/// Hostnames go through IDNA so `münchen.de` becomes its punycode form.
/// Names that are not a parseable host are percent-encoded as-is.
pub fn redirect_target(domain_name: &str) -> String {
    match Host::parse(domain_name) {
        Ok(host) => format!("https://{}", host),
        Err(_) => format!("https://{}", urlencoding::encode(domain_name)),
    }
}

/// Calendar date metrics are keyed by: the host's local date.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}
