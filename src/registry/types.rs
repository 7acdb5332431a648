//! Registry row types and error definitions.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Primary key of a `domains` row.
///
/// Carried opaquely: identity columns decode as `Int`, UUID and text keys as
/// `Text`. Serializes back to the same JSON shape it was read from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DomainId {
    Int(i64),
    Text(String),
}

impl DomainId {
    /// Fresh random key, for rows created in-process.
    pub fn new() -> Self {
        Self::Text(Uuid::new_v4().to_string())
    }
}

impl Default for DomainId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<i64> for DomainId {
    fn from(id: i64) -> Self {
        Self::Int(id)
    }
}

impl From<&str> for DomainId {
    fn from(id: &str) -> Self {
        Self::Text(id.to_string())
    }
}

impl From<String> for DomainId {
    fn from(id: String) -> Self {
        Self::Text(id)
    }
}

impl std::fmt::Display for DomainId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DomainId::Int(id) => id.fmt(f),
            DomainId::Text(id) => f.write_str(id),
        }
    }
}

/// Publication status the gateway writes and filters on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DomainStatus {
    Online,
    Offline,
}

impl DomainStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DomainStatus::Online => "online",
            DomainStatus::Offline => "offline",
        }
    }

    /// Read a stored status column. Anything but `online`, null included,
    /// counts as offline.
    pub fn from_stored(raw: Option<&str>) -> Self {
        match raw {
            Some("online") => DomainStatus::Online,
            _ => DomainStatus::Offline,
        }
    }
}

impl std::fmt::Display for DomainStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A row of the `domains` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    pub id: DomainId,
    pub domain_name: String,
    #[serde(default)]
    pub role: String,
    /// Status column exactly as stored; see [`Domain::publication_status`].
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub last_unpublish_reason: Option<String>,
}

impl Domain {
    pub fn publication_status(&self) -> DomainStatus {
        DomainStatus::from_stored(self.status.as_deref())
    }
}

/// Projection of `metrics_daily` used for policy checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct DailyMetric {
    #[serde(default)]
    pub anomalies: Option<i64>,
}

/// Outcome recorded for a single `/go` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    AccessAllowed,
    AccessBlocked,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::AccessAllowed => "access_allowed",
            EventType::AccessBlocked => "access_blocked",
        }
    }
}

/// Insert payload for the `events` table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewEvent {
    pub domain_id: DomainId,
    pub event_type: EventType,
    pub actor: String,
    pub metadata: serde_json::Value,
}

/// Publication decision made by recalculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublishDecision {
    Publish,
    Unpublish,
}

impl PublishDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            PublishDecision::Publish => "publish",
            PublishDecision::Unpublish => "unpublish",
        }
    }

    /// Status a domain takes after this decision is applied.
    pub fn resulting_status(&self) -> DomainStatus {
        match self {
            PublishDecision::Publish => DomainStatus::Online,
            PublishDecision::Unpublish => DomainStatus::Offline,
        }
    }
}

/// Insert payload for the `decisions` table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewDecision {
    pub domain_id: DomainId,
    pub decision: PublishDecision,
    pub reason: String,
    pub evidence: serde_json::Value,
}

/// Patch payload for a `domains` row. `None` clears the reason column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DomainStatusUpdate {
    pub status: DomainStatus,
    pub last_unpublish_reason: Option<String>,
}

/// Errors that can occur while talking to the registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Transport failure or timeout.
    #[error("registry request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Registry answered with a non-success status.
    #[error("registry returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body did not match the expected shape.
    #[error("failed to decode registry response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Client could not be built from the configured URL or credential.
    #[error("invalid registry configuration: {0}")]
    Config(String),
}

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;
