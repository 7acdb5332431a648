//! PostgREST client for the domain registry.
//!
//! # Responsibilities
//! - Build table endpoints under `{url}/rest/v1/`
//! - Authenticate every call with the service credential
//! - Map non-success statuses and bad bodies to [`RegistryError`]
//! - Record per-operation latency and error metrics

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::{Duration, Instant};
use url::Url;

use crate::config::RegistryConfig;
use crate::observability::metrics;
use crate::registry::types::{
    DailyMetric, Domain, DomainId, DomainStatus, DomainStatusUpdate, NewDecision, NewEvent,
    RegistryError, RegistryResult,
};
use crate::registry::DomainRegistry;

const DOMAINS: &str = "domains";
const METRICS_DAILY: &str = "metrics_daily";
const EVENTS: &str = "events";
const DECISIONS: &str = "decisions";

const DOMAIN_COLUMNS: &str = "id,domain_name,role,status,last_unpublish_reason";

/// REST client for a PostgREST-fronted registry.
#[derive(Clone)]
pub struct RegistryClient {
    http: reqwest::Client,
    rest_base: Url,
}

impl RegistryClient {
    /// Create a new registry client.
    ///
    /// No request is made here; an unreachable registry surfaces on first use.
    pub fn new(config: &RegistryConfig) -> RegistryResult<Self> {
        let rest_base = format!("{}/rest/v1/", config.url.trim().trim_end_matches('/'));
        let rest_base = Url::parse(&rest_base)
            .map_err(|e| RegistryError::Config(format!("'{}': {}", config.url, e)))?;

        let mut headers = HeaderMap::new();
        let mut api_key = HeaderValue::from_str(&config.service_key)
            .map_err(|_| RegistryError::Config("service key is not a valid header value".into()))?;
        api_key.set_sensitive(true);
        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", config.service_key))
            .map_err(|_| RegistryError::Config("service key is not a valid header value".into()))?;
        bearer.set_sensitive(true);
        headers.insert("apikey", api_key);
        headers.insert(AUTHORIZATION, bearer);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        tracing::info!(url = %rest_base, timeout_secs = config.timeout_secs, "Registry client initialized");

        Ok(Self { http, rest_base })
    }

    fn table_url(&self, table: &str) -> RegistryResult<Url> {
        self.rest_base
            .join(table)
            .map_err(|e| RegistryError::Config(format!("table '{}': {}", table, e)))
    }

    async fn select<T: DeserializeOwned>(
        &self,
        op: &'static str,
        table: &str,
        query: &[(&str, String)],
    ) -> RegistryResult<Vec<T>> {
        let url = self.table_url(table)?;
        let start = Instant::now();

        let result: RegistryResult<Vec<T>> = async {
            let response = self.http.get(url).query(query).send().await?;
            let body = check_status(response).await?.bytes().await?;
            Ok(serde_json::from_slice(&body)?)
        }
        .await;

        metrics::record_registry_call(op, start, result.is_ok());
        result
    }

    async fn insert<T: Serialize + Sync>(&self, op: &'static str, table: &str, row: &T) -> RegistryResult<()> {
        let url = self.table_url(table)?;
        let start = Instant::now();

        let result: RegistryResult<()> = async {
            let response = self
                .http
                .post(url)
                .header("Prefer", "return=minimal")
                .json(row)
                .send()
                .await?;
            check_status(response).await?;
            Ok(())
        }
        .await;

        metrics::record_registry_call(op, start, result.is_ok());
        result
    }
}

async fn check_status(response: reqwest::Response) -> RegistryResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(RegistryError::Status {
        status: status.as_u16(),
        body,
    })
}

fn eq(value: impl std::fmt::Display) -> String {
    format!("eq.{}", value)
}

#[async_trait]
impl DomainRegistry for RegistryClient {
    async fn find_domain_by_name(&self, name: &str) -> RegistryResult<Option<Domain>> {
        let rows: Vec<Domain> = self
            .select(
                "find_domain",
                DOMAINS,
                &[
                    ("select", DOMAIN_COLUMNS.to_string()),
                    ("domain_name", eq(name)),
                    ("limit", "1".to_string()),
                ],
            )
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn list_domains(&self) -> RegistryResult<Vec<Domain>> {
        self.select("list_domains", DOMAINS, &[("select", DOMAIN_COLUMNS.to_string())])
            .await
    }

    async fn list_domains_by_status(&self, status: DomainStatus) -> RegistryResult<Vec<Domain>> {
        self.select(
            "list_domains_by_status",
            DOMAINS,
            &[("select", DOMAIN_COLUMNS.to_string()), ("status", eq(status))],
        )
        .await
    }

    async fn anomalies_on(&self, domain_id: DomainId, date: NaiveDate) -> RegistryResult<Option<i64>> {
        let rows: Vec<DailyMetric> = self
            .select(
                "anomalies_on",
                METRICS_DAILY,
                &[
                    ("select", "anomalies".to_string()),
                    ("domain_id", eq(domain_id)),
                    ("metric_date", eq(date.format("%Y-%m-%d"))),
                    ("limit", "1".to_string()),
                ],
            )
            .await?;
        Ok(rows.first().and_then(|m| m.anomalies))
    }

    async fn insert_event(&self, event: NewEvent) -> RegistryResult<()> {
        self.insert("insert_event", EVENTS, &event).await
    }

    async fn insert_decision(&self, decision: NewDecision) -> RegistryResult<()> {
        self.insert("insert_decision", DECISIONS, &decision).await
    }

    async fn update_domain_status(
        &self,
        domain_id: DomainId,
        update: DomainStatusUpdate,
    ) -> RegistryResult<()> {
        let url = self.table_url(DOMAINS)?;
        let start = Instant::now();

        let result: RegistryResult<()> = async {
            let response = self
                .http
                .patch(url)
                .query(&[("id", eq(domain_id))])
                .header("Prefer", "return=minimal")
                .json(&update)
                .send()
                .await?;
            check_status(response).await?;
            Ok(())
        }
        .await;

        metrics::record_registry_call("update_domain_status", start, result.is_ok());
        result
    }
}

impl std::fmt::Debug for RegistryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryClient")
            .field("rest_base", &self.rest_base.as_str())
            .finish()
    }
}
