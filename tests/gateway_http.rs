//! HTTP surface tests against the in-memory registry.

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    response::Response,
};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::time::Duration;
use tower::ServiceExt;

use portal_gateway::config::GatewayConfig;
use portal_gateway::gateway::GatewayService;
use portal_gateway::http::HttpServer;
use portal_gateway::lifecycle::Shutdown;
use portal_gateway::registry::{DomainStatus, EventType, InMemoryRegistry, PublishDecision};

mod common;

async fn send(router: &axum::Router, method: Method, uri: &str) -> Response {
    router
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_root_returns_service_info() {
    let (router, registry) = common::test_app();

    let res = send(&router, Method::GET, "/").await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().contains_key("x-request-id"));
    assert_eq!(
        json_body(res).await,
        json!({
            "service": "zerolight-portal-gateway",
            "status": "ok",
            "message": "Zero-Trust Digital Infrastructure Compliance Gateway"
        })
    );
    assert!(registry.events().is_empty());
}

#[tokio::test]
async fn test_go_redirects_when_within_threshold() {
    let (router, registry) = common::test_app();
    let id = registry.add_domain("a.com", "editor", DomainStatus::Online);
    registry.set_anomalies(id.clone(), common::fixed_day(), Some(3));

    let res = send(&router, Method::GET, "/go/a.com").await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(res.headers()[header::LOCATION], "https://a.com");

    let events = registry.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].domain_id, id);
    assert_eq!(events[0].event_type, EventType::AccessAllowed);
    assert_eq!(events[0].metadata, json!({"anomalies_today": 3, "threshold": 10}));
}

#[tokio::test]
async fn test_go_locks_when_threshold_reached() {
    let (router, registry) = common::test_app();
    let id = registry.add_domain("b.com", "editor", DomainStatus::Online);
    registry.set_anomalies(id, common::fixed_day(), Some(15));

    let res = send(&router, Method::GET, "/go/b.com").await;
    assert_eq!(res.status(), StatusCode::LOCKED);
    assert!(!res.headers().contains_key(header::LOCATION));
    assert_eq!(
        json_body(res).await,
        json!({
            "status": "offline",
            "reason": "Temporarily unpublished or under compliance hold"
        })
    );

    let events = registry.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_type, EventType::AccessBlocked);
    assert_eq!(events[0].metadata["status"], "online");
    assert_eq!(events[0].metadata["anomalies_today"], 15);
    assert_eq!(events[0].metadata["threshold"], 10);
}

#[tokio::test]
async fn test_go_locks_offline_domain_without_metrics() {
    let (router, registry) = common::test_app();
    registry.add_domain("c.com", "viewer", DomainStatus::Offline);

    let res = send(&router, Method::GET, "/go/c.com").await;
    assert_eq!(res.status(), StatusCode::LOCKED);
    assert_eq!(registry.events()[0].metadata["anomalies_today"], 0);
}

#[tokio::test]
async fn test_go_redirects_idn_domain_to_ascii_location() {
    let (router, registry) = common::test_app();
    registry.add_domain("münchen.de", "editor", DomainStatus::Online);

    let res = send(&router, Method::GET, "/go/m%C3%BCnchen.de").await;
    assert_eq!(res.status(), StatusCode::FOUND);
    let location = res.headers()[header::LOCATION].to_str().unwrap();
    assert_eq!(location, "https://xn--mnchen-3ya.de");

    let events = registry.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_type, EventType::AccessAllowed);
}

#[tokio::test]
async fn test_go_redirects_name_with_space_percent_encoded() {
    let (router, registry) = common::test_app();
    registry.add_domain("odd name.com", "editor", DomainStatus::Online);

    let res = send(&router, Method::GET, "/go/odd%20name.com").await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(res.headers()[header::LOCATION], "https://odd%20name.com");
}

#[tokio::test]
async fn test_go_blocked_event_keeps_raw_status() {
    let (router, registry) = common::test_app();
    let id = registry.add_domain("m.com", "editor", DomainStatus::Online);
    registry.set_raw_status(&id, Some("maintenance"));

    let res = send(&router, Method::GET, "/go/m.com").await;
    assert_eq!(res.status(), StatusCode::LOCKED);
    assert_eq!(registry.events()[0].metadata["status"], "maintenance");
}

#[tokio::test]
async fn test_go_unknown_domain_is_404_without_event() {
    let (router, registry) = common::test_app();
    registry.add_domain("a.com", "editor", DomainStatus::Online);

    let res = send(&router, Method::GET, "/go/unknown.com").await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(res).await, json!({"detail": "Domain not found"}));
    assert!(registry.events().is_empty());
}

#[tokio::test]
async fn test_every_gate_call_appends_an_event() {
    let (router, registry) = common::test_app();
    registry.add_domain("a.com", "editor", DomainStatus::Online);

    for _ in 0..3 {
        let res = send(&router, Method::GET, "/go/a.com").await;
        assert_eq!(res.status(), StatusCode::FOUND);
    }
    assert_eq!(registry.events().len(), 3);
}

#[tokio::test]
async fn test_allowed_lists_online_domains() {
    let (router, registry) = common::test_app();
    registry.add_domain("a.com", "editor", DomainStatus::Online);
    registry.add_domain("b.com", "editor", DomainStatus::Offline);

    let res = send(&router, Method::GET, "/allowed").await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        json_body(res).await,
        json!([{"domain_name": "a.com", "role": "editor"}])
    );
}

#[tokio::test]
async fn test_recalc_updates_statuses() {
    let (router, registry) = common::test_app();
    let a = registry.add_domain("a.com", "editor", DomainStatus::Offline);
    let b = registry.add_domain("b.com", "editor", DomainStatus::Online);
    registry.set_anomalies(a, common::fixed_day(), Some(1));
    registry.set_anomalies(b, common::fixed_day(), Some(10));

    let res = send(&router, Method::POST, "/admin/recalc").await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        json_body(res).await,
        json!({"status": "ok", "reason": "Recalculated for all domains"})
    );

    assert_eq!(registry.domain("a.com").unwrap().publication_status(), DomainStatus::Online);
    assert_eq!(registry.domain("b.com").unwrap().publication_status(), DomainStatus::Offline);

    let decisions = registry.decisions();
    assert_eq!(decisions.len(), 2);
    assert_eq!(decisions[1].decision, PublishDecision::Unpublish);

    // The gate now follows the recalculated status.
    let res = send(&router, Method::GET, "/allowed").await;
    assert_eq!(
        json_body(res).await,
        json!([{"domain_name": "a.com", "role": "editor"}])
    );
}

#[tokio::test]
async fn test_recalc_requires_post() {
    let (router, _registry) = common::test_app();
    let res = send(&router, Method::GET, "/admin/recalc").await;
    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_registry_failure_is_bad_gateway() {
    let (router, registry) = common::test_app();
    registry.add_domain("a.com", "editor", DomainStatus::Online);
    registry.fail_operation("anomalies_on");

    let res = send(&router, Method::GET, "/go/a.com").await;
    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(json_body(res).await, json!({"detail": "Registry request failed"}));
    assert!(registry.events().is_empty());

    let res = send(&router, Method::POST, "/admin/recalc").await;
    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    assert!(registry.decisions().is_empty());
}

#[tokio::test]
async fn test_served_over_tcp_with_graceful_shutdown() {
    let registry = std::sync::Arc::new(InMemoryRegistry::new());
    registry.add_domain("a.com", "editor", DomainStatus::Online);
    let service = GatewayService::with_clock(registry.clone(), common::fixed_day);

    let server = HttpServer::new(&GatewayConfig::default(), service);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let handle = tokio::spawn(async move { server.run(listener, server_shutdown).await });

    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .no_proxy()
        .build()
        .unwrap();

    let res = client
        .get(format!("http://{}/go/a.com", addr))
        .send()
        .await
        .expect("gateway unreachable");
    assert_eq!(res.status(), 302);
    assert_eq!(res.headers()["location"], "https://a.com");

    shutdown.trigger();
    let result = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("server did not stop")
        .unwrap();
    assert!(result.is_ok());
}
