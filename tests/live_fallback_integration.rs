//! ---
//! ems_section: "15-testing-qa-runbook"
//! ems_subsection: "integration-tests"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Live EirGrid fetch and synthetic fallback against a local HTTP server."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, TimeZone, Utc};
use gridmix_common::{EirGridConfig, SourcesConfig};
use gridmix_core::{generate_synthetic_series, FixedClock, RangeSelector, SeriesOrigin};
use gridmix_sources::{
    DataSource, FeedRequest, FetchError, GenerationFeed, GenerationReport, HttpEirGridFeed,
    SourceAdapter,
};
use serde_json::json;

const ROUTE: &str = "/generation/*window";

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 12, 2, 18, 0, 0).unwrap()
}

async fn spawn_server(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

fn adapter_for(addr: SocketAddr, timeout: Duration) -> SourceAdapter {
    let sources = SourcesConfig {
        eirgrid: EirGridConfig {
            base_url: format!("http://{addr}"),
            generation_path: "/generation/".to_owned(),
            timeout,
            ..EirGridConfig::default()
        },
        ..SourcesConfig::default()
    };
    SourceAdapter::new(sources)
        .unwrap()
        .with_clock(Arc::new(FixedClock(now())))
}

async fn eirgrid_report(adapter: &SourceAdapter, range: RangeSelector) -> GenerationReport {
    adapter
        .generate_report(DataSource::EirGrid, range)
        .await
        .expect("EirGrid requests fall back instead of failing")
}

fn assert_synthetic_fallback(report: &GenerationReport, range: RangeSelector) {
    let expected = generate_synthetic_series(range, now());
    assert_eq!(report.series.origin, SeriesOrigin::Fallback);
    assert_eq!(report.series.len(), expected.len());
    assert_eq!(report.series.intensity, expected.intensity);
    assert_eq!(report.series.generation, expected.generation);
}

#[tokio::test]
async fn server_error_falls_back_to_synthetic() {
    let router = Router::new().route(ROUTE, get(|| async { StatusCode::INTERNAL_SERVER_ERROR }));
    let adapter = adapter_for(spawn_server(router).await, Duration::from_secs(5));

    let report = eirgrid_report(&adapter, RangeSelector::Day).await;
    assert_synthetic_fallback(&report, RangeSelector::Day);
    assert_eq!(
        report.fallback_cause,
        Some(FetchError::Status {
            data_source: DataSource::EirGrid,
            status: 500
        })
    );
}

#[tokio::test]
async fn malformed_payloads_fall_back_to_synthetic() {
    let router = Router::new()
        .route("/text/*window", get(|| async { "definitely not json" }))
        .route("/object/*window", get(|| async { Json(json!({"status": "ok"})) }))
        .route("/empty/*window", get(|| async { Json(json!([])) }));
    let addr = spawn_server(router).await;

    for path in ["/text/", "/object/", "/empty/"] {
        let mut sources = SourcesConfig::default();
        sources.eirgrid.base_url = format!("http://{addr}");
        sources.eirgrid.generation_path = path.to_owned();
        let adapter = SourceAdapter::new(sources)
            .unwrap()
            .with_clock(Arc::new(FixedClock(now())));

        let report = eirgrid_report(&adapter, RangeSelector::TwoDays).await;
        assert_synthetic_fallback(&report, RangeSelector::TwoDays);
        assert!(
            matches!(report.fallback_cause, Some(FetchError::MalformedPayload { .. })),
            "{path} should be reported as malformed"
        );
    }
}

#[tokio::test]
async fn valid_payload_becomes_live_series() {
    let seen: Arc<Mutex<Vec<(String, Option<String>)>>> = Arc::default();
    let router = Router::new()
        .route(
            ROUTE,
            get(
                |State(seen): State<Arc<Mutex<Vec<(String, Option<String>)>>>>,
                 Path(window): Path<String>,
                 headers: HeaderMap| async move {
                    let accept = headers
                        .get(header::ACCEPT)
                        .and_then(|value| value.to_str().ok())
                        .map(str::to_owned);
                    seen.lock().unwrap().push((window, accept));
                    Json(json!([
                        {"timestamp": "2024-12-02T17:45:00Z", "wind": 500, "gas": "500", "total": 1000},
                        {"time": "2024-12-02T17:30:00Z", "wind": 1200, "solar": -5, "coal": 0},
                        {"timestamp": "not a time"}
                    ]))
                },
            ),
        )
        .with_state(seen.clone());
    let adapter = adapter_for(spawn_server(router).await, Duration::from_secs(5));

    let report = eirgrid_report(&adapter, RangeSelector::Day).await;
    assert!(report.fallback_cause.is_none());
    let series = report.series;
    assert_eq!(series.origin, SeriesOrigin::Live);
    assert_eq!(series.len(), 3);
    assert!(series.shares_time_axis());

    let stamps: Vec<_> = series.timestamps().collect();
    assert_eq!(stamps[0], Utc.with_ymd_and_hms(2024, 12, 2, 17, 30, 0).unwrap());
    assert_eq!(stamps[2], now());

    // all wind
    assert_eq!(series.intensity[0].grams_co2_per_kwh, 12);
    // 0.5 * 12 + 0.5 * 400
    assert_eq!(series.intensity[1].grams_co2_per_kwh, 206);
    // no generation reported, fallback shares
    assert_eq!(series.intensity[2].grams_co2_per_kwh, 259);

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(
        seen[0].0,
        "2024-12-01T18:00:00.000Z/2024-12-02T18:00:00.000Z"
    );
    assert_eq!(seen[0].1.as_deref(), Some("application/json"));
}

#[tokio::test]
async fn hanging_server_hits_timeout_and_falls_back() {
    let router = Router::new().route(ROUTE, get(|| std::future::pending::<StatusCode>()));
    let timeout = Duration::from_millis(200);
    let adapter = adapter_for(spawn_server(router).await, timeout);

    let started = Instant::now();
    let report = eirgrid_report(&adapter, RangeSelector::Week).await;
    assert!(started.elapsed() < Duration::from_secs(5));
    assert_synthetic_fallback(&report, RangeSelector::Week);
    assert!(report.fallback_cause.expect("timeout recorded").is_timeout());
}

#[tokio::test]
async fn http_feed_enforces_its_own_timeout() {
    let router = Router::new().route(ROUTE, get(|| std::future::pending::<StatusCode>()));
    let addr = spawn_server(router).await;
    let timeout = Duration::from_millis(200);
    let feed = HttpEirGridFeed::new(EirGridConfig {
        base_url: format!("http://{addr}"),
        generation_path: "/generation/".to_owned(),
        timeout,
        ..EirGridConfig::default()
    })
    .unwrap();

    let started = Instant::now();
    let err = feed
        .fetch(&FeedRequest::for_range(RangeSelector::Day, now()))
        .await
        .unwrap_err();
    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(
        err,
        FetchError::Timeout {
            data_source: DataSource::EirGrid,
            after: timeout
        }
    );
}

#[tokio::test]
async fn unreachable_endpoint_falls_back() {
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let adapter = adapter_for(addr, Duration::from_secs(5));

    let report = eirgrid_report(&adapter, RangeSelector::Day).await;
    assert_synthetic_fallback(&report, RangeSelector::Day);
    assert!(matches!(
        report.fallback_cause,
        Some(FetchError::Network { .. } | FetchError::Timeout { .. })
    ));
}

#[tokio::test]
async fn disabled_source_never_contacts_server() {
    let hits = Arc::new(Mutex::new(0usize));
    let router = Router::new()
        .route(
            ROUTE,
            get(|State(hits): State<Arc<Mutex<usize>>>| async move {
                *hits.lock().unwrap() += 1;
                StatusCode::INTERNAL_SERVER_ERROR
            }),
        )
        .with_state(hits.clone());
    let addr = spawn_server(router).await;
    let mut sources = SourcesConfig::default();
    sources.eirgrid.base_url = format!("http://{addr}");
    sources.eirgrid.generation_path = "/generation/".to_owned();
    sources.eirgrid.enabled = false;
    let adapter = SourceAdapter::new(sources).unwrap();

    let err = adapter
        .generate(DataSource::EirGrid, RangeSelector::Day)
        .await
        .unwrap_err();
    assert!(err.is_fatal());
    assert_eq!(*hits.lock().unwrap(), 0);
}
