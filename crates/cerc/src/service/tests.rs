//! Tests of the service against real HTTP traffic
//!
//! These tests cover:
//! - Callback authentication and routing
//! - The full circle through the self-test receiver
//! - Both sides of the callback / grace window race
//! - Non-200 responses and shutdown during the grace window
use std::net::{SocketAddr, TcpListener};
use std::sync::Arc;
use std::time::{Duration, Instant};

use actix_web::dev::ServerHandle;
use actix_web::http::StatusCode;
use actix_web::http::header::AUTHORIZATION;
use actix_web::test::{TestRequest, call_service, init_service};
use actix_web::{App, HttpResponse, HttpServer, web};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tokio_util::sync::CancellationToken;

use super::{Cerc, CercRouter};
use crate::error::{ConfigError, StartError};
use crate::options::Options;
use crate::pathway::Pathway;
use crate::report::ProbeResult;
use crate::test_support::RecordingReporter;
use crate::token::Token;

async fn accept() -> HttpResponse {
    HttpResponse::Ok().finish()
}

async fn broken() -> HttpResponse {
    HttpResponse::InternalServerError().finish()
}

fn local_listener() -> (TcpListener, SocketAddr) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    (listener, addr)
}

fn pathway(name: &str, addr: SocketAddr, path: &str, response_timeout: Duration) -> Pathway {
    Pathway::new(name, format!("http://{addr}{path}"), "POST")
        .with_period(Duration::from_millis(100))
        .with_timeouts(Duration::from_secs(2), response_timeout)
}

fn service(addr: SocketAddr, pathways: Vec<Pathway>) -> (Cerc, Arc<RecordingReporter>) {
    let reporter = Arc::new(RecordingReporter::default());
    let options = Options { pathways, address: addr.to_string(), ..Options::default() };
    let cerc = Cerc::new(options, reporter.clone()).unwrap();
    (cerc, reporter)
}

fn serve(router: CercRouter, listener: TcpListener) -> ServerHandle {
    let server = HttpServer::new(move || {
        let router = router.clone();
        App::new()
            .configure(move |cfg| router.configure(cfg))
            .route("/accept", web::to(accept))
            .route("/broken", web::to(broken))
    })
    .workers(1)
    .disable_signals()
    .listen(listener)
    .unwrap()
    .run();

    let handle = server.handle();
    actix_web::rt::spawn(server);
    handle
}

fn basic(user: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{user}:{password}")))
}

async fn call_back(addr: SocketAddr, pathway: &str, token: &str) -> reqwest::StatusCode {
    reqwest::Client::new()
        .post(format!("http://{addr}/callback/{pathway}"))
        .basic_auth("Bearer", Some(token))
        .send()
        .await
        .unwrap()
        .status()
}

#[actix_web::test]
async fn callback_authentication_and_routing() {
    let (_listener, addr) = local_listener();
    let (cerc, reporter) = service(addr, vec![pathway("orders", addr, "/accept", Duration::from_secs(1))]);
    let router = cerc.router();
    let app = init_service(App::new().configure(|cfg| router.configure(cfg))).await;

    let cases = [
        ("/callback/orders", None, StatusCode::UNAUTHORIZED),
        ("/callback/orders", Some(basic("Alice", "x")), StatusCode::FORBIDDEN),
        ("/callback/nope", Some(basic("Bearer", "x")), StatusCode::NOT_FOUND),
        ("/callback/orders", Some(basic("Bearer", "unregistered")), StatusCode::FORBIDDEN),
    ];
    for (uri, auth, expected) in cases {
        let mut req = TestRequest::post().uri(uri);
        if let Some(auth) = auth {
            req = req.insert_header((AUTHORIZATION, auth));
        }
        let resp = call_service(&app, req.to_request()).await;
        assert_eq!(resp.status(), expected, "{uri}");
    }
    assert!(reporter.finished().is_empty());

    cerc.runner("orders").unwrap().register(Token::from("known"));
    let req = TestRequest::get()
        .uri("/callback/orders")
        .insert_header((AUTHORIZATION, basic("Bearer", "known")))
        .to_request();
    assert_eq!(call_service(&app, req).await.status(), StatusCode::OK);

    let reports = reporter.finished();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].result, ProbeResult::Success);
    assert_eq!(reports[0].pathway, "orders");

    // a replay of the same token is stale now
    let req = TestRequest::post()
        .uri("/callback/orders")
        .insert_header((AUTHORIZATION, basic("Bearer", "known")))
        .to_request();
    assert_eq!(call_service(&app, req).await.status(), StatusCode::FORBIDDEN);
    assert_eq!(reporter.finished().len(), 1);
}

#[actix_web::test]
async fn full_circle_through_selftest() {
    let (listener, addr) = local_listener();
    let (cerc, reporter) =
        service(addr, vec![pathway("selftest", addr, "/selftest/positive", Duration::from_secs(2))]);
    let handle = serve(cerc.router(), listener);

    cerc.start();
    cerc.start();
    let reports = reporter.wait_for_reports(2, Duration::from_secs(10)).await;
    cerc.shutdown().await;
    handle.stop(true).await;

    assert!(reports.len() >= 2, "got {reports:?}");
    assert!(reports.iter().all(|r| r.result == ProbeResult::Success), "got {reports:?}");
    assert!(reports.iter().all(|r| r.duration < Duration::from_secs(2)));
    assert!(reporter.started().len() >= reports.len());
    assert_eq!(cerc.runner("selftest").unwrap().pending(), 0);
}

#[actix_web::test]
async fn callback_before_grace_window_ends_is_the_only_report() {
    let (listener, addr) = local_listener();
    let (cerc, reporter) =
        service(addr, vec![pathway("selftest", addr, "/selftest/positive", Duration::from_millis(300))]);
    let handle = serve(cerc.router(), listener);

    let runner = Arc::clone(cerc.runner("selftest").unwrap());
    runner.probe(Token::generate(), CancellationToken::new()).await;
    handle.stop(true).await;

    let reports = reporter.finished();
    assert_eq!(reports.len(), 1, "got {reports:?}");
    assert_eq!(reports[0].result, ProbeResult::Success);
}

#[actix_web::test]
async fn silence_ends_in_response_timeout_and_late_callbacks_are_forbidden() {
    let (listener, addr) = local_listener();
    let (cerc, reporter) = service(addr, vec![pathway("silent", addr, "/accept", Duration::from_millis(300))]);
    let handle = serve(cerc.router(), listener);

    let runner = Arc::clone(cerc.runner("silent").unwrap());
    let started = Instant::now();
    runner.probe(Token::from("late"), CancellationToken::new()).await;
    assert!(started.elapsed() >= Duration::from_millis(300));

    let reports = reporter.finished();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].result, ProbeResult::Failure);
    assert_eq!(reports[0].message, "response timeout");

    assert_eq!(call_back(addr, "silent", "late").await, reqwest::StatusCode::FORBIDDEN);
    assert_eq!(reporter.finished().len(), 1);
    handle.stop(true).await;
}

#[actix_web::test]
async fn delayed_selftest_answer_misses_a_short_window() {
    let (listener, addr) = local_listener();
    let (cerc, reporter) =
        service(addr, vec![pathway("slow", addr, "/selftest/resp-timeout", Duration::from_millis(200))]);
    let handle = serve(cerc.router(), listener);

    let runner = Arc::clone(cerc.runner("slow").unwrap());
    runner.probe(Token::generate(), CancellationToken::new()).await;

    let reports = reporter.finished();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].message, "response timeout");

    // the late answer arrives and is turned away without a second report
    tokio::time::sleep(Duration::from_millis(1200)).await;
    assert_eq!(reporter.finished().len(), 1);
    handle.stop(true).await;
}

#[actix_web::test]
async fn non_200_fails_without_waiting_for_callback() {
    let (listener, addr) = local_listener();
    let (cerc, reporter) = service(addr, vec![pathway("broken", addr, "/broken", Duration::from_secs(5))]);
    let handle = serve(cerc.router(), listener);

    let runner = Arc::clone(cerc.runner("broken").unwrap());
    let started = Instant::now();
    runner.probe(Token::generate(), CancellationToken::new()).await;
    assert!(started.elapsed() < Duration::from_secs(5));
    handle.stop(true).await;

    let reports = reporter.finished();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].result, ProbeResult::Failure);
    assert!(reports[0].message.contains("500"), "{}", reports[0].message);
    assert_eq!(runner.pending(), 0);
}

#[actix_web::test]
async fn shutdown_fails_pending_probes_exactly_once() {
    let (listener, addr) = local_listener();
    let (cerc, reporter) = service(addr, vec![pathway("silent", addr, "/accept", Duration::from_secs(30))]);
    let handle = serve(cerc.router(), listener);

    let runner = Arc::clone(cerc.runner("silent").unwrap());
    let shutdown = CancellationToken::new();
    let attempt = tokio::spawn({
        let shutdown = shutdown.clone();
        async move { runner.probe(Token::from("pending"), shutdown).await }
    });
    tokio::time::sleep(Duration::from_millis(200)).await;
    shutdown.cancel();
    tokio::time::timeout(Duration::from_secs(3), attempt).await.unwrap().unwrap();

    let reports = reporter.finished();
    assert_eq!(reports.len(), 1, "got {reports:?}");
    assert_eq!(reports[0].result, ProbeResult::Failure);
    assert_eq!(reports[0].message, "probe cancelled by shutdown");
    assert_eq!(cerc.runner("silent").unwrap().pending(), 0);

    assert_eq!(call_back(addr, "silent", "pending").await, reqwest::StatusCode::FORBIDDEN);
    assert_eq!(reporter.finished().len(), 1);
    handle.stop(true).await;
}

#[test]
fn invalid_options_do_not_start() {
    let addr: SocketAddr = "127.0.0.1:9".parse().unwrap();
    let pathways = vec![pathway("a", addr, "/", Duration::ZERO), pathway("a", addr, "/", Duration::ZERO)];
    let options = Options { pathways, address: addr.to_string(), ..Options::default() };

    let result = Cerc::new(options, Arc::new(RecordingReporter::default()));
    assert!(matches!(result, Err(StartError::Config(ConfigError::DuplicatePathway(_)))));
}

#[test]
fn new_fills_in_defaults() {
    let addr: SocketAddr = "127.0.0.1:9".parse().unwrap();
    let options = Options {
        pathways: vec![Pathway::new("a", "http://127.0.0.1:9/", "GET")],
        address: addr.to_string(),
        ..Options::default()
    };

    let cerc = Cerc::new(options, Arc::new(RecordingReporter::default())).unwrap();
    let pathway = cerc.runner("a").unwrap().pathway();
    assert_eq!(pathway.period, Duration::from_secs(30));
    assert_eq!(pathway.timeouts.response, Duration::from_secs(15));
    assert!(!cerc.options().response_url_template.is_empty());
}

#[test]
fn unvalidated_pathways_never_get_a_runner() {
    let addr: SocketAddr = "127.0.0.1:9".parse().unwrap();
    let options = Options {
        pathways: vec![Pathway::new("a", "http://127.0.0.1:9/", "FOO")],
        address: addr.to_string(),
        ..Options::default()
    };

    let result = Cerc::new(options, Arc::new(RecordingReporter::default()));
    assert!(matches!(result, Err(StartError::Config(ConfigError::InvalidPathway { .. }))));
}
