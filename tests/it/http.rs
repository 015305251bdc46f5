use std::sync::Arc;
use std::thread;

use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde_json::{json, Value};

use rusty_parcats::chart::ChartStyle;
use rusty_parcats::data::loader::{load_table, DataSource};
use rusty_parcats::server::DashServer;
use rusty_parcats::state::SessionRegistry;

use crate::helpers::{csv_file, FIVE_CARS};

struct Running {
    base: String,
    shutdown: rusty_parcats::server::ShutdownHandle,
    thread: Option<thread::JoinHandle<()>>,
}

impl Drop for Running {
    fn drop(&mut self) {
        self.shutdown.shutdown();
        if let Some(t) = self.thread.take() {
            let _ = t.join();
        }
    }
}

fn start() -> Running {
    let file = csv_file(FIVE_CARS);
    let style = ChartStyle::default();
    let table = load_table(&DataSource::Path(file.path().to_path_buf()), &style.columns)
        .expect("fixture loads");
    let registry = SessionRegistry::new(Arc::new(table), style, 8);

    let server = DashServer::bind("127.0.0.1:0", registry).expect("bind");
    let addr = server.local_addr().expect("ip listener");
    let shutdown = server.shutdown_handle();
    let thread = thread::spawn(move || server.run().expect("server loop"));

    Running {
        base: format!("http://{addr}"),
        shutdown,
        thread: Some(thread),
    }
}

fn open_session(client: &Client, base: &str) -> String {
    let page = client.get(format!("{base}/")).send().expect("GET /");
    assert_eq!(page.status(), StatusCode::OK);
    let html = page.text().expect("page body");
    let marker = "const SESSION = \"";
    let start = html.find(marker).expect("session id in page") + marker.len();
    html[start..start + 36].to_string()
}

fn post_event(client: &Client, base: &str, session: &str, payload: Value) -> (StatusCode, Value) {
    let resp = client
        .post(format!("{base}/_dash/event?session={session}"))
        .header("Content-Type", "application/json")
        .body(payload.to_string())
        .send()
        .expect("POST event");
    let status = resp.status();
    (status, resp.json().expect("figure json"))
}

#[test]
fn lasso_then_click_over_http() {
    let running = start();
    let client = Client::new();
    let session = open_session(&client, &running.base);

    let (status, fig) = post_event(
        &client,
        &running.base,
        &session,
        json!({"selectedData": {"points": [{"pointIndex": 1}, {"pointIndex": 3}]}}),
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fig["data"][0]["selectedpoints"], json!([1, 3]));
    assert_eq!(fig["data"][1]["line"]["color"], json!([0, 1, 0, 1, 0]));

    let (_, fig) = post_event(
        &client,
        &running.base,
        &session,
        json!({"clickData": {"points": [{"pointNumber": 2}]}}),
    );
    assert_eq!(fig["data"][0]["selectedpoints"], json!([2]));
    assert_eq!(fig["data"][1]["line"]["color"], json!([0, 0, 1, 0, 0]));
}

#[test]
fn invalid_and_malformed_events_keep_state() {
    let running = start();
    let client = Client::new();
    let session = open_session(&client, &running.base);

    post_event(
        &client,
        &running.base,
        &session,
        json!({"clickData": {"points": [{"pointNumber": 4}]}}),
    );

    let (status, fig) = post_event(
        &client,
        &running.base,
        &session,
        json!({"clickData": {"points": [{"pointNumber": 99}]}}),
    );
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(fig["data"][0]["selectedpoints"], json!([4]));

    let (status, fig) = post_event(&client, &running.base, &session, json!({"relayoutData": {}}));
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(fig["data"][1]["line"]["color"], json!([0, 0, 0, 0, 1]));
}

#[test]
fn sessions_are_isolated() {
    let running = start();
    let client = Client::new();
    let a = open_session(&client, &running.base);
    let b = open_session(&client, &running.base);
    assert_ne!(a, b);

    post_event(
        &client,
        &running.base,
        &a,
        json!({"selectedData": {"points": [{"pointIndex": 0}]}}),
    );

    let fig_b: Value = client
        .get(format!("{}/_dash/figure?session={b}", running.base))
        .send()
        .expect("GET figure")
        .json()
        .expect("figure json");
    assert!(fig_b["data"][0]["selectedpoints"].is_null());
}

#[test]
fn health_and_unknown_routes() {
    let running = start();
    let client = Client::new();

    let health = client
        .get(format!("{}/_dash/health", running.base))
        .send()
        .expect("GET health");
    assert_eq!(health.status(), StatusCode::OK);

    let missing = client
        .get(format!("{}/favicon.ico", running.base))
        .send()
        .expect("GET missing");
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[test]
fn unknown_session_is_not_found() {
    let running = start();
    let client = Client::new();

    let resp = client
        .post(format!(
            "{}/_dash/event?session=00000000-0000-4000-8000-000000000000",
            running.base
        ))
        .body(r#"{"clickData": {"points": [{"pointNumber": 0}]}}"#)
        .send()
        .expect("POST event");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
