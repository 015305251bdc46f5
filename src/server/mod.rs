//! HTTP surface.
//!
//! One thread, one request at a time: an interaction is decoded, applied to
//! its session and answered with the rebuilt figure before the next request
//! is read.
//!
//! ## Routes
//!
//! - `GET  /`                           – dashboard page, opens a session
//! - `GET  /_dash/figure?session=<id>`  – current figure JSON
//! - `POST /_dash/event?session=<id>`   – apply an interaction, returns the figure
//! - `GET  /_dash/health`               – readiness probe

pub mod page;
pub mod wire;

use std::io::Read;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tiny_http::{Header, Method, Request, Response, Server};
use uuid::Uuid;

use crate::error::DashError;
use crate::state::SessionRegistry;

/// How long `run` blocks waiting for a request before re-checking shutdown.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Largest request body read; interaction payloads are a few hundred bytes.
const MAX_EVENT_BYTES: u64 = 64 * 1024;

/// Helper to create HTTP headers, returning None if the bytes are invalid
fn create_header(name: &str, value: &str) -> Option<Header> {
    Header::from_bytes(name.as_bytes(), value.as_bytes()).ok()
}

// ---------------------------------------------------------------------------
// Reply: transport-independent response
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
    /// Reason an interaction was ignored, sent as `X-Dash-Error`.
    pub error: Option<String>,
}

impl Reply {
    fn html(body: String) -> Self {
        Self::with_status(200, "text/html; charset=utf-8", body)
    }

    fn json(status: u16, body: String) -> Self {
        Self::with_status(status, "application/json", body)
    }

    fn text(status: u16, body: &str) -> Self {
        Self::with_status(status, "text/plain; charset=utf-8", body.to_string())
    }

    fn with_status(status: u16, content_type: &'static str, body: String) -> Self {
        Self {
            status,
            content_type,
            body,
            error: None,
        }
    }

    fn into_response(self) -> Response<std::io::Cursor<Vec<u8>>> {
        let mut response = Response::from_string(self.body).with_status_code(self.status);
        if let Some(header) = create_header("Content-Type", self.content_type) {
            response = response.with_header(header);
        }
        if let Some(header) = self.error.as_deref().and_then(|e| create_header("X-Dash-Error", e)) {
            response = response.with_header(header);
        }
        response
    }
}

// ---------------------------------------------------------------------------
// Dashboard: routing over the session registry
// ---------------------------------------------------------------------------

pub struct Dashboard {
    registry: SessionRegistry,
}

impl Dashboard {
    pub fn new(registry: SessionRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// Route one request.
    pub fn respond(&mut self, method: &Method, url: &str, body: &str) -> Reply {
        let (path, query) = url.split_once('?').unwrap_or((url, ""));
        match (method, path) {
            (Method::Get, "/") | (Method::Get, "/index.html") => self.open_page(),
            (Method::Get, "/_dash/health") => Reply::text(200, "ok"),
            (Method::Get, "/_dash/figure") => self.current_figure(query),
            (Method::Post, "/_dash/event") => self.apply_event(query, body),
            (_, "/" | "/index.html" | "/_dash/health" | "/_dash/figure" | "/_dash/event") => {
                Reply::text(405, "method not allowed")
            }
            _ => Reply::text(404, "not found"),
        }
    }

    fn open_page(&mut self) -> Reply {
        let (id, session) = self.registry.open();
        match session.figure().to_json() {
            Ok(figure) => Reply::html(page::render_page(&id, &figure)),
            Err(e) => {
                log::error!("Failed to serialize figure: {e}");
                Reply::text(500, "internal error")
            }
        }
    }

    fn current_figure(&self, query: &str) -> Reply {
        let id = match session_param(query) {
            Ok(id) => id,
            Err(reply) => return reply,
        };
        match self.registry.get(&id) {
            Some(session) => figure_reply(200, session.figure()),
            None => Reply::text(404, "unknown session"),
        }
    }

    fn apply_event(&mut self, query: &str, body: &str) -> Reply {
        let id = match session_param(query) {
            Ok(id) => id,
            Err(reply) => return reply,
        };
        let Some(session) = self.registry.get_mut(&id) else {
            return Reply::text(404, "unknown session");
        };

        let outcome = wire::decode_event(body).and_then(|event| {
            log::debug!("Session {id}: {event:?}");
            session.handle(&event).map(|_| ())
        });

        match outcome {
            Ok(()) => figure_reply(200, session.figure()),
            Err(e) => {
                log::warn!("Session {id}: {e}");
                let mut reply = figure_reply(422, session.figure());
                reply.error = Some(e.to_string());
                reply
            }
        }
    }
}

fn figure_reply(status: u16, figure: &crate::chart::FigureSpec) -> Reply {
    match figure.to_json() {
        Ok(json) => Reply::json(status, json),
        Err(e) => {
            log::error!("Failed to serialize figure: {e}");
            Reply::text(500, "internal error")
        }
    }
}

fn session_param(query: &str) -> Result<Uuid, Reply> {
    let raw = query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == "session")
        .map(|(_, v)| v)
        .ok_or_else(|| Reply::text(400, "missing session parameter"))?;
    Uuid::parse_str(raw).map_err(|_| Reply::text(400, "invalid session id"))
}

// ---------------------------------------------------------------------------
// DashServer: the tiny_http loop
// ---------------------------------------------------------------------------

/// Flag that makes [`DashServer::run`] return after the current request.
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandle(Arc<AtomicBool>);

impl ShutdownHandle {
    pub fn shutdown(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_shutdown(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

pub struct DashServer {
    server: Server,
    dashboard: Dashboard,
    shutdown: ShutdownHandle,
}

impl DashServer {
    pub fn bind(addr: &str, registry: SessionRegistry) -> Result<Self, DashError> {
        let server = Server::http(addr).map_err(|e| DashError::Bind {
            addr: addr.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            server,
            dashboard: Dashboard::new(registry),
            shutdown: ShutdownHandle::default(),
        })
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.server.server_addr().to_ip()
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Serve until shut down. A listener failure ends the loop with an error.
    pub fn run(mut self) -> Result<(), DashError> {
        let addr = self
            .local_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|| "<unknown>".to_string());
        log::info!("Dashboard listening on http://{addr}/");

        while !self.shutdown.is_shutdown() {
            match self.server.recv_timeout(POLL_INTERVAL) {
                Ok(Some(request)) => self.handle_request(request),
                Ok(None) => {}
                Err(e) => {
                    log::error!("Listener failed: {e}");
                    return Err(DashError::Listener {
                        addr,
                        reason: e.to_string(),
                    });
                }
            }
        }

        let registry = self.dashboard.registry();
        if !registry.is_empty() {
            log::info!("Dropping {} live session(s)", registry.len());
        }
        log::info!("Dashboard stopped");
        Ok(())
    }

    fn handle_request(&mut self, mut request: Request) {
        let body = match read_body(request.as_reader()) {
            Ok(body) => body,
            Err(reply) => {
                let _ = request.respond(reply.into_response());
                return;
            }
        };

        let method = request.method().clone();
        let url = request.url().to_string();
        let reply = self.dashboard.respond(&method, &url, &body);
        log::debug!("{method} {url} -> {}", reply.status);

        if let Err(e) = request.respond(reply.into_response()) {
            log::warn!("Failed to send response: {e}");
        }
    }
}

/// Read at most [`MAX_EVENT_BYTES`]; larger bodies are refused with 413.
fn read_body<R: Read>(reader: R) -> Result<String, Reply> {
    let mut bytes = Vec::new();
    if let Err(e) = reader.take(MAX_EVENT_BYTES + 1).read_to_end(&mut bytes) {
        log::warn!("Unreadable request body: {e}");
        return Err(Reply::text(400, "unreadable body"));
    }
    if bytes.len() as u64 > MAX_EVENT_BYTES {
        log::warn!("Request body over {MAX_EVENT_BYTES} bytes refused");
        return Err(Reply::text(413, "payload too large"));
    }
    String::from_utf8(bytes).map_err(|_| Reply::text(400, "body is not UTF-8"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::ChartStyle;
    use crate::config::ColumnMapping;
    use crate::data::model::{CellValue, Row, Table};

    fn dashboard(rows: usize) -> Dashboard {
        let rows = (0..rows)
            .map(|i| {
                ColumnMapping::default()
                    .required_columns()
                    .into_iter()
                    .map(|col| (col, CellValue::Integer(i as i64)))
                    .collect::<Row>()
            })
            .collect();
        let table = Arc::new(Table::from_rows(Vec::new(), rows));
        Dashboard::new(SessionRegistry::new(table, ChartStyle::default(), 4))
    }

    fn open_session(dash: &mut Dashboard) -> String {
        let page = dash.respond(&Method::Get, "/", "");
        assert_eq!(page.status, 200);
        let start = page.body.find("const SESSION = \"").unwrap() + "const SESSION = \"".len();
        page.body[start..start + 36].to_string()
    }

    fn json(reply: &Reply) -> serde_json::Value {
        serde_json::from_str(&reply.body).unwrap()
    }

    #[test]
    fn lasso_event_updates_figure() {
        let mut dash = dashboard(5);
        let id = open_session(&mut dash);

        let reply = dash.respond(
            &Method::Post,
            &format!("/_dash/event?session={id}"),
            r#"{"selectedData": {"points": [{"pointIndex": 1}, {"pointIndex": 3}]}}"#,
        );
        assert_eq!(reply.status, 200);
        let fig = json(&reply);
        assert_eq!(fig["data"][0]["selectedpoints"], serde_json::json!([1, 3]));
        assert_eq!(fig["data"][1]["line"]["color"], serde_json::json!([0, 1, 0, 1, 0]));

        let current = dash.respond(&Method::Get, &format!("/_dash/figure?session={id}"), "");
        assert_eq!(json(&current), fig);
    }

    #[test]
    fn rejected_events_return_retained_figure() {
        let mut dash = dashboard(5);
        let id = open_session(&mut dash);
        let url = format!("/_dash/event?session={id}");

        dash.respond(&Method::Post, &url, r#"{"clickData": {"points": [{"pointNumber": 2}]}}"#);

        let out_of_range =
            dash.respond(&Method::Post, &url, r#"{"clickData": {"points": [{"pointNumber": 99}]}}"#);
        assert_eq!(out_of_range.status, 422);
        assert!(out_of_range.error.as_deref().unwrap().contains("99"));
        assert_eq!(json(&out_of_range)["data"][0]["selectedpoints"], serde_json::json!([2]));

        let malformed = dash.respond(&Method::Post, &url, r#"{"hoverData": {}}"#);
        assert_eq!(malformed.status, 422);
        assert_eq!(json(&malformed)["data"][0]["selectedpoints"], serde_json::json!([2]));
    }

    #[test]
    fn unknown_and_missing_sessions() {
        let mut dash = dashboard(2);
        let unknown = dash.respond(
            &Method::Post,
            &format!("/_dash/event?session={}", Uuid::new_v4()),
            r#"{"selectedData": null}"#,
        );
        assert_eq!(unknown.status, 404);
        assert_eq!(dash.respond(&Method::Get, "/_dash/figure", "").status, 400);
        assert_eq!(dash.respond(&Method::Get, "/_dash/figure?session=xyz", "").status, 400);
    }

    #[test]
    fn routing_basics() {
        let mut dash = dashboard(1);
        assert_eq!(dash.respond(&Method::Get, "/_dash/health", "").body, "ok");
        assert_eq!(dash.respond(&Method::Get, "/nope", "").status, 404);
        assert_eq!(dash.respond(&Method::Delete, "/", "").status, 405);
        assert_eq!(dash.registry().len(), 0);
        dash.respond(&Method::Get, "/", "");
        assert_eq!(dash.registry().len(), 1);
    }

    #[test]
    fn oversized_body_is_refused() {
        let huge = std::io::repeat(b' ');
        assert_eq!(read_body(huge).unwrap_err().status, 413);

        let event = r#"{"selectedData": null}"#;
        assert_eq!(read_body(event.as_bytes()).unwrap(), event);
        assert_eq!(read_body(&[0xff, 0xfe][..]).unwrap_err().status, 400);
    }

    #[test]
    fn run_returns_ok_on_shutdown() {
        let server = DashServer::bind("127.0.0.1:0", dashboard(1).registry).unwrap();
        server.shutdown_handle().shutdown();
        assert!(server.run().is_ok());
    }

    #[test]
    fn listener_failure_is_an_error() {
        let err = DashError::Listener {
            addr: "127.0.0.1:80".into(),
            reason: "accept failed".into(),
        };
        assert_eq!(err.to_string(), "listener on 127.0.0.1:80 failed: accept failed");
    }
}
