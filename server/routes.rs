use std::io::Cursor;
use std::time::Instant;

use tiny_http::{Header, Method, Request, Response, StatusCode};
use tracing::{info, warn};

use crate::state::SharedState;
use crate::handlers;

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

fn header(name: &str, value: &str) -> Option<Header> {
    match Header::from_bytes(name.as_bytes(), value.as_bytes()) {
        Ok(h) => Some(h),
        Err(()) => {
            warn!(name, value, "dropping invalid response header");
            None
        }
    }
}

/// CORS headers attached to every API response, including errors.
fn cors_headers(allow_origin: &str) -> Vec<Header> {
    [
        header("Access-Control-Allow-Origin", allow_origin),
        header("Access-Control-Allow-Methods", "POST, OPTIONS"),
        header("Access-Control-Allow-Headers", "Content-Type"),
    ]
    .into_iter()
    .flatten()
    .collect()
}

pub fn json_response(status: u16, body: &serde_json::Value, allow_origin: &str) -> Response<Cursor<Vec<u8>>> {
    let bytes = body.to_string().into_bytes();
    let len = bytes.len();
    let mut headers = cors_headers(allow_origin);
    headers.extend(header("Content-Type", "application/json"));
    Response::new(StatusCode(status), headers, Cursor::new(bytes), Some(len), None)
}

/// Preflight answer for `OPTIONS /api/*`.
pub fn no_content(allow_origin: &str) -> Response<Cursor<Vec<u8>>> {
    Response::new(StatusCode(204), cors_headers(allow_origin), Cursor::new(Vec::new()), Some(0), None)
}

pub fn not_found(allow_origin: &str) -> Response<Cursor<Vec<u8>>> {
    json_response(404, &serde_json::json!({ "error": "Not Found" }), allow_origin)
}

// ---------------------------------------------------------------------------
// Request dispatcher
// ---------------------------------------------------------------------------

/// Dispatches an incoming request to its handler and sends the response.
///
/// Handlers receive `&mut Request` so they can read the body while the
/// dispatcher keeps ownership for `request.respond(..)`.
pub fn dispatch(mut request: Request, state: SharedState) {
    let started = Instant::now();
    let method = request.method().clone();
    let url    = request.url().to_owned();
    let path   = url.split('?').next().unwrap_or("").to_owned();
    let origin = state.allow_origin().to_owned();

    let response = match (&method, path.as_str()) {
        // ── CORS preflight ───────────────────────────────────────────────
        (Method::Options, p) if p.starts_with("/api/") => no_content(&origin),

        // ── Prediction ───────────────────────────────────────────────────
        (Method::Post, "/api/predict")       => handlers::predict::handle_predict(&mut request, &state),
        (Method::Post, "/api/predict-test")  => handlers::predict::handle_predict_test(&mut request, &state),
        (Method::Post, "/api/predict-image") => handlers::predict::handle_predict_image(&mut request, &state),

        // ── Health ───────────────────────────────────────────────────────
        (Method::Get, "/health") => handlers::health::handle_get(&state),

        // ── 404 ──────────────────────────────────────────────────────────
        _ => not_found(&origin),
    };

    let status = response.status_code().0;
    if let Err(e) = request.respond(response) {
        warn!(%method, %path, error = %e, "failed to send response");
        return;
    }
    info!(
        %method,
        %path,
        status,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "request"
    );
}
