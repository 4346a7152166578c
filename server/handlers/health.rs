use std::io::Cursor;

use serde_json::json;
use tiny_http::Response;

use crate::routes::json_response;
use crate::state::ServerState;

// ---------------------------------------------------------------------------
// GET /health
// ---------------------------------------------------------------------------

/// Liveness only: never triggers a model load.
pub fn handle_get(state: &ServerState) -> Response<Cursor<Vec<u8>>> {
    json_response(
        200,
        &json!({
            "status": "ok",
            "model_path": state.config.model_path.display().to_string(),
        }),
        state.allow_origin(),
    )
}
