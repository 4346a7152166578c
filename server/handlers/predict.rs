use std::io::{Cursor, Read};

use serde::Deserialize;
use serde_json::{json, Value};
use tiny_http::{Request, Response};
use tracing::{error, warn};

use ferrite_digits::{mock_predict, FeatureVector, Prediction, RasterFrame, RecognizeError};

use crate::routes::json_response;
use crate::state::ServerState;

/// Upper bound on an uploaded image body.
const MAX_IMAGE_BYTES: u64 = 8 * 1024 * 1024;

const INVALID_IMAGE_DATA: &str = "Invalid image data. Expected float32 array of 784 values.";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Everything a prediction route can answer with besides success.
#[derive(Debug, PartialEq)]
pub enum ApiError {
    /// Body was unreadable, too large, not JSON, or `imageData` was missing or not a number array.
    InvalidImageData,
    Recognize(RecognizeError),
}

impl From<RecognizeError> for ApiError {
    fn from(e: RecognizeError) -> Self {
        ApiError::Recognize(e)
    }
}

/// Status code and JSON body for an error.
pub fn error_body(err: &ApiError) -> (u16, Value) {
    match err {
        ApiError::InvalidImageData => (
            400,
            json!({ "error": INVALID_IMAGE_DATA, "kind": "invalid_image_data" }),
        ),
        ApiError::Recognize(e @ RecognizeError::InvalidInputShape { actual, .. }) => (
            400,
            json!({ "error": format!("Expected 784 values (28×28), got {}", actual), "kind": e.kind() }),
        ),
        ApiError::Recognize(e @ RecognizeError::InvalidRaster(_)) => (
            400,
            json!({ "error": "Invalid image", "details": e.to_string(), "kind": e.kind() }),
        ),
        ApiError::Recognize(e) => {
            let status = match e {
                RecognizeError::ModelUnavailable(_) => 503,
                _ => 500,
            };
            (status, json!({ "error": "Prediction failed", "details": e.to_string(), "kind": e.kind() }))
        }
    }
}

fn respond(result: Result<Prediction, ApiError>, route: &str, state: &ServerState) -> Response<Cursor<Vec<u8>>> {
    match result {
        Ok(prediction) => json_response(200, &json!(prediction), state.allow_origin()),
        Err(err) => {
            let (status, body) = error_body(&err);
            if status >= 500 {
                error!(route, status, error = ?err, "prediction error");
            } else {
                warn!(route, status, error = ?err, "rejected prediction request");
            }
            json_response(status, &body, state.allow_origin())
        }
    }
}

// ---------------------------------------------------------------------------
// Body parsing
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct PredictBody {
    #[serde(rename = "imageData")]
    image_data: Option<Value>,
}

/// Extracts `imageData` as floats. Only the type is checked here; the
/// length is validated by the pipeline so both routes report it the same way.
pub fn parse_image_data(body: &[u8]) -> Result<Vec<f32>, ApiError> {
    let parsed: PredictBody = serde_json::from_slice(body).map_err(|_| ApiError::InvalidImageData)?;
    match parsed.image_data {
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| v.as_f64().map(|f| f as f32).ok_or(ApiError::InvalidImageData))
            .collect(),
        _ => Err(ApiError::InvalidImageData),
    }
}

/// Reads at most `limit` bytes; anything longer is refused rather than truncated.
fn read_limited<R: Read>(reader: R, limit: u64) -> Result<Vec<u8>, String> {
    let mut body = Vec::new();
    reader
        .take(limit + 1)
        .read_to_end(&mut body)
        .map_err(|e| format!("could not read request body: {}", e))?;
    if body.len() as u64 > limit {
        return Err(format!("body exceeds {} bytes", limit));
    }
    Ok(body)
}

/// Body of the JSON routes. A body that cannot be read is reported the same
/// way as one that does not parse.
fn read_image_data<R: Read>(reader: R, limit: u64) -> Result<Vec<f32>, ApiError> {
    let body = read_limited(reader, limit).map_err(|e| {
        warn!(error = %e, "unreadable prediction body");
        ApiError::InvalidImageData
    })?;
    parse_image_data(&body)
}

// ---------------------------------------------------------------------------
// POST /api/predict
// ---------------------------------------------------------------------------

pub fn handle_predict(request: &mut Request, state: &ServerState) -> Response<Cursor<Vec<u8>>> {
    let result = read_image_data(request.as_reader(), MAX_IMAGE_BYTES)
        .and_then(|values| {
            // Shape is checked before the session is touched.
            let features = FeatureVector::from_intensities(&values, &state.config.normalization)?;
            let recognizer = state.recognizer()?;
            Ok(recognizer.predict_features(&features)?)
        });
    respond(result, "/api/predict", state)
}

// ---------------------------------------------------------------------------
// POST /api/predict-test
// ---------------------------------------------------------------------------

pub fn handle_predict_test(request: &mut Request, state: &ServerState) -> Response<Cursor<Vec<u8>>> {
    let result = read_image_data(request.as_reader(), MAX_IMAGE_BYTES)
        .and_then(|values| Ok(mock_predict(&values)?));
    respond(result, "/api/predict-test", state)
}

// ---------------------------------------------------------------------------
// POST /api/predict-image
// ---------------------------------------------------------------------------

pub fn handle_predict_image(request: &mut Request, state: &ServerState) -> Response<Cursor<Vec<u8>>> {
    let result = read_limited(request.as_reader(), MAX_IMAGE_BYTES)
        .map_err(|e| ApiError::from(RecognizeError::InvalidRaster(e)))
        .and_then(|body| {
            if body.is_empty() {
                return Err(RecognizeError::InvalidRaster("no image was uploaded".into()).into());
            }
            let frame = RasterFrame::decode(&body)?;
            let recognizer = state.recognizer()?;
            Ok(recognizer.predict_raster(&frame)?)
        });
    respond(result, "/api/predict-image", state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_number_arrays() {
        let values = parse_image_data(br#"{"imageData":[0, 0.5, 1]}"#).unwrap();
        assert_eq!(values, vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn rejects_missing_or_mistyped_image_data() {
        let bodies: [&[u8]; 5] = [
            br#"{}"#,
            br#"{"imageData":"abc"}"#,
            br#"{"imageData":[0.1,"x"]}"#,
            br#"{"imageData":null}"#,
            b"not json",
        ];
        for body in bodies {
            assert_eq!(parse_image_data(body), Err(ApiError::InvalidImageData));
        }
    }

    #[test]
    fn oversized_json_body_is_invalid_image_data() {
        let body = br#"{"imageData":[0.5, 0.5, 0.5]}"#;
        assert_eq!(read_image_data(&body[..], 8), Err(ApiError::InvalidImageData));
        assert_eq!(read_image_data(&body[..], body.len() as u64), Ok(vec![0.5, 0.5, 0.5]));
    }

    #[test]
    fn unreadable_json_body_is_invalid_image_data() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _: &mut [u8]) -> std::io::Result<usize> {
                Err(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset"))
            }
        }
        assert_eq!(read_image_data(Broken, MAX_IMAGE_BYTES), Err(ApiError::InvalidImageData));
    }

    #[test]
    fn body_limit_is_exact() {
        assert_eq!(read_limited(&b"abcd"[..], 4).unwrap(), b"abcd");
        assert!(read_limited(&b"abcde"[..], 4).unwrap_err().contains("exceeds 4 bytes"));
    }

    #[test]
    fn wrong_length_names_the_received_count() {
        let err = ApiError::Recognize(RecognizeError::InvalidInputShape { expected: 784, actual: 783 });
        let (status, body) = error_body(&err);
        assert_eq!(status, 400);
        assert_eq!(body["error"], "Expected 784 values (28×28), got 783");
        assert_eq!(body["kind"], "invalid_input_shape");
    }

    #[test]
    fn model_errors_are_server_side() {
        let (status, body) = error_body(&ApiError::Recognize(RecognizeError::ModelUnavailable("gone".into())));
        assert_eq!(status, 503);
        assert_eq!(body["error"], "Prediction failed");
        assert_eq!(body["details"], "model unavailable: gone");

        let (status, _) = error_body(&ApiError::Recognize(RecognizeError::InferenceFailure("nan".into())));
        assert_eq!(status, 500);
    }

    #[test]
    fn invalid_image_data_message() {
        let (status, body) = error_body(&ApiError::InvalidImageData);
        assert_eq!(status, 400);
        assert_eq!(body["error"], INVALID_IMAGE_DATA);
    }
}
