//! Blocking HTTP client for the generation collaborator.
//!
//! Three opaque operations are consumed: metadata from a point set, an image
//! from a prompt plus guidance sketch, and an edit of an existing image. Any
//! transport or payload problem collapses into a [`GenerateError`]; nothing
//! here retries.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use url::Url;

use crate::sketch::Point;

pub const ENV_API_KEY: &str = "CONSTELLA_API_KEY";
pub const ENV_API_BASE: &str = "CONSTELLA_API_BASE";
const DEFAULT_API_BASE: &str = "https://api.constella.dev/v1/";

/// Name, horoscope, and visual prompt produced for a finished constellation.
/// Immutable once received; replaced wholesale on a new cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstellationMetadata {
    pub name: String,
    pub horoscope: String,
    pub visual_prompt: String,
}

/// Fixed placeholder for callers that prefer degrading over aborting when
/// metadata generation fails.
pub fn fallback_metadata() -> ConstellationMetadata {
    ConstellationMetadata {
        name: "The Unnamed Weave".to_string(),
        horoscope: "The sky kept its counsel tonight. Whatever shape you traced, \
                    it is yours alone — and that is a kind of fortune too."
            .to_string(),
        visual_prompt: "a faint five-star constellation glowing over a dark night sky"
            .to_string(),
    }
}

/// Error during a collaborator call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateError {
    pub message: String,
    pub phase: &'static str,
}

impl std::fmt::Display for GenerateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.phase, self.message)
    }
}

impl std::error::Error for GenerateError {}

/// The narrow contract the orchestrator consumes. Implemented by
/// [`StudioClient`] for production and by stubs in tests.
pub trait Collaborator: Send + Sync {
    fn generate_metadata(
        &self,
        points: &[Point],
        viewport: (f32, f32),
    ) -> Result<ConstellationMetadata, GenerateError>;

    fn generate_image(&self, prompt: &str, sketch_png: &[u8]) -> Result<Vec<u8>, GenerateError>;

    fn edit_image(
        &self,
        current_png: &[u8],
        instruction: &str,
    ) -> Result<Vec<u8>, GenerateError>;
}

/// A point normalized to a 0–100 grid, decoupled from screen resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedPoint {
    pub x: i32,
    pub y: i32,
}

/// Normalize raw canvas points to a 0–100 scale per axis:
/// `round(raw / dimension * 100)`.
pub fn normalize_points(points: &[Point], viewport: (f32, f32)) -> Vec<NormalizedPoint> {
    let (w, h) = viewport;
    points
        .iter()
        .map(|p| NormalizedPoint {
            x: if w > 0.0 { (p.x / w * 100.0).round() as i32 } else { 0 },
            y: if h > 0.0 { (p.y / h * 100.0).round() as i32 } else { 0 },
        })
        .collect()
}

// ─── Request/response bodies ────────────────────────────────────────────────

pub(crate) fn metadata_request_body(points: &[Point], viewport: (f32, f32)) -> Value {
    json!({
        "points": normalize_points(points, viewport),
        "viewport": { "width": 100, "height": 100 },
    })
}

pub(crate) fn image_request_body(prompt: &str, sketch_png: &[u8]) -> Value {
    json!({
        "prompt": prompt,
        "guidance_png": BASE64.encode(sketch_png),
    })
}

pub(crate) fn edit_request_body(current_png: &[u8], instruction: &str) -> Value {
    json!({
        "image_png": BASE64.encode(current_png),
        "instruction": instruction,
    })
}

/// Pull the base64 PNG payload out of an image response.
pub(crate) fn image_from_response(
    body: &Value,
    phase: &'static str,
) -> Result<Vec<u8>, GenerateError> {
    let encoded = body
        .get("image_png")
        .and_then(|v| v.as_str())
        .ok_or_else(|| GenerateError {
            message: "no image payload in response".to_string(),
            phase,
        })?;
    BASE64.decode(encoded).map_err(|e| GenerateError {
        message: format!("invalid image payload: {}", e),
        phase,
    })
}

// ─── HTTP client ────────────────────────────────────────────────────────────

/// Blocking client for the generation studio API. Configured from the
/// environment; the key is checked at call time so a keyless process still
/// starts and fails gracefully per request.
pub struct StudioClient {
    base: Url,
    api_key: String,
}

impl StudioClient {
    /// Read `CONSTELLA_API_KEY` / `CONSTELLA_API_BASE` from the environment.
    pub fn from_env() -> Self {
        let base = std::env::var(ENV_API_BASE).unwrap_or_else(|_| DEFAULT_API_BASE.to_string());
        let base = Url::parse(&base).unwrap_or_else(|e| {
            log::warn!("invalid {}: {} — using default", ENV_API_BASE, e);
            Url::parse(DEFAULT_API_BASE).expect("default API base parses")
        });
        Self {
            base,
            api_key: std::env::var(ENV_API_KEY).unwrap_or_default(),
        }
    }

    pub fn new(base: Url, api_key: String) -> Self {
        Self { base, api_key }
    }

    fn post(&self, path: &str, body: &Value, phase: &'static str) -> Result<Value, GenerateError> {
        if self.api_key.is_empty() {
            return Err(GenerateError {
                message: format!("{} is not set", ENV_API_KEY),
                phase,
            });
        }

        let endpoint = self.base.join(path).map_err(|e| GenerateError {
            message: format!("invalid endpoint: {}", e),
            phase,
        })?;

        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("constella/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .map_err(|e| GenerateError {
                message: format!("client error: {}", e),
                phase,
            })?;

        let response = client
            .post(endpoint)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .map_err(|e| GenerateError {
                message: format!("request failed: {}", e),
                phase,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(GenerateError {
                message: format!("server returned {}", status),
                phase,
            });
        }

        response.json::<Value>().map_err(|e| GenerateError {
            message: format!("invalid response body: {}", e),
            phase,
        })
    }
}

impl Collaborator for StudioClient {
    fn generate_metadata(
        &self,
        points: &[Point],
        viewport: (f32, f32),
    ) -> Result<ConstellationMetadata, GenerateError> {
        let body = metadata_request_body(points, viewport);
        let response = self.post("constellation/metadata", &body, "metadata")?;
        serde_json::from_value(response).map_err(|e| GenerateError {
            message: format!("malformed metadata: {}", e),
            phase: "metadata",
        })
    }

    fn generate_image(&self, prompt: &str, sketch_png: &[u8]) -> Result<Vec<u8>, GenerateError> {
        let body = image_request_body(prompt, sketch_png);
        let response = self.post("constellation/image", &body, "image")?;
        image_from_response(&response, "image")
    }

    fn edit_image(
        &self,
        current_png: &[u8],
        instruction: &str,
    ) -> Result<Vec<u8>, GenerateError> {
        let body = edit_request_body(current_png, instruction);
        let response = self.post("constellation/edit", &body, "edit")?;
        image_from_response(&response, "edit")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_rounds_to_the_hundred_grid() {
        let points = [
            Point { x: 10.0, y: 10.0 },
            Point { x: 799.0, y: 601.0 },
            Point { x: 0.0, y: 0.0 },
        ];
        let normalized = normalize_points(&points, (800.0, 600.0));
        assert_eq!(normalized[0], NormalizedPoint { x: 1, y: 2 });
        assert_eq!(normalized[1], NormalizedPoint { x: 100, y: 100 });
        assert_eq!(normalized[2], NormalizedPoint { x: 0, y: 0 });
    }

    #[test]
    fn zero_viewport_does_not_divide() {
        let normalized = normalize_points(&[Point { x: 5.0, y: 5.0 }], (0.0, 0.0));
        assert_eq!(normalized[0], NormalizedPoint { x: 0, y: 0 });
    }

    #[test]
    fn metadata_body_carries_normalized_points() {
        let body = metadata_request_body(
            &[Point { x: 400.0, y: 300.0 }],
            (800.0, 600.0),
        );
        assert_eq!(body["points"][0]["x"], 50);
        assert_eq!(body["points"][0]["y"], 50);
        assert_eq!(body["viewport"]["width"], 100);
    }

    #[test]
    fn image_body_encodes_the_sketch() {
        let body = image_request_body("a swan of stars", &[1, 2, 3]);
        assert_eq!(body["prompt"], "a swan of stars");
        assert_eq!(
            BASE64.decode(body["guidance_png"].as_str().unwrap()).unwrap(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn missing_image_payload_is_an_error() {
        let err = image_from_response(&json!({ "note": "no image" }), "image").unwrap_err();
        assert_eq!(err.phase, "image");
        assert!(err.message.contains("no image payload"));
    }

    #[test]
    fn image_payload_decodes() {
        let body = json!({ "image_png": BASE64.encode([9u8, 8, 7]) });
        assert_eq!(image_from_response(&body, "image").unwrap(), vec![9, 8, 7]);
    }

    #[test]
    fn metadata_parses_from_response_json() {
        let value = json!({
            "name": "The Silver Loom",
            "horoscope": "Threads converge.",
            "visual_prompt": "five bright stars over water",
        });
        let meta: ConstellationMetadata = serde_json::from_value(value).unwrap();
        assert_eq!(meta.name, "The Silver Loom");
        assert_eq!(meta.visual_prompt, "five bright stars over water");
    }
}
