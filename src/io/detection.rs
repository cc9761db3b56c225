// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Product detection through the Gemini `generateContent` API.
//!
//! A captured frame is sent together with a fixed instruction and a
//! strict response schema. The JSON the model returns is parsed
//! leniently (unusable output becomes an empty "Unknown" scene) and then
//! post-processed locally to attach thumbnail and shopping links.

use super::capture::CapturedFrame;
use crate::config::Config;
use crate::models::detection::{Attributes, BoundingBox, DetectedObject, DetectionResult};
use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::json;
use std::sync::mpsc::Sender;
use std::sync::Arc;

const DETECTION_PROMPT: &str = "\
Act as an advanced product detection system (YOLOv8 + Grounding DINO ensemble).
Analyze this video frame from a movie trailer.
Identify high-value consumer products like clothing, gadgets, furniture, footwear, and accessories.

For each object:
1. Provide a label (e.g., \"Luxury Watch\", \"Leather Jacket\").
2. Confidence score (0.95-0.99).
3. Bounding box coordinates [ymin, xmin, ymax, xmax] normalized 0-1000.
4. Detailed attributes (color, pattern, material).
5. Generate a search query for an online retailer.

Identify the overall scene (e.g., \"High-stakes Casino\", \"Urban Street\").";

/// Errors from a detection call. Unparseable model output is not an
/// error; it degrades to [`DetectionResult::unknown`].
#[derive(Debug, thiserror::Error)]
pub enum DetectError {
    #[error("no API key configured")]
    MissingApiKey,

    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("detection API error ({status}): {body}")]
    Api { status: u16, body: String },
}

/// Anything that can turn a frame into detections.
pub trait Detector: Send + Sync {
    fn detect(&self, frame: &CapturedFrame) -> Result<DetectionResult, DetectError>;
}

/// Builds the outbound links attached to each detection.
#[derive(Debug, Clone)]
pub struct LinkBuilder {
    search_base: reqwest::Url,
}

impl LinkBuilder {
    pub fn new(retailer: &str) -> Result<Self> {
        let search_base = reqwest::Url::parse(&format!("https://{}/search", retailer))
            .with_context(|| format!("invalid retailer host {:?}", retailer))?;
        Ok(Self { search_base })
    }

    /// Storefront search for `label` plus its color, when known.
    pub fn shopping_url(&self, label: &str, color: Option<&str>) -> String {
        let query = format!("{} {}", label.trim(), color.unwrap_or_default().trim());
        let mut url = self.search_base.clone();
        url.query_pairs_mut().append_pair("q", query.trim());
        url.into()
    }

    /// Placeholder image seeded by the object id.
    pub fn thumbnail_url(&self, id: &str) -> String {
        let seed: String = id
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '-' })
            .collect();
        let seed = if seed.is_empty() { "item" } else { seed.as_str() };
        format!("https://picsum.photos/seed/{}/300/300", seed)
    }
}

#[derive(Debug, Deserialize)]
struct RawDetection {
    scene: String,
    objects: Vec<RawObject>,
}

#[derive(Debug, Deserialize)]
struct RawObject {
    id: String,
    label: String,
    confidence: f64,
    #[serde(rename = "box")]
    bbox: BoundingBox,
    #[serde(default)]
    attributes: Option<Attributes>,
    #[serde(default, rename = "shoppingUrlHint")]
    _shopping_url_hint: Option<String>,
}

/// Parse the model's JSON text and attach links.
pub fn parse_detection(text: &str, links: &LinkBuilder) -> DetectionResult {
    if text.trim().is_empty() {
        log::warn!("Detection response was empty");
        return DetectionResult::unknown();
    }

    let raw: RawDetection = match serde_json::from_str(text) {
        Ok(raw) => raw,
        Err(e) => {
            log::warn!("Could not parse detection response: {}", e);
            return DetectionResult::unknown();
        }
    };

    let objects = raw
        .objects
        .into_iter()
        .map(|obj| {
            let attributes = obj.attributes.unwrap_or_default();
            DetectedObject {
                shopping_url: links.shopping_url(&obj.label, attributes.color.as_deref()),
                thumbnail_url: links.thumbnail_url(&obj.id),
                id: obj.id,
                label: obj.label,
                confidence: obj.confidence,
                bbox: obj.bbox,
                attributes,
            }
        })
        .collect();

    DetectionResult {
        scene: raw.scene,
        objects,
    }
}

/// Output schema declared to the model.
pub fn response_schema() -> serde_json::Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "scene": { "type": "STRING" },
            "objects": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "id": { "type": "STRING" },
                        "label": { "type": "STRING" },
                        "confidence": { "type": "NUMBER" },
                        "box": {
                            "type": "ARRAY",
                            "items": { "type": "NUMBER" },
                            "description": "ymin, xmin, ymax, xmax"
                        },
                        "attributes": {
                            "type": "OBJECT",
                            "properties": {
                                "color": { "type": "STRING" },
                                "pattern": { "type": "STRING" },
                                "material": { "type": "STRING" },
                                "type": { "type": "STRING" }
                            }
                        },
                        "shoppingUrlHint": {
                            "type": "STRING",
                            "description": "Search query or link for the product at an online retailer"
                        }
                    },
                    "required": ["id", "label", "confidence", "box", "shoppingUrlHint"]
                }
            }
        },
        "required": ["scene", "objects"]
    })
}

/// Request body for one frame.
pub fn build_request(frame: &CapturedFrame) -> serde_json::Value {
    json!({
        "contents": [{
            "role": "user",
            "parts": [
                { "text": DETECTION_PROMPT },
                {
                    "inline_data": {
                        "mime_type": "image/jpeg",
                        "data": frame.jpeg_base64,
                    }
                }
            ]
        }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": response_schema(),
        }
    })
}

#[derive(Debug, Default, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate.
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

/// Blocking client for the Gemini REST API.
pub struct GeminiClient {
    client: reqwest::blocking::Client,
    url: String,
    api_key: String,
    links: LinkBuilder,
}

impl GeminiClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            client,
            url: format!(
                "{}/models/{}:generateContent",
                config.endpoint.trim_end_matches('/'),
                config.model
            ),
            api_key: config.api_key.clone(),
            links: LinkBuilder::new(&config.retailer)?,
        })
    }
}

impl Detector for GeminiClient {
    fn detect(&self, frame: &CapturedFrame) -> Result<DetectionResult, DetectError> {
        if self.api_key.is_empty() {
            return Err(DetectError::MissingApiKey);
        }

        let response = self
            .client
            .post(&self.url)
            .header("x-goog-api-key", &self.api_key)
            .json(&build_request(frame))
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(DetectError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text()?;
        let envelope: GenerateContentResponse = serde_json::from_str(&body).unwrap_or_else(|e| {
            log::warn!("Unexpected generateContent envelope: {}", e);
            GenerateContentResponse::default()
        });
        Ok(parse_detection(&envelope.text(), &self.links))
    }
}

/// Completion message for a background detection.
#[derive(Debug)]
pub struct ScanCompletion {
    pub generation: u64,
    pub outcome: Result<DetectionResult, DetectError>,
}

/// Run one detection on a background thread.
///
/// The result is sent on `sender` tagged with `generation`; `wake` is
/// called afterwards so the UI can repaint.
pub fn spawn_detection(
    detector: Arc<dyn Detector>,
    generation: u64,
    frame: CapturedFrame,
    sender: Sender<ScanCompletion>,
    wake: impl FnOnce() + Send + 'static,
) {
    std::thread::spawn(move || {
        log::info!(
            "Scanning {}x{} frame (generation {})",
            frame.width,
            frame.height,
            generation
        );
        let outcome = detector.detect(&frame);
        match &outcome {
            Ok(result) => log::info!(
                "Detected {} objects in scene {:?}",
                result.objects.len(),
                result.scene
            ),
            Err(e) => log::error!("Detection failed: {}", e),
        }
        // The receiver is gone if the app moved on; nothing to do then.
        let _ = sender.send(ScanCompletion { generation, outcome });
        wake();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn links() -> LinkBuilder {
        LinkBuilder::new("www.flipkart.com").unwrap()
    }

    #[test]
    fn test_parse_and_post_process() {
        let text = r#"{
            "scene": "Urban Street",
            "objects": [{
                "id": "obj_1",
                "label": "Leather Jacket",
                "confidence": 0.97,
                "box": [200, 100, 600, 500],
                "attributes": { "color": "Black", "material": "Leather" },
                "shoppingUrlHint": "black leather jacket"
            }]
        }"#;

        let result = parse_detection(text, &links());
        assert_eq!(result.scene, "Urban Street");
        assert_eq!(result.objects.len(), 1);

        let jacket = &result.objects[0];
        assert_eq!(jacket.bbox, BoundingBox([200.0, 100.0, 600.0, 500.0]));
        assert_eq!(jacket.attributes.material.as_deref(), Some("Leather"));
        assert_eq!(
            jacket.shopping_url,
            "https://www.flipkart.com/search?q=Leather+Jacket+Black"
        );
        assert_eq!(jacket.thumbnail_url, "https://picsum.photos/seed/obj_1/300/300");
    }

    #[test]
    fn test_shopping_url_without_color() {
        assert_eq!(
            links().shopping_url("Smart Watch", None),
            "https://www.flipkart.com/search?q=Smart+Watch"
        );
        assert_eq!(
            links().shopping_url("Tee & Co", Some("Red")),
            "https://www.flipkart.com/search?q=Tee+%26+Co+Red"
        );
    }

    #[test]
    fn test_thumbnail_seed_is_deterministic_and_url_safe() {
        let links = links();
        assert_eq!(links.thumbnail_url("a/b c"), links.thumbnail_url("a/b c"));
        assert_eq!(links.thumbnail_url("a/b c"), "https://picsum.photos/seed/a-b-c/300/300");
        assert_eq!(links.thumbnail_url(""), "https://picsum.photos/seed/item/300/300");
    }

    #[test]
    fn test_empty_or_malformed_output_falls_back() {
        assert_eq!(parse_detection("", &links()), DetectionResult::unknown());
        assert_eq!(parse_detection("not json", &links()), DetectionResult::unknown());
        assert_eq!(
            parse_detection(r#"{"scene": "Bar", "objects": [{"id": "x"}]}"#, &links()),
            DetectionResult::unknown()
        );
    }

    #[test]
    fn test_empty_object_list_keeps_scene() {
        let result = parse_detection(r#"{"scene": "Desert", "objects": []}"#, &links());
        assert_eq!(result.scene, "Desert");
        assert!(result.objects.is_empty());
    }

    #[test]
    fn test_request_declares_schema_and_image() {
        let frame = CapturedFrame {
            width: 2,
            height: 2,
            jpeg_base64: "AAAA".to_string(),
        };
        let request = build_request(&frame);

        let parts = &request["contents"][0]["parts"];
        assert!(parts[0]["text"].as_str().unwrap().contains("consumer products"));
        assert_eq!(parts[1]["inline_data"]["mime_type"], "image/jpeg");
        assert_eq!(parts[1]["inline_data"]["data"], "AAAA");

        let config = &request["generationConfig"];
        assert_eq!(config["responseMimeType"], "application/json");
        assert_eq!(config["responseSchema"]["required"], json!(["scene", "objects"]));
        assert_eq!(
            config["responseSchema"]["properties"]["objects"]["items"]["required"],
            json!(["id", "label", "confidence", "box", "shoppingUrlHint"])
        );
    }

    #[test]
    fn test_envelope_text_joins_parts() {
        let envelope: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": { "parts": [{ "text": "{\"scene\": " }, { "text": "\"Bar\"}" }] }
            }]
        }))
        .unwrap();
        assert_eq!(envelope.text(), "{\"scene\": \"Bar\"}");
        assert_eq!(GenerateContentResponse::default().text(), "");
    }

    #[test]
    fn test_missing_api_key() {
        let config = Config {
            api_key: String::new(),
            ..Config::default()
        };
        let client = GeminiClient::new(&config).unwrap();
        let frame = CapturedFrame {
            width: 1,
            height: 1,
            jpeg_base64: String::new(),
        };
        assert!(matches!(client.detect(&frame), Err(DetectError::MissingApiKey)));
    }
}
