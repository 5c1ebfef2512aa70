use std::sync::OnceLock;
use std::time::Duration;

use serde::Deserialize;

use crate::config::Config;
use crate::error::LoadError;
use crate::viewport::PageRect;

/// One extraction region on the page. `element_id` is the stable join key to
/// the text field `"input-" + element_id`; coordinates are document-space
/// points and immutable for a given load. `text` holds the extracted value
/// and may be edited afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundingBox {
    pub element_id: String,
    pub rect: PageRect,
    pub text: String,
}

/// Normalized response of the metadata API for one document.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentMetadata {
    pub storage_path: String,
    pub boxes: Vec<BoundingBox>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMetadata {
    cloud_storage_path: Option<String>,
    #[serde(default)]
    bounding_boxes: Vec<RawBoundingBox>,
}

/// Box records arrive with either `element_id` (newer exports) or `id`.
#[derive(Debug, Deserialize)]
struct RawBoundingBox {
    element_id: Option<String>,
    id: Option<String>,
    #[serde(default)]
    x: f32,
    #[serde(default)]
    y: f32,
    #[serde(default)]
    width: f32,
    #[serde(default)]
    height: f32,
    #[serde(default)]
    text: String,
}

/// Process-wide HTTP agent, initialized at most once however many sessions
/// race to it. Per-request timeouts come from the caller's config.
pub(crate) fn http_agent() -> &'static ureq::Agent {
    static AGENT: OnceLock<ureq::Agent> = OnceLock::new();
    AGENT.get_or_init(|| {
        ureq::AgentBuilder::new()
            .user_agent(concat!("proofview/", env!("CARGO_PKG_VERSION")))
            .build()
    })
}

/// Fetch and normalize metadata for `doc_ref`. Single round trip, no
/// retries; the first failure is surfaced to the caller.
pub fn fetch_metadata(config: &Config, doc_ref: &str) -> Result<DocumentMetadata, LoadError> {
    config.validate()?;

    let url = format!(
        "{}/documents/{}",
        config.api_base.trim_end_matches('/'),
        doc_ref
    );
    log::debug!("Fetching metadata from {}", url);

    let response = http_agent()
        .get(&url)
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .call()
        .map_err(|e| LoadError::Fetch(e.to_string()))?;

    let body = response
        .into_string()
        .map_err(|e| LoadError::Fetch(e.to_string()))?;
    if body.trim().is_empty() {
        return Err(LoadError::Fetch("empty response body".to_string()));
    }

    parse_metadata(&body)
}

/// Parse a raw metadata payload. Split from the network call so payload
/// handling is testable without a socket.
pub fn parse_metadata(body: &str) -> Result<DocumentMetadata, LoadError> {
    let raw: RawMetadata =
        serde_json::from_str(body).map_err(|e| LoadError::Validation(e.to_string()))?;

    let storage_path = match raw.cloud_storage_path {
        Some(path) if !path.trim().is_empty() => path,
        _ => {
            return Err(LoadError::Validation(
                "response has no cloudStoragePath".to_string(),
            ))
        }
    };

    let mut boxes = Vec::with_capacity(raw.bounding_boxes.len());
    for record in raw.bounding_boxes {
        let element_id = match record.element_id.or(record.id) {
            Some(id) => id,
            None => {
                log::warn!("Skipping bounding box without element_id or id");
                continue;
            }
        };
        boxes.push(BoundingBox {
            element_id,
            rect: PageRect::new(record.x, record.y, record.width, record.height),
            text: record.text,
        });
    }

    Ok(DocumentMetadata {
        storage_path,
        boxes,
    })
}
