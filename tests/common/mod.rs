//! Shared helpers for integration tests.

use lopdf::{dictionary, Object, Stream};
use resume_screener_api::config::Config;
use resume_screener_api::gemini::GeminiClient;
use resume_screener_api::handlers::{self, AppState};
use std::sync::Arc;

pub const TEST_MODEL: &str = "gemini-2.0-flash";

/// Path the Gemini client hits for the configured test model.
pub fn generate_content_path() -> String {
    format!("/v1beta/models/{}:generateContent", TEST_MODEL)
}

/// Creates a test config pointing the Gemini client at `base_url`.
pub fn test_config(base_url: String) -> Config {
    Config {
        gemini_api_key: "test-key".to_string(),
        gemini_base_url: base_url,
        gemini_model: TEST_MODEL.to_string(),
        port: 8000,
        allowed_origins: vec!["http://localhost:3000".to_string()],
        environment: "development".to_string(),
    }
}

/// Creates a Gemini client pointing at `base_url` (typically a mock server).
pub fn test_gemini(base_url: &str) -> GeminiClient {
    GeminiClient::new(
        base_url.to_string(),
        "test-key".to_string(),
        TEST_MODEL.to_string(),
    )
    .expect("build test client")
}

/// Builds the full application router backed by a mock Gemini endpoint.
pub fn test_app(mock_base_url: &str) -> axum::Router {
    let state = Arc::new(AppState {
        config: test_config(mock_base_url.to_string()),
        gemini: test_gemini(mock_base_url),
    });
    handlers::router(state)
}

/// A generateContent reply whose single candidate carries `text`.
pub fn gemini_reply(text: &str) -> serde_json::Value {
    serde_json::json!({
        "candidates": [{
            "content": {
                "parts": [{"text": text}],
                "role": "model"
            },
            "finishReason": "STOP"
        }]
    })
}

/// Builds a one-page PDF containing the given text, using lopdf's document
/// construction so the extractor can round-trip it.
pub fn build_pdf(text: &str) -> Vec<u8> {
    let mut doc = lopdf::Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });
    let content = lopdf::content::Content {
        operations: vec![
            lopdf::content::Operation::new("BT", vec![]),
            lopdf::content::Operation::new("Tf", vec!["F1".into(), 12.into()]),
            lopdf::content::Operation::new("Td", vec![50.into(), 700.into()]),
            lopdf::content::Operation::new("Tj", vec![Object::string_literal(text)]),
            lopdf::content::Operation::new("ET", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(
        dictionary! {},
        content.encode().expect("encode content stream"),
    ));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("serialize PDF");
    bytes
}

pub const MULTIPART_BOUNDARY: &str = "test-boundary-7MA4YWxkTrZu0gW";

/// Hand-builds a multipart/form-data body with an optional file part and an
/// optional text part.
pub fn multipart_body(
    file: Option<(&str, &[u8])>,
    jd_text: Option<&str>,
) -> (String, Vec<u8>) {
    let mut body: Vec<u8> = Vec::new();

    if let Some((filename, bytes)) = file {
        body.extend_from_slice(format!("--{}\r\n", MULTIPART_BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"resume_file\"; filename=\"{}\"\r\n",
                filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/pdf\r\n\r\n");
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }

    if let Some(text) = jd_text {
        body.extend_from_slice(format!("--{}\r\n", MULTIPART_BOUNDARY).as_bytes());
        body.extend_from_slice(b"Content-Disposition: form-data; name=\"jd_text\"\r\n\r\n");
        body.extend_from_slice(text.as_bytes());
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{}--\r\n", MULTIPART_BOUNDARY).as_bytes());

    let content_type = format!("multipart/form-data; boundary={}", MULTIPART_BOUNDARY);
    (content_type, body)
}
