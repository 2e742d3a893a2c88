#![allow(dead_code)]

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use iris::handlers::AppState;
use iris::models::types::PendingImage;
use iris::services::analyzer::ImageAnalyzer;
use iris::services::mode_selector::ModeSelection;
use iris::services::settings::{AppConfig, GeminiConfig};
use iris::traits::vision_api::{VisionApi, VisionApiError};

pub const TEST_KEY: &str = "test-key";
pub const TEST_MODEL: &str = "gemini-1.5-flash";

type Responder = Box<dyn Fn(&str, &PendingImage) -> Result<String, VisionApiError> + Send + Sync>;

/// Test double for `VisionApi` that records every call.
pub struct StubVisionApi {
    calls: AtomicUsize,
    last_prompt: Mutex<Option<String>>,
    last_image: Mutex<Option<PendingImage>>,
    responder: Responder,
}

impl StubVisionApi {
    pub fn new<F>(responder: F) -> Arc<Self>
    where
        F: Fn(&str, &PendingImage) -> Result<String, VisionApiError> + Send + Sync + 'static,
    {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
            last_image: Mutex::new(None),
            responder: Box::new(responder),
        })
    }

    /// Answers with a fixed description.
    pub fn replying(text: &str) -> Arc<Self> {
        let text = text.to_string();
        Self::new(move |_, _| Ok(text.clone()))
    }

    /// Answers with a description naming the image payload it was given.
    pub fn echoing() -> Arc<Self> {
        Self::new(|_, image| Ok(format!("described {} ({})", image.data, image.mime_type)))
    }

    /// Fails every call with an unstructured message.
    pub fn failing_with(message: &str) -> Arc<Self> {
        let message = message.to_string();
        Self::new(move |_, _| Err(VisionApiError::Other(message.clone())))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().clone()
    }

    pub fn last_image(&self) -> Option<PendingImage> {
        self.last_image.lock().clone()
    }
}

#[async_trait]
impl VisionApi for StubVisionApi {
    async fn describe_image(&self, prompt: &str, image: &PendingImage) -> Result<String, VisionApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_prompt.lock() = Some(prompt.to_string());
        *self.last_image.lock() = Some(image.clone());
        (self.responder)(prompt, image)
    }

    fn model_name(&self) -> &str {
        "stub-model"
    }
}

pub fn live_analyzer(stub: Arc<StubVisionApi>) -> ImageAnalyzer {
    ImageAnalyzer::new(ModeSelection::live(stub, true))
}

pub fn demo_analyzer() -> ImageAnalyzer {
    ImageAnalyzer::new(ModeSelection::mock(false, true))
}

pub fn unconfigured_analyzer() -> ImageAnalyzer {
    ImageAnalyzer::new(ModeSelection::mock(false, false))
}

/// App state with default settings and static pages disabled.
pub fn app_state(analyzer: ImageAnalyzer) -> AppState {
    let mut config = AppConfig::default();
    config.server.static_dir = None;
    AppState {
        analyzer: Arc::new(analyzer),
        config: Arc::new(config),
    }
}

pub fn gemini_config(base_url: &str) -> GeminiConfig {
    GeminiConfig {
        base_url: base_url.to_string(),
        request_timeout_secs: 5,
        ..GeminiConfig::default()
    }
}

pub fn read_mock(name: &str) -> String {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    fs::read_to_string(root.join("tests/resources/mocks").join(name)).unwrap()
}

pub fn generate_content_path(model: &str) -> String {
    format!("/v1beta/models/{}:generateContent", model)
}

pub async fn mount_gemini_generate(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(generate_content_path(TEST_MODEL)))
        .and(header("x-goog-api-key", TEST_KEY))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/json; charset=UTF-8")
                .set_body_string(read_mock("gemini_generate_ok.json")),
        )
        .expect(1)
        .mount(server)
        .await;
}

pub async fn mount_gemini_error(server: &MockServer, status: u16, mock_file: &str) {
    Mock::given(method("POST"))
        .and(path(generate_content_path(TEST_MODEL)))
        .respond_with(
            ResponseTemplate::new(status)
                .insert_header("content-type", "application/json; charset=UTF-8")
                .set_body_string(read_mock(mock_file)),
        )
        .expect(1)
        .mount(server)
        .await;
}

/// Writes `tests/resources/configs/<name>` to a temp file with `{{ base_url }}` filled in.
pub fn render_config(name: &str, base_url: &str) -> tempfile::NamedTempFile {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let tpl = fs::read_to_string(root.join("tests/resources/configs").join(name)).unwrap();
    let rendered = tpl.replace("{{ base_url }}", base_url);
    let mut tf = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    tf.write_all(rendered.as_bytes()).unwrap();
    tf
}

/// Hand-built multipart body with one file field.
pub fn multipart_body(boundary: &str, field: &str, file_name: &str, content_type: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, file_name
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());
    body
}
