//! Sends image references to the remote classifier and applies the JPEG it
//! returns to a display slot.

use crate::config::check_base_url;
use crate::display::{Blob, Display, ImageSource, ObjectStore, ObjectUrl};
use crate::error::{Result, ViewerError};
use reqwest::header::CONTENT_TYPE;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::Duration;
use url::Url;

/// Path of the classification endpoint, relative to the server root.
pub const CLASSIFY_ENDPOINT: &str = "dyn/classify";
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Body and destination of one classification call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifyRequest {
    pub endpoint: Url,
    pub filename: String,
}

/// `<base_url>/dyn/classify`; the base must be an http(s) URL that accepts paths.
pub fn classify_endpoint(base_url: &Url) -> Result<Url> {
    check_base_url(base_url)?;
    base_url
        .join(CLASSIFY_ENDPOINT)
        .map_err(|e| ViewerError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })
}

impl ClassifyRequest {
    pub fn new(endpoint: Url, filename: impl Into<String>) -> Self {
        Self {
            endpoint,
            filename: filename.into(),
        }
    }

    /// `filename=<encoded reference>`.
    pub fn form_body(&self) -> String {
        format!("filename={}", urlencoding::encode(&self.filename))
    }
}

/// Raw status and body returned by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Moves a form-encoded POST to the server. Errors are connection-level only;
/// HTTP error statuses come back as a normal [`TransportResponse`].
pub trait ClassifyTransport: Send + Sync {
    fn post_form(&self, url: &Url, body: String) -> Result<TransportResponse, String>;
}

/// Blocking `reqwest` transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration, accept_invalid_certs: bool) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(accept_invalid_certs)
            .build()?;
        Ok(Self::with_client(client))
    }

    /// Reuses an already configured client.
    pub fn with_client(client: reqwest::blocking::Client) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &reqwest::blocking::Client {
        &self.client
    }
}

impl ClassifyTransport for HttpTransport {
    fn post_form(&self, url: &Url, body: String) -> Result<TransportResponse, String> {
        let resp = self
            .client
            .post(url.clone())
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(body)
            .send()
            .map_err(|e| e.to_string())?;
        let status = resp.status().as_u16();
        let body = resp.bytes().map_err(|e| e.to_string())?.to_vec();
        Ok(TransportResponse { status, body })
    }
}

/// Why a classification produced no image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifyFailure {
    /// Server answered with something other than 200.
    Status(u16),
    /// Connection, timeout or body read failed.
    Transport(String),
    /// Worker went away without reporting.
    Disconnected,
}

impl std::fmt::Display for ClassifyFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClassifyFailure::Status(code) => write!(f, "server answered {code}"),
            ClassifyFailure::Transport(msg) => write!(f, "request failed: {msg}"),
            ClassifyFailure::Disconnected => f.write_str("request worker disconnected"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifyState {
    Pending,
    Succeeded(Vec<u8>),
    Failed(ClassifyFailure),
}

impl ClassifyState {
    fn from_response(result: Result<TransportResponse, String>) -> Self {
        match result {
            Ok(TransportResponse { status: 200, body }) => ClassifyState::Succeeded(body),
            Ok(TransportResponse { status, .. }) => {
                ClassifyState::Failed(ClassifyFailure::Status(status))
            }
            Err(msg) => ClassifyState::Failed(ClassifyFailure::Transport(msg)),
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, ClassifyState::Pending)
    }
}

/// In-flight request. Poll it from the UI loop, or `wait` on it.
#[derive(Debug)]
pub struct PendingClassification {
    target: String,
    rx: Receiver<ClassifyState>,
    done: Option<ClassifyState>,
}

impl PendingClassification {
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Non-blocking; once a final state is seen it is returned on every call.
    pub fn poll(&mut self) -> ClassifyState {
        if let Some(done) = &self.done {
            return done.clone();
        }
        let state = match self.rx.try_recv() {
            Ok(state) => state,
            Err(TryRecvError::Empty) => return ClassifyState::Pending,
            Err(TryRecvError::Disconnected) => ClassifyState::Failed(ClassifyFailure::Disconnected),
        };
        self.done = Some(state.clone());
        state
    }

    pub fn wait(mut self) -> ClassifyState {
        if let Some(done) = self.done.take() {
            return done;
        }
        self.rx
            .recv()
            .unwrap_or(ClassifyState::Failed(ClassifyFailure::Disconnected))
    }
}

/// Issues classification requests against one server.
pub struct Classifier {
    endpoint: Url,
    transport: Arc<dyn ClassifyTransport>,
}

impl Classifier {
    pub fn new(base_url: &Url, transport: Arc<dyn ClassifyTransport>) -> Result<Self> {
        Ok(Self {
            endpoint: classify_endpoint(base_url)?,
            transport,
        })
    }

    /// Sends the image shown in `source_id` for classification. Returns `None`
    /// without touching the network when the slot has no image.
    pub fn submit_for_classification(
        &self,
        display: &dyn Display,
        source_id: &str,
        target_id: &str,
    ) -> Option<PendingClassification> {
        let Some(source) = display.image_source(source_id) else {
            tracing::debug!("slot {source_id} has no image; nothing to classify");
            return None;
        };
        Some(self.submit_url(source.reference(), target_id))
    }

    /// Sends an arbitrary image reference for classification.
    pub fn submit_url(&self, reference: &str, target_id: &str) -> PendingClassification {
        let request = ClassifyRequest::new(self.endpoint.clone(), reference);
        tracing::info!("classifying {} via {}", request.filename, request.endpoint);

        let (tx, rx) = mpsc::channel();
        let transport = Arc::clone(&self.transport);
        let spawned = thread::Builder::new()
            .name("classify".into())
            .spawn(move || {
                let state = ClassifyState::from_response(
                    transport.post_form(&request.endpoint, request.form_body()),
                );
                // Receiver may be gone if the caller lost interest.
                let _ = tx.send(state);
            });
        if let Err(e) = spawned {
            tracing::warn!("could not start classify worker: {e}");
        }

        PendingClassification {
            target: target_id.to_string(),
            rx,
            done: None,
        }
    }
}

/// Applies a finished classification to `target_id`. Only success touches the
/// display; the handle it replaces, if any, is returned for the caller to revoke.
pub fn apply_outcome(
    display: &mut dyn Display,
    store: &mut ObjectStore,
    target_id: &str,
    state: &ClassifyState,
) -> Option<ObjectUrl> {
    match state {
        ClassifyState::Succeeded(bytes) => {
            let url = store.create_object_url(Blob::jpeg(bytes.clone()));
            let previous = display.image_source(target_id);
            tracing::info!("classified image ready as {url} ({} bytes)", bytes.len());
            display.set_image_source(target_id, ImageSource::Object(url));
            match previous {
                Some(ImageSource::Object(old)) => Some(old),
                _ => None,
            }
        }
        ClassifyState::Failed(failure) => {
            tracing::warn!("classification for {target_id} failed: {failure}");
            None
        }
        ClassifyState::Pending => None,
    }
}
