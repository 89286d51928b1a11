//! Slot-based display model and the local object store backing blob handles.

use image::DynamicImage;
use std::collections::HashMap;
use std::fmt;

/// MIME type assigned to classifier output.
pub const JPEG_MIME: &str = "image/jpeg";

/// Handle to an in-memory [`Blob`], usable wherever a URL is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectUrl(String);

impl ObjectUrl {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What an image slot currently points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// Resolvable URL (usually under the server's static root).
    Url(String),
    /// Local blob created from a response body.
    Object(ObjectUrl),
}

impl ImageSource {
    /// The reference as it would be sent to the classifier.
    pub fn reference(&self) -> &str {
        match self {
            ImageSource::Url(url) => url,
            ImageSource::Object(obj) => obj.as_str(),
        }
    }
}

/// Addressable image slots. Implementors don't need to know about the
/// slideshow or the classifier; callers look slots up by id on every call.
pub trait Display {
    fn image_source(&self, id: &str) -> Option<ImageSource>;
    fn set_image_source(&mut self, id: &str, source: ImageSource);
}

/// `HashMap`-backed [`Display`].
#[derive(Debug, Default, Clone)]
pub struct SlotDisplay {
    slots: HashMap<String, ImageSource>,
    writes: HashMap<String, usize>,
}

impl SlotDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style initial assignment; not counted as a write.
    pub fn with_slot(mut self, id: impl Into<String>, source: ImageSource) -> Self {
        self.slots.insert(id.into(), source);
        self
    }

    /// Number of `set_image_source` calls seen for `id`.
    pub fn write_count(&self, id: &str) -> usize {
        self.writes.get(id).copied().unwrap_or(0)
    }
}

impl Display for SlotDisplay {
    fn image_source(&self, id: &str) -> Option<ImageSource> {
        self.slots.get(id).cloned()
    }

    fn set_image_source(&mut self, id: &str, source: ImageSource) {
        *self.writes.entry(id.to_string()).or_default() += 1;
        self.slots.insert(id.to_string(), source);
    }
}

/// Typed binary payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl Blob {
    pub fn jpeg(bytes: Vec<u8>) -> Self {
        Self {
            mime: JPEG_MIME.to_string(),
            bytes,
        }
    }

    pub fn decode(&self) -> image::ImageResult<DynamicImage> {
        image::load_from_memory(&self.bytes)
    }
}

/// Owns every blob that has a live [`ObjectUrl`].
#[derive(Debug, Default)]
pub struct ObjectStore {
    next_id: u64,
    blobs: HashMap<ObjectUrl, Blob>,
}

impl ObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_object_url(&mut self, blob: Blob) -> ObjectUrl {
        self.next_id += 1;
        let url = ObjectUrl(format!("blob:viewer/{}", self.next_id));
        self.blobs.insert(url.clone(), blob);
        url
    }

    pub fn resolve(&self, url: &ObjectUrl) -> Option<&Blob> {
        self.blobs.get(url)
    }

    /// Releases the blob behind `url`. Returns false if it was already gone.
    pub fn revoke(&mut self, url: &ObjectUrl) -> bool {
        let removed = self.blobs.remove(url).is_some();
        if removed {
            tracing::debug!("revoked {url}");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}
