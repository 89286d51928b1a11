//! Core of the classification viewer: a wrapping slideshow over the server's
//! static images, and a requester that posts the displayed image to
//! `dyn/classify` and shows the JPEG it returns.

pub mod classify;
pub mod config;
pub mod display;
pub mod error;
pub mod slideshow;
pub mod timer;

pub use classify::{
    CLASSIFY_ENDPOINT, ClassifyFailure, ClassifyRequest, ClassifyState, ClassifyTransport,
    Classifier, FORM_CONTENT_TYPE, HttpTransport, PendingClassification, TransportResponse,
    apply_outcome, classify_endpoint,
};
pub use config::{ViewerConfig, check_base_url};
pub use display::{Blob, Display, ImageSource, JPEG_MIME, ObjectStore, ObjectUrl, SlotDisplay};
pub use error::{Result, ViewerError};
pub use slideshow::{DEFAULT_IMAGES, Slideshow, SlideshowController, resolve_reference};
pub use timer::{AutoAdvance, DEFAULT_ADVANCE_INTERVAL, start_auto_advance};
pub use url::Url;
