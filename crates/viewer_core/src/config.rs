use crate::error::{Result, ViewerError};
use crate::slideshow::{DEFAULT_IMAGES, Slideshow, SlideshowController};
use crate::timer::DEFAULT_ADVANCE_INTERVAL;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Viewer settings, read from a TOML file. Every field has a default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Server root; static images and `dyn/classify` are resolved against it.
    pub base_url: String,
    pub images: Vec<String>,
    pub source_slot: String,
    pub target_slot: String,
    /// Shown in the target slot before the first classification.
    pub initial_target: Option<String>,
    pub advance_interval_ms: u64,
    pub request_timeout_secs: u64,
    /// The classifier usually runs with a self-signed certificate.
    pub accept_invalid_certs: bool,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            base_url: "https://localhost:8081/".to_string(),
            images: DEFAULT_IMAGES.iter().map(|s| s.to_string()).collect(),
            source_slot: "srcimg".to_string(),
            target_slot: "classifiedimg".to_string(),
            initial_target: Some("/output.jpg".to_string()),
            advance_interval_ms: DEFAULT_ADVANCE_INTERVAL.as_millis() as u64,
            request_timeout_secs: 30,
            accept_invalid_certs: true,
        }
    }
}

impl ViewerConfig {
    /// Loads `path`, falling back to defaults when the file does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!("no config at {}; using defaults", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ViewerError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        let cfg: Self = toml::from_str(&raw).map_err(|source| ViewerError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.images.is_empty() {
            return Err(ViewerError::EmptyImageList);
        }
        if self.advance_interval_ms == 0 {
            return Err(ViewerError::ZeroInterval);
        }
        self.base_url()?;
        Ok(())
    }

    pub fn base_url(&self) -> Result<Url> {
        let url = Url::parse(&self.base_url).map_err(|e| ViewerError::InvalidBaseUrl {
            url: self.base_url.clone(),
            reason: e.to_string(),
        })?;
        check_base_url(&url)?;
        Ok(url)
    }

    pub fn advance_interval(&self) -> Duration {
        Duration::from_millis(self.advance_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn slideshow_controller(&self) -> Result<SlideshowController> {
        let show = Slideshow::new(self.images.iter().cloned())?;
        Ok(SlideshowController::new(
            show,
            self.source_slot.clone(),
            self.base_url()?,
        ))
    }
}

/// Base URLs must be http(s) and accept joined paths.
pub fn check_base_url(url: &Url) -> Result<()> {
    let reason = if !matches!(url.scheme(), "http" | "https") {
        format!("unsupported scheme {:?}", url.scheme())
    } else if url.cannot_be_a_base() {
        "cannot be used as a base".to_string()
    } else {
        return Ok(());
    };
    Err(ViewerError::InvalidBaseUrl {
        url: url.to_string(),
        reason,
    })
}
