//! Texture cache for slot images: URLs are fetched on worker threads, object
//! handles are decoded straight from the store.

use eframe::egui;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use viewer_core::{ImageSource, ObjectStore};

const MAX_TEXTURES: usize = 16;

type Fetched = (String, Result<egui::ColorImage, String>);

pub(crate) struct ImageCache {
    client: reqwest::blocking::Client,
    textures: HashMap<String, egui::TextureHandle>,
    keys: VecDeque<String>,
    loading: HashSet<String>,
    failed: HashMap<String, String>,
    tx: Sender<Fetched>,
    rx: Receiver<Fetched>,
}

impl ImageCache {
    pub(crate) fn new(client: reqwest::blocking::Client) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            client,
            textures: HashMap::new(),
            keys: VecDeque::new(),
            loading: HashSet::new(),
            failed: HashMap::new(),
            tx,
            rx,
        }
    }

    /// Uploads whatever the fetch workers finished since the last frame.
    pub(crate) fn receive(&mut self, ctx: &egui::Context) {
        while let Ok((key, result)) = self.rx.try_recv() {
            self.loading.remove(&key);
            match result {
                Ok(color) => self.insert(ctx, key, color),
                Err(e) => {
                    tracing::warn!("Failed to load {key}: {e}");
                    self.failed.insert(key, e);
                }
            }
        }
    }

    pub(crate) fn is_loading(&self) -> bool {
        !self.loading.is_empty()
    }

    pub(crate) fn error_for(&self, source: &ImageSource) -> Option<&str> {
        self.failed.get(source.reference()).map(String::as_str)
    }

    /// Texture for `source`, or `None` while it is still loading or failed.
    pub(crate) fn texture(
        &mut self,
        ctx: &egui::Context,
        source: &ImageSource,
        store: &ObjectStore,
    ) -> Option<egui::TextureHandle> {
        let key = source.reference().to_string();
        if let Some(tex) = self.textures.get(&key) {
            return Some(tex.clone());
        }
        if self.failed.contains_key(&key) {
            return None;
        }
        match source {
            ImageSource::Url(url) => {
                if self.loading.insert(key.clone()) {
                    self.spawn_fetch(ctx, url.clone());
                }
                None
            }
            ImageSource::Object(obj) => {
                let Some(blob) = store.resolve(obj) else {
                    self.failed.insert(key, "object url revoked".into());
                    return None;
                };
                match blob.decode() {
                    Ok(img) => {
                        self.insert(ctx, key.clone(), to_color_image(&img));
                        self.textures.get(&key).cloned()
                    }
                    Err(e) => {
                        tracing::warn!("Classifier output is not a decodable image: {e}");
                        self.failed.insert(key, e.to_string());
                        None
                    }
                }
            }
        }
    }

    /// Lets failed images be fetched again, e.g. once the server is up.
    pub(crate) fn clear_failures(&mut self) {
        self.failed.clear();
    }

    pub(crate) fn forget(&mut self, key: &str) {
        self.textures.remove(key);
        self.failed.remove(key);
        self.keys.retain(|k| k != key);
    }

    fn insert(&mut self, ctx: &egui::Context, key: String, color: egui::ColorImage) {
        let tex = ctx.load_texture(format!("slot:{key}"), color, egui::TextureOptions::LINEAR);
        self.textures.insert(key.clone(), tex);
        self.keys.push_back(key);
        if self.textures.len() > MAX_TEXTURES
            && let Some(old) = self.keys.pop_front()
        {
            self.textures.remove(&old);
        }
    }

    fn spawn_fetch(&self, ctx: &egui::Context, url: String) {
        let client = self.client.clone();
        let tx = self.tx.clone();
        let ctx = ctx.clone();
        thread::spawn(move || {
            let result = fetch_image(&client, &url);
            if tx.send((url, result)).is_ok() {
                ctx.request_repaint();
            }
        });
    }
}

fn fetch_image(
    client: &reqwest::blocking::Client,
    url: &str,
) -> Result<egui::ColorImage, String> {
    let resp = client.get(url).send().map_err(|e| e.to_string())?;
    if !resp.status().is_success() {
        return Err(format!("server answered {}", resp.status()));
    }
    let bytes = resp.bytes().map_err(|e| e.to_string())?;
    let img = image::load_from_memory(&bytes).map_err(|e| e.to_string())?;
    Ok(to_color_image(&img))
}

fn to_color_image(img: &image::DynamicImage) -> egui::ColorImage {
    let rgba = img.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw())
}
