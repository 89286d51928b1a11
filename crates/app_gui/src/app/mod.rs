mod controls;
mod images;

use anyhow::{Context, Result};
use eframe::{App, Frame, egui};
use images::ImageCache;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver};
use std::time::Duration;
use viewer_core::{
    AutoAdvance, ClassifyState, Classifier, Display, HttpTransport, ImageSource, ObjectStore,
    PendingClassification, SlideshowController, SlotDisplay, ViewerConfig, apply_outcome,
    resolve_reference, start_auto_advance,
};

const IMAGE_WIDTH: f32 = 480.0;

pub(crate) struct UiApp {
    cfg: ViewerConfig,
    display: SlotDisplay,
    store: ObjectStore,
    slideshow: SlideshowController,
    classifier: Classifier,
    pending: Option<PendingClassification>,
    ticks: Receiver<()>,
    _auto_advance: AutoAdvance,
    url_input: String,
    status: String,
    images: ImageCache,
}

impl UiApp {
    pub(crate) fn new(cc: &eframe::CreationContext<'_>, cfg: ViewerConfig) -> Result<Self> {
        let base_url = cfg.base_url()?;
        let transport = HttpTransport::new(cfg.request_timeout(), cfg.accept_invalid_certs)
            .context("HTTP client could not be built")?;
        let images = ImageCache::new(transport.client().clone());
        let classifier = Classifier::new(&base_url, Arc::new(transport))?;
        let slideshow = cfg.slideshow_controller()?;

        let mut display = SlotDisplay::new();
        if let Some(initial) = &cfg.initial_target {
            display = display.with_slot(
                cfg.target_slot.clone(),
                ImageSource::Url(resolve_reference(&base_url, initial)),
            );
        }
        slideshow.show_current(&mut display);

        let (tick_tx, ticks) = mpsc::channel();
        let ctx = cc.egui_ctx.clone();
        let auto_advance = start_auto_advance(cfg.advance_interval(), move || {
            if tick_tx.send(()).is_ok() {
                ctx.request_repaint();
            }
        });
        tracing::info!(
            "viewer ready: {} images from {}, advancing every {:?}",
            slideshow.slideshow().len(),
            base_url,
            cfg.advance_interval()
        );

        Ok(Self {
            cfg,
            display,
            store: ObjectStore::new(),
            slideshow,
            classifier,
            pending: None,
            ticks,
            _auto_advance: auto_advance,
            url_input: String::new(),
            status: String::new(),
            images,
        })
    }

    fn previous(&mut self) {
        self.slideshow.retreat(&mut self.display);
        self.images.clear_failures();
    }

    fn next(&mut self) {
        self.slideshow.advance(&mut self.display);
        self.images.clear_failures();
    }

    fn classify_current(&mut self) {
        let source = self.cfg.source_slot.clone();
        let target = self.cfg.target_slot.clone();
        match self
            .classifier
            .submit_for_classification(&self.display, &source, &target)
        {
            Some(pending) => self.track(pending),
            None => self.status = "Nothing to classify".to_string(),
        }
    }

    fn classify_url(&mut self) {
        let url = self.url_input.trim();
        if url.is_empty() {
            return;
        }
        let pending = self.classifier.submit_url(url, &self.cfg.target_slot);
        self.track(pending);
    }

    fn track(&mut self, pending: PendingClassification) {
        if self.pending.is_some() {
            tracing::debug!("replacing an unfinished classification");
        }
        self.pending = Some(pending);
        self.status = "Classifying...".to_string();
    }

    fn poll_pending(&mut self, ctx: &egui::Context) {
        let Some(pending) = self.pending.as_mut() else {
            return;
        };
        let state = pending.poll();
        if state.is_pending() {
            ctx.request_repaint_after(Duration::from_millis(100));
            return;
        }
        let target = pending.target().to_string();
        self.pending = None;

        if let Some(old) = apply_outcome(&mut self.display, &mut self.store, &target, &state) {
            self.images.forget(old.as_str());
            self.store.revoke(&old);
        }
        self.status = match state {
            ClassifyState::Succeeded(bytes) => format!("Classified ({} bytes)", bytes.len()),
            ClassifyState::Failed(failure) => format!("Classification failed: {failure}"),
            ClassifyState::Pending => String::new(),
        };
    }

    fn drain_ticks(&mut self) {
        while self.ticks.try_recv().is_ok() {
            self.next();
        }
    }

    fn render_slot(&mut self, ui: &mut egui::Ui, ctx: &egui::Context, slot: &str) {
        let Some(source) = self.display.image_source(slot) else {
            ui.label("(empty)");
            return;
        };
        match self.images.texture(ctx, &source, &self.store) {
            Some(tex) => {
                ui.add(egui::Image::new((tex.id(), tex.size_vec2())).max_width(IMAGE_WIDTH));
            }
            None => match self.images.error_for(&source) {
                Some(err) => {
                    ui.label(format!("Could not load image: {err}"));
                }
                None => {
                    ui.spinner();
                }
            },
        }
    }
}

impl App for UiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        self.drain_ticks();
        self.poll_pending(ctx);
        self.images.receive(ctx);

        egui::TopBottomPanel::top("top").show(ctx, |ui| {
            self.render_controls(ui);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let source_slot = self.cfg.source_slot.clone();
            let target_slot = self.cfg.target_slot.clone();
            ui.horizontal_top(|ui| {
                ui.vertical(|ui| {
                    ui.heading("Source");
                    self.render_slot(ui, ctx, &source_slot);
                });
                ui.vertical(|ui| {
                    ui.heading("Classified");
                    self.render_slot(ui, ctx, &target_slot);
                });
            });
        });

        if self.images.is_loading() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}
