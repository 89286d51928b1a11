use crate::display::{Display, ImageSource};
use crate::error::{Result, ViewerError};
use url::Url;

/// Images served from the classifier's static root.
pub const DEFAULT_IMAGES: [&str; 3] = [
    "/static/pexels-photo-179124.jpeg",
    "/static/pexels-photo.jpg",
    "/static/stock-photo-nature-nobody-outdoors-wildlife-water-sunlight-cloud-sky-silhouette-e88efff4-f7f6-4660-815e-0702ffc30a54.jpg",
];

/// Fixed ring of image paths with a cursor that wraps in both directions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slideshow {
    images: Vec<String>,
    index: usize,
}

impl Slideshow {
    pub fn new<I, S>(images: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let images: Vec<String> = images.into_iter().map(Into::into).collect();
        if images.is_empty() {
            return Err(ViewerError::EmptyImageList);
        }
        Ok(Self { images, index: 0 })
    }

    pub fn advance(&mut self) -> &str {
        self.index = if self.index == self.images.len() - 1 {
            0
        } else {
            self.index + 1
        };
        self.current()
    }

    pub fn retreat(&mut self) -> &str {
        self.index = if self.index == 0 {
            self.images.len() - 1
        } else {
            self.index - 1
        };
        self.current()
    }

    pub fn current(&self) -> &str {
        &self.images[self.index]
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Always false; construction rejects empty lists.
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn images(&self) -> &[String] {
        &self.images
    }
}

impl Default for Slideshow {
    fn default() -> Self {
        Self {
            images: DEFAULT_IMAGES.iter().map(|s| s.to_string()).collect(),
            index: 0,
        }
    }
}

/// Drives a [`Slideshow`] into one display slot.
#[derive(Debug, Clone)]
pub struct SlideshowController {
    slideshow: Slideshow,
    slot: String,
    base_url: Url,
}

impl SlideshowController {
    pub fn new(slideshow: Slideshow, slot: impl Into<String>, base_url: Url) -> Self {
        Self {
            slideshow,
            slot: slot.into(),
            base_url,
        }
    }

    pub fn slideshow(&self) -> &Slideshow {
        &self.slideshow
    }

    pub fn slot(&self) -> &str {
        &self.slot
    }

    /// Absolute URL for the image currently selected.
    pub fn current_url(&self) -> String {
        resolve_reference(&self.base_url, self.slideshow.current())
    }

    pub fn show_current(&self, display: &mut dyn Display) {
        display.set_image_source(&self.slot, ImageSource::Url(self.current_url()));
    }

    pub fn advance(&mut self, display: &mut dyn Display) {
        self.slideshow.advance();
        tracing::debug!(index = self.slideshow.index(), "slideshow advanced");
        self.show_current(display);
    }

    pub fn retreat(&mut self, display: &mut dyn Display) {
        self.slideshow.retreat();
        tracing::debug!(index = self.slideshow.index(), "slideshow retreated");
        self.show_current(display);
    }
}

/// Joins `reference` onto `base`; absolute references pass through unchanged.
pub fn resolve_reference(base: &Url, reference: &str) -> String {
    match base.join(reference) {
        Ok(url) => url.to_string(),
        Err(e) => {
            tracing::warn!("cannot resolve {reference} against {base}: {e}");
            reference.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::SlotDisplay;
    use rstest::rstest;

    fn abc() -> Slideshow {
        Slideshow::new(["/static/a.jpg", "/static/b.jpg", "/static/c.jpg"]).unwrap()
    }

    fn at(index: usize) -> Slideshow {
        let mut show = abc();
        for _ in 0..index {
            show.advance();
        }
        show
    }

    #[test]
    fn empty_list_is_rejected() {
        let err = Slideshow::new(Vec::<String>::new()).unwrap_err();
        assert!(matches!(err, ViewerError::EmptyImageList));
    }

    #[test]
    fn default_uses_three_static_images() {
        let show = Slideshow::default();
        assert_eq!(show.len(), 3);
        assert_eq!(show.index(), 0);
        assert_eq!(show.current(), DEFAULT_IMAGES[0]);
    }

    #[rstest]
    #[case(0, 1)]
    #[case(1, 2)]
    #[case(2, 0)]
    fn advance_wraps_forward(#[case] from: usize, #[case] to: usize) {
        let mut show = at(from);
        assert_eq!(show.index(), from);
        show.advance();
        assert_eq!(show.index(), to);
    }

    #[rstest]
    #[case(0, 2)]
    #[case(1, 0)]
    #[case(2, 1)]
    fn retreat_wraps_backward(#[case] from: usize, #[case] to: usize) {
        let mut show = at(from);
        show.retreat();
        assert_eq!(show.index(), to);
    }

    #[rstest]
    fn advance_then_retreat_returns_to_start(#[values(0, 1, 2)] from: usize) {
        let mut show = at(from);
        show.advance();
        show.retreat();
        assert_eq!(show.index(), from);
        show.retreat();
        show.advance();
        assert_eq!(show.index(), from);
    }

    #[test]
    fn repeated_advance_visits_every_image_once_per_cycle() {
        let mut show = abc();
        let mut seen = vec![show.current().to_string()];
        for _ in 0..2 {
            seen.push(show.advance().to_string());
        }
        assert_eq!(seen, show.images());
        assert_eq!(show.advance(), "/static/a.jpg");
    }

    #[test]
    fn single_image_ring_stays_put() {
        let mut show = Slideshow::new(["/static/only.jpg"]).unwrap();
        assert_eq!(show.advance(), "/static/only.jpg");
        assert_eq!(show.retreat(), "/static/only.jpg");
        assert_eq!(show.index(), 0);
    }

    #[test]
    fn controller_writes_resolved_url_into_slot() {
        let base = Url::parse("https://example.test:8081/").unwrap();
        let mut controller = SlideshowController::new(abc(), "srcimg", base);
        let mut display = SlotDisplay::new();

        controller.advance(&mut display);
        assert_eq!(
            display.image_source("srcimg"),
            Some(ImageSource::Url("https://example.test:8081/static/b.jpg".into()))
        );
        controller.advance(&mut display);
        controller.advance(&mut display);
        assert_eq!(
            display.image_source("srcimg"),
            Some(ImageSource::Url("https://example.test:8081/static/a.jpg".into()))
        );
        controller.retreat(&mut display);
        assert_eq!(controller.slideshow().index(), 2);
        assert_eq!(display.write_count("srcimg"), 4);
    }

    #[test]
    fn absolute_references_are_not_rebased() {
        let base = Url::parse("https://example.test/").unwrap();
        assert_eq!(
            resolve_reference(&base, "http://other.test/x.jpg"),
            "http://other.test/x.jpg"
        );
    }
}
