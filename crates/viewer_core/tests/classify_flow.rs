use std::sync::{Arc, Mutex};
use viewer_core::{
    ClassifyState, ClassifyTransport, Classifier, Display, ImageSource, ObjectStore, Slideshow,
    SlideshowController, SlotDisplay, TransportResponse, Url, apply_outcome,
};

/// Echoes a fake JPEG for the first `ok_calls` requests, then answers 500.
struct FlakyServer {
    ok_calls: usize,
    bodies: Mutex<Vec<String>>,
}

impl ClassifyTransport for FlakyServer {
    fn post_form(&self, _url: &Url, body: String) -> Result<TransportResponse, String> {
        let mut bodies = self.bodies.lock().unwrap();
        bodies.push(body);
        if bodies.len() <= self.ok_calls {
            Ok(TransportResponse {
                status: 200,
                body: vec![0xFF, 0xD8, bodies.len() as u8],
            })
        } else {
            Ok(TransportResponse {
                status: 500,
                body: b"boom".to_vec(),
            })
        }
    }
}

#[test]
fn slideshow_then_classify_updates_target_only_on_success() {
    let base = Url::parse("https://example.test/").unwrap();
    let show = Slideshow::new(["/static/a.jpg", "/static/b.jpg", "/static/c.jpg"]).unwrap();
    let mut controller = SlideshowController::new(show, "srcimg", base.clone());
    let server = Arc::new(FlakyServer {
        ok_calls: 1,
        bodies: Mutex::new(Vec::new()),
    });
    let classifier = Classifier::new(&base, server.clone()).unwrap();
    let mut display = SlotDisplay::new()
        .with_slot("classifiedimg", ImageSource::Url("/output.jpg".into()));
    let mut store = ObjectStore::new();

    controller.show_current(&mut display);
    controller.advance(&mut display);
    assert_eq!(
        display.image_source("srcimg"),
        Some(ImageSource::Url("https://example.test/static/b.jpg".into()))
    );

    let state = classifier
        .submit_for_classification(&display, "srcimg", "classifiedimg")
        .unwrap()
        .wait();
    assert_eq!(state, ClassifyState::Succeeded(vec![0xFF, 0xD8, 1]));
    apply_outcome(&mut display, &mut store, "classifiedimg", &state);
    let Some(ImageSource::Object(url)) = display.image_source("classifiedimg") else {
        panic!("expected object url in target");
    };
    assert_eq!(store.resolve(&url).unwrap().mime, "image/jpeg");

    controller.advance(&mut display);
    let state = classifier
        .submit_for_classification(&display, "srcimg", "classifiedimg")
        .unwrap()
        .wait();
    assert!(matches!(state, ClassifyState::Failed(_)));
    apply_outcome(&mut display, &mut store, "classifiedimg", &state);
    assert_eq!(
        display.image_source("classifiedimg"),
        Some(ImageSource::Object(url))
    );

    let bodies = server.bodies.lock().unwrap();
    assert_eq!(
        *bodies,
        vec![
            "filename=https%3A%2F%2Fexample.test%2Fstatic%2Fb.jpg".to_string(),
            "filename=https%3A%2F%2Fexample.test%2Fstatic%2Fc.jpg".to_string(),
        ]
    );
}
