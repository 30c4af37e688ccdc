#![cfg(target_arch = "wasm32")]
#![forbid(unsafe_code)]

use keepsake_web::start;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use wasm_bindgen_test::*;
use web_sys::{Document, Element, Event, HtmlElement};

wasm_bindgen_test_configure!(run_in_browser);

const FIXTURE: &str = r##"
<nav class="navbar"></nav>
<section class="hero"><div class="hero-decoration"></div></section>
<section id="countdown">
  <span id="days"></span><span id="hours"></span>
  <span id="minutes"></span><span id="seconds"></span>
</section>
<section class="horizontal-gallery">
  <div class="horizontal-gallery-container"><div id="gallery-track"></div></div>
</section>
<div id="lightbox">
  <img id="lightbox-img">
  <button class="lightbox-prev"></button>
  <button class="lightbox-next"></button>
  <button class="lightbox-close"></button>
</div>
"##;

fn document() -> Document {
    web_sys::window()
        .and_then(|window| window.document())
        .expect("document")
}

fn mount_fixture() -> Document {
    let document = document();
    document.body().expect("body").set_inner_html(FIXTURE);
    document
}

fn text_of(document: &Document, selector: &str) -> String {
    document
        .query_selector(selector)
        .expect("valid selector")
        .and_then(|element| element.text_content())
        .unwrap_or_default()
}

fn element(document: &Document, selector: &str) -> Element {
    document
        .query_selector(selector)
        .expect("valid selector")
        .unwrap_or_else(|| panic!("{selector} present"))
}

fn click(document: &Document, selector: &str) {
    element(document, selector)
        .dyn_into::<HtmlElement>()
        .expect("html element")
        .click();
}

fn src_of(document: &Document, selector: &str) -> String {
    element(document, selector)
        .get_attribute("src")
        .unwrap_or_default()
}

fn lightbox_active(document: &Document) -> bool {
    element(document, "#lightbox").class_list().contains("active")
}

/// Let queued tasks (the initialization chain) run.
async fn next_task() {
    let promise = js_sys::Promise::new(&mut |resolve, _reject| {
        web_sys::window()
            .expect("window")
            .set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, 20)
            .expect("timeout scheduled");
    });
    JsFuture::from(promise).await.expect("timeout resolves");
}

#[wasm_bindgen_test]
async fn settled_gallery_opens_and_drives_lightbox() {
    let document = mount_fixture();
    let _handle = start(None);

    // Gallery input is ignored until every image has settled.
    click(&document, r#"img[data-index="3"]"#);
    assert!(!lightbox_active(&document));

    let images = document
        .query_selector_all("#gallery-track img[data-index]")
        .expect("valid selector");
    assert_eq!(images.length(), 10);
    for i in 0..images.length() {
        let image = images.get(i).expect("image node");
        let failed = Event::new("error").expect("event");
        image.dispatch_event(&failed).expect("dispatched");
    }
    next_task().await;

    // Track setup ran once the gallery settled.
    let container = element(&document, ".horizontal-gallery-container")
        .dyn_into::<HtmlElement>()
        .expect("html element");
    assert!(
        !container
            .style()
            .get_property_value("position")
            .expect("style readable")
            .is_empty()
    );

    click(&document, r#"img[data-index="3"]"#);
    assert!(lightbox_active(&document));
    assert_eq!(
        src_of(&document, "#lightbox-img"),
        src_of(&document, r#"img[data-index="3"]"#)
    );

    click(&document, ".lightbox-next");
    assert!(lightbox_active(&document));
    assert_eq!(
        src_of(&document, "#lightbox-img"),
        src_of(&document, r#"img[data-index="4"]"#)
    );

    // Clicking the image itself is content, not backdrop.
    click(&document, "#lightbox-img");
    assert!(lightbox_active(&document));

    click(&document, "#lightbox");
    assert!(!lightbox_active(&document));
}

#[wasm_bindgen_test]
fn start_populates_gallery_and_countdown() {
    let document = mount_fixture();
    let mut handle = start(Some(
        r#"{ "countdown": { "target": "2099-01-01T00:00:00+00:00" } }"#.to_string(),
    ));
    assert!(handle.is_running());

    let images = document
        .query_selector_all("#gallery-track img[data-index]")
        .expect("valid selector");
    assert_eq!(images.length(), 10);

    assert!(!text_of(&document, "#days").is_empty());
    assert!(text_of(&document, "#seconds").parse::<u32>().is_ok_and(|s| s < 60));

    handle.shutdown();
    assert!(!handle.is_running());
}

#[wasm_bindgen_test]
fn past_target_renders_expired_message() {
    let document = mount_fixture();
    let _handle = start(Some(
        r#"{ "countdown": { "target": "2001-01-01T00:00:00+00:00" } }"#.to_string(),
    ));
    assert!(
        document
            .query_selector("#countdown .countdown-expired")
            .expect("valid selector")
            .is_some()
    );
}

#[wasm_bindgen_test]
fn invalid_config_falls_back_to_defaults() {
    let document = mount_fixture();
    let handle = start(Some("{ not json".to_string()));
    assert!(handle.is_running());
    let images = document
        .query_selector_all("#gallery-track img")
        .expect("valid selector");
    assert_eq!(images.length(), 10);
}

#[wasm_bindgen_test]
fn missing_gallery_does_not_stop_the_page() {
    let document = document();
    document
        .body()
        .expect("body")
        .set_inner_html(r#"<nav class="navbar"></nav>"#);
    let handle = start(None);
    assert!(handle.is_running());
}
