//! `wasm-bindgen` exports and DOM bindings for the page runtime.
//!
//! The shell owns the runtime behind a `RefCell` and borrows it for exactly
//! one dispatch at a time. After every dispatch the pending commands are
//! drained and applied to the document. Every closure registered with the
//! browser holds a `Weak` reference to the shell, so dropping the handle (or
//! calling `shutdown`) releases all listeners.

use std::cell::RefCell;
use std::rc::Rc;

use chrono::Utc;
use gloo::events::{EventListener, EventListenerOptions};
use gloo::render::{AnimationFrame, request_animation_frame};
use gloo::timers::callback::Interval;
use js_sys::Reflect;
use keepsake_core::gesture::GestureInput;
use keepsake_core::lightbox::{LightboxControl, LightboxHit, LightboxKey};
use keepsake_core::{
    ElementRole, EventDisposition, ImageLoadOutcome, LayoutMetricsProvider, PageEvent, PageRuntime,
};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{
    Document, Element, Event, HtmlElement, HtmlImageElement, IntersectionObserver,
    IntersectionObserverEntry, IntersectionObserverInit, KeyboardEvent, ResizeObserver,
    ScrollBehavior, ScrollIntoViewOptions, ScrollLogicalPosition, TouchEvent, Window,
};

use crate::console_log;
use crate::dom_ops::{DomMutation, ElementTarget, HostAction, translate};
use crate::selectors::{SelectorMap, WebConfig};

const LOG_TARGET: &str = "keepsake.web";

/// Report panics on `console.error` before the module aborts.
fn install_panic_hook() {
    use std::sync::Once;
    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        std::panic::set_hook(Box::new(|info| {
            let payload = info.payload();
            let message = payload
                .downcast_ref::<&str>()
                .copied()
                .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
                .unwrap_or("non-string panic payload");
            let location = info
                .location()
                .map(|location| (location.file(), location.line()));
            let line = console_log::panic_line(message, location);
            web_sys::console::error_1(&JsValue::from_str(&line));
        }));
    });
}

/// Drop `value` after the current browser callback has returned.
///
/// Listeners and timers must not be dropped from inside their own callback.
fn drop_later<T: 'static>(value: T) {
    spawn_local(async move { drop(value) });
}

// ---------------------------------------------------------------------------
// Layout metrics over the live document
// ---------------------------------------------------------------------------

struct DomHost {
    window: Window,
    document: Document,
    selectors: SelectorMap,
    sections: Vec<Element>,
}

impl DomHost {
    fn new(window: Window, document: Document, selectors: SelectorMap) -> Self {
        let sections = query_all(&document, &selectors.sections);
        Self {
            window,
            document,
            selectors,
            sections,
        }
    }

    fn query(&self, role: ElementRole) -> Option<Element> {
        match role {
            ElementRole::Section(index) => self.sections.get(index).cloned(),
            other => self
                .selectors
                .selector(other)
                .and_then(|selector| self.document.query_selector(selector).ok().flatten()),
        }
    }

    fn resolve(&self, target: ElementTarget<'_>) -> Option<Element> {
        match target {
            ElementTarget::Selector(selector) => self.document.query_selector(selector).ok().flatten(),
            ElementTarget::Section(index) => self.sections.get(index).cloned(),
        }
    }

    fn touch_capable(&self) -> bool {
        Reflect::has(&self.window, &"ontouchstart".into()).unwrap_or(false)
            || self.window.navigator().max_touch_points() > 0
    }
}

impl LayoutMetricsProvider for DomHost {
    fn viewport_width(&self) -> f64 {
        self.window
            .inner_width()
            .ok()
            .and_then(|width| width.as_f64())
            .unwrap_or(0.0)
    }

    fn scroll_y(&self) -> f64 {
        self.window.scroll_y().unwrap_or(0.0)
    }

    fn element_exists(&self, role: ElementRole) -> bool {
        self.query(role).is_some()
    }

    fn scroll_width(&self, role: ElementRole) -> f64 {
        self.query(role).map_or(0.0, |element| f64::from(element.scroll_width()))
    }

    fn client_width(&self, role: ElementRole) -> f64 {
        self.query(role).map_or(0.0, |element| f64::from(element.client_width()))
    }

    fn offset_top(&self, role: ElementRole) -> f64 {
        self.query(role)
            .and_then(|element| element.dyn_into::<HtmlElement>().ok())
            .map_or(0.0, |element| f64::from(element.offset_top()))
    }

    fn section_count(&self) -> usize {
        self.sections.len()
    }

    fn has_anchor_target(&self, id: &str) -> bool {
        self.document.get_element_by_id(id).is_some()
    }
}

fn query_all(document: &Document, selector: &str) -> Vec<Element> {
    let Ok(nodes) = document.query_selector_all(selector) else {
        return Vec::new();
    };
    (0..nodes.length())
        .filter_map(|i| nodes.get(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

/// Index of the gallery image an event landed on.
fn gallery_index(event: &Event) -> Option<usize> {
    let target = event.target()?.dyn_into::<Element>().ok()?;
    let image = target.closest("img[data-index]").ok().flatten()?;
    image.get_attribute("data-index")?.parse().ok()
}

fn touch_point(event: &TouchEvent, changed: bool) -> (f64, f64) {
    let list = if changed {
        event.changed_touches()
    } else {
        event.touches()
    };
    list.get(0).map_or((f64::NAN, f64::NAN), |touch| {
        (f64::from(touch.client_x()), f64::from(touch.client_y()))
    })
}

// ---------------------------------------------------------------------------
// Shell
// ---------------------------------------------------------------------------

struct Observer<T> {
    observer: T,
    _callback: Closure<dyn FnMut(js_sys::Array)>,
}

struct Shell {
    runtime: RefCell<PageRuntime>,
    host: DomHost,
    listeners: RefCell<Vec<EventListener>>,
    touch_listeners: RefCell<Vec<EventListener>>,
    frame: RefCell<Option<AnimationFrame>>,
    countdown: RefCell<Option<Interval>>,
    resize: RefCell<Option<Observer<ResizeObserver>>>,
    intersection: RefCell<Option<Observer<IntersectionObserver>>>,
}

impl Shell {
    fn new(runtime: PageRuntime, host: DomHost) -> Rc<Self> {
        Rc::new(Self {
            runtime: RefCell::new(runtime),
            host,
            listeners: RefCell::new(Vec::new()),
            touch_listeners: RefCell::new(Vec::new()),
            frame: RefCell::new(None),
            countdown: RefCell::new(None),
            resize: RefCell::new(None),
            intersection: RefCell::new(None),
        })
    }

    /// Route one event and apply whatever it produced.
    fn dispatch(self: &Rc<Self>, event: PageEvent) -> EventDisposition {
        let disposition = self.runtime.borrow_mut().handle(event, &self.host);
        self.flush();
        disposition
    }

    fn flush(self: &Rc<Self>) {
        let commands = self.runtime.borrow_mut().take_commands();
        for command in &commands {
            self.apply(translate(command, &self.host.selectors));
        }
    }

    fn apply(self: &Rc<Self>, action: HostAction<'_>) {
        match action {
            HostAction::Mutate { target, mutation } => {
                let Some(element) = self.host.resolve(target) else {
                    return;
                };
                apply_mutation(&element, mutation);
            }
            HostAction::RequestAnimationFrame => {
                let weak = Rc::downgrade(self);
                let frame = request_animation_frame(move |_timestamp| {
                    if let Some(shell) = weak.upgrade() {
                        shell.dispatch(PageEvent::AnimationFrame);
                    }
                });
                if let Some(previous) = self.frame.borrow_mut().replace(frame) {
                    drop_later(previous);
                }
            }
            HostAction::StopCountdown => {
                if let Some(interval) = self.countdown.borrow_mut().take() {
                    drop_later(interval);
                }
            }
            HostAction::Unobserve(target) => {
                if let (Some(element), Some(observer)) =
                    (self.host.resolve(target), self.intersection.borrow().as_ref())
                {
                    observer.observer.unobserve(&element);
                }
            }
            HostAction::ScrollIntoView { id } => {
                if let Some(element) = self.host.document.get_element_by_id(id) {
                    let options = ScrollIntoViewOptions::new();
                    options.set_behavior(ScrollBehavior::Smooth);
                    options.set_block(ScrollLogicalPosition::Start);
                    element.scroll_into_view_with_scroll_into_view_options(&options);
                }
            }
        }
    }

    fn listen(
        self: &Rc<Self>,
        target: &web_sys::EventTarget,
        event_type: &'static str,
        options: EventListenerOptions,
        handler: impl Fn(&Rc<Self>, &Event) + 'static,
    ) {
        let weak = Rc::downgrade(self);
        let listener = EventListener::new_with_options(target, event_type, options, move |event| {
            if let Some(shell) = weak.upgrade() {
                handler(&shell, event);
            }
        });
        self.listeners.borrow_mut().push(listener);
    }

    // -- Wiring -------------------------------------------------------------

    fn wire_scroll(self: &Rc<Self>) {
        self.listen(
            &self.host.window,
            "scroll",
            EventListenerOptions::default(),
            |shell, _| {
                shell.dispatch(PageEvent::Scroll);
            },
        );
    }

    fn wire_countdown(self: &Rc<Self>) {
        if !self.runtime.borrow().countdown().is_active() {
            return;
        }
        let interval_ms = self.runtime.borrow().config().countdown.interval_ms;
        let weak = Rc::downgrade(self);
        let interval = Interval::new(interval_ms, move || {
            if let Some(shell) = weak.upgrade() {
                shell.dispatch(PageEvent::CountdownTick { now: Utc::now() });
            }
        });
        *self.countdown.borrow_mut() = Some(interval);
    }

    fn wire_fade_in(self: &Rc<Self>) {
        let sections: Vec<Element> = self
            .runtime
            .borrow()
            .observed_sections()
            .iter()
            .filter_map(|role| self.host.query(*role))
            .collect();
        if sections.is_empty() {
            return;
        }

        let weak = Rc::downgrade(self);
        let callback = Closure::<dyn FnMut(js_sys::Array)>::new(move |entries: js_sys::Array| {
            let Some(shell) = weak.upgrade() else {
                return;
            };
            for entry in entries.iter() {
                let entry: IntersectionObserverEntry = entry.unchecked_into();
                let target = entry.target();
                let Some(section) = shell
                    .host
                    .sections
                    .iter()
                    .position(|candidate| candidate.is_same_node(Some(target.as_ref())))
                else {
                    continue;
                };
                shell.dispatch(PageEvent::Intersection {
                    section,
                    intersecting: entry.is_intersecting(),
                });
            }
        });

        let config = self.runtime.borrow().config().fade_in.clone();
        let init = IntersectionObserverInit::new();
        init.set_threshold(&JsValue::from_f64(config.threshold));
        init.set_root_margin(&config.root_margin);
        match IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init) {
            Ok(observer) => {
                for section in &sections {
                    observer.observe(section);
                }
                *self.intersection.borrow_mut() = Some(Observer {
                    observer,
                    _callback: callback,
                });
            }
            Err(err) => {
                tracing::warn!(target: LOG_TARGET, error = ?err, "fade-in observer unavailable");
            }
        }
    }

    fn wire_anchors(self: &Rc<Self>) {
        for link in query_all(&self.host.document, &self.host.selectors.anchor_links) {
            let href_source = link.clone();
            self.listen(
                &link,
                "click",
                EventListenerOptions::enable_prevent_default(),
                move |shell, event| {
                    let href = href_source.get_attribute("href").unwrap_or_default();
                    if shell.dispatch(PageEvent::AnchorClick { href }).prevent_default {
                        event.prevent_default();
                    }
                },
            );
        }
    }

    fn wire_gallery_input(self: &Rc<Self>) {
        let Some(container) = self.host.query(ElementRole::GalleryContainer) else {
            return;
        };

        self.listen(
            &container,
            "click",
            EventListenerOptions::enable_prevent_default(),
            |shell, event| {
                if let Some(index) = gallery_index(event) {
                    if shell.dispatch(PageEvent::Gesture(GestureInput::Click { index })).prevent_default {
                        event.prevent_default();
                    }
                }
            },
        );

        self.listen(
            &container,
            "contextmenu",
            EventListenerOptions::enable_prevent_default(),
            |shell, event| {
                if gallery_index(event).is_some()
                    && shell.dispatch(PageEvent::ContextMenu).prevent_default
                {
                    event.prevent_default();
                }
            },
        );

        if self.host.touch_capable() {
            self.listen(
                &container,
                "touchstart",
                EventListenerOptions::default(),
                |shell, event| {
                    let (Some(index), Some(touch)) = (gallery_index(event), event.dyn_ref::<TouchEvent>())
                    else {
                        return;
                    };
                    let (x, y) = touch_point(touch, false);
                    shell.dispatch(PageEvent::Gesture(GestureInput::TouchStart { index, x, y }));
                    if shell.runtime.borrow().is_tracking_gesture() {
                        shell.attach_touch_tracking();
                    }
                },
            );
        }
    }

    /// Window-level move/end/cancel listeners for one gesture.
    fn attach_touch_tracking(self: &Rc<Self>) {
        let previous = std::mem::take(&mut *self.touch_listeners.borrow_mut());
        if !previous.is_empty() {
            drop_later(previous);
        }

        let window = &self.host.window;
        let mut listeners = Vec::with_capacity(3);
        for (event_type, options) in [
            ("touchmove", EventListenerOptions::default()),
            ("touchend", EventListenerOptions::enable_prevent_default()),
            ("touchcancel", EventListenerOptions::default()),
        ] {
            let weak = Rc::downgrade(self);
            listeners.push(EventListener::new_with_options(
                window,
                event_type,
                options,
                move |event| {
                    let (Some(shell), Some(touch)) = (weak.upgrade(), event.dyn_ref::<TouchEvent>())
                    else {
                        return;
                    };
                    let input = match event_type {
                        "touchmove" => {
                            let (x, y) = touch_point(touch, false);
                            GestureInput::TouchMove { x, y }
                        }
                        "touchend" => {
                            let (x, y) = touch_point(touch, true);
                            GestureInput::TouchEnd { x, y }
                        }
                        _ => GestureInput::TouchCancel,
                    };
                    if shell.dispatch(PageEvent::Gesture(input)).prevent_default {
                        event.prevent_default();
                    }
                    if !shell.runtime.borrow().is_tracking_gesture() {
                        let resolved = std::mem::take(&mut *shell.touch_listeners.borrow_mut());
                        drop_later(resolved);
                    }
                },
            ));
        }
        *self.touch_listeners.borrow_mut() = listeners;
    }

    fn wire_lightbox(self: &Rc<Self>) {
        if let Some(root) = self.host.query(ElementRole::Lightbox) {
            let backdrop = root.clone();
            self.listen(&root, "click", EventListenerOptions::default(), move |shell, event| {
                let on_backdrop = event
                    .target()
                    .and_then(|target| target.dyn_into::<Element>().ok())
                    .is_some_and(|target| target.is_same_node(Some(backdrop.as_ref())));
                let hit = if on_backdrop {
                    LightboxHit::Backdrop
                } else {
                    LightboxHit::Content
                };
                shell.dispatch(PageEvent::LightboxClick(hit));
            });
        }

        for (role, control) in [
            (ElementRole::LightboxPrev, LightboxControl::Prev),
            (ElementRole::LightboxNext, LightboxControl::Next),
            (ElementRole::LightboxClose, LightboxControl::Close),
        ] {
            if let Some(button) = self.host.query(role) {
                self.listen(&button, "click", EventListenerOptions::default(), move |shell, event| {
                    event.stop_propagation();
                    shell.dispatch(PageEvent::LightboxControl(control));
                });
            }
        }

        self.listen(
            &self.host.document,
            "keydown",
            EventListenerOptions::default(),
            |shell, event| {
                if let Some(key) = event.dyn_ref::<KeyboardEvent>() {
                    shell.dispatch(PageEvent::Key(LightboxKey::from_dom_key(&key.key())));
                }
            },
        );
    }

    /// Report every rendered gallery image to the load latch.
    fn watch_gallery_images(self: &Rc<Self>) {
        let images = query_all(&self.host.document, &self.host.selectors.gallery_images());
        for (position, element) in images.into_iter().enumerate() {
            let index = element
                .get_attribute("data-index")
                .and_then(|value| value.parse().ok())
                .unwrap_or(position);
            let Ok(image) = element.dyn_into::<HtmlImageElement>() else {
                continue;
            };
            if image.complete() {
                self.dispatch(PageEvent::ImageSettled {
                    index,
                    outcome: ImageLoadOutcome::AlreadyComplete,
                });
                continue;
            }
            for (event_type, outcome) in [
                ("load", ImageLoadOutcome::Loaded),
                ("error", ImageLoadOutcome::Errored),
            ] {
                self.listen(&image, event_type, EventListenerOptions::default(), move |shell, _| {
                    shell.dispatch(PageEvent::ImageSettled { index, outcome });
                });
            }
        }
    }

    fn wire_track_resize(self: &Rc<Self>) {
        let Some(container) = self.host.query(ElementRole::TrackContainer) else {
            return;
        };
        let weak = Rc::downgrade(self);
        let callback = Closure::<dyn FnMut(js_sys::Array)>::new(move |_entries: js_sys::Array| {
            if let Some(shell) = weak.upgrade() {
                shell.dispatch(PageEvent::ContainerResized);
            }
        });
        match ResizeObserver::new(callback.as_ref().unchecked_ref()) {
            Ok(observer) => {
                observer.observe(&container);
                *self.resize.borrow_mut() = Some(Observer {
                    observer,
                    _callback: callback,
                });
            }
            Err(err) => {
                tracing::warn!(target: LOG_TARGET, error = ?err, "resize observer unavailable");
            }
        }
    }

    /// Await the gallery, then bind the lightbox and the track.
    fn run_initialization(self: &Rc<Self>, ready: keepsake_core::GalleryReady) {
        let shell = Rc::clone(self);
        spawn_local(async move {
            let result = PageRuntime::initialize(&shell.runtime, ready, &shell.host).await;
            shell.flush();
            match result {
                Ok(()) => shell.wire_track_resize(),
                Err(err) if err.is_degradation() => {
                    tracing::debug!(target: LOG_TARGET, error = %err, "gallery setup degraded");
                }
                Err(err) => {
                    tracing::error!(target: LOG_TARGET, error = %err, "gallery setup failed");
                }
            }
        });
    }

    fn shutdown(&self) {
        self.listeners.borrow_mut().clear();
        self.touch_listeners.borrow_mut().clear();
        self.frame.borrow_mut().take();
        self.countdown.borrow_mut().take();
        if let Some(resize) = self.resize.borrow_mut().take() {
            resize.observer.disconnect();
        }
        if let Some(intersection) = self.intersection.borrow_mut().take() {
            intersection.observer.disconnect();
        }
        tracing::debug!(target: LOG_TARGET, "shell shut down");
    }
}

fn apply_mutation(element: &Element, mutation: DomMutation<'_>) {
    match mutation {
        DomMutation::Style { property, value } => {
            let Some(element) = element.dyn_ref::<HtmlElement>() else {
                return;
            };
            let style = element.style();
            let _ = match value {
                Some(value) => style.set_property(property, value),
                None => style.remove_property(property).map(|_| ()),
            };
        }
        DomMutation::Class { name, enabled } => {
            let _ = element.class_list().toggle_with_force(name, enabled);
        }
        DomMutation::Text(text) => element.set_text_content(Some(text)),
        DomMutation::InnerHtml(html) => element.set_inner_html(html),
        DomMutation::Attribute { name, value } => {
            let _ = element.set_attribute(name, value);
        }
    }
}

// ---------------------------------------------------------------------------
// Exports
// ---------------------------------------------------------------------------

/// Running page layer. Dropping it or calling `shutdown` detaches every
/// listener, timer, and observer.
#[wasm_bindgen]
pub struct KeepsakeHandle {
    shell: Option<Rc<Shell>>,
}

#[wasm_bindgen]
impl KeepsakeHandle {
    /// Detach from the document. Safe to call more than once.
    pub fn shutdown(&mut self) {
        if let Some(shell) = self.shell.take() {
            shell.shutdown();
        }
    }

    #[wasm_bindgen(js_name = isRunning)]
    pub fn is_running(&self) -> bool {
        self.shell.is_some()
    }
}

impl Drop for KeepsakeHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn load_config(config_json: Option<String>) -> WebConfig {
    let Some(json) = config_json.filter(|json| !json.trim().is_empty()) else {
        return WebConfig::default();
    };
    match WebConfig::from_json_str(&json) {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(target: LOG_TARGET, error = %err, "invalid configuration; using defaults");
            WebConfig::default()
        }
    }
}

/// Wire the page layer onto the current document.
///
/// `config_json` is an optional JSON document with the page sections plus
/// `selectors`. Problems are logged to the console; this never throws.
#[wasm_bindgen]
pub fn start(config_json: Option<String>) -> KeepsakeHandle {
    install_panic_hook();
    console_log::init(tracing::Level::INFO);

    let Some(window) = web_sys::window() else {
        tracing::error!(target: LOG_TARGET, "no window; page layer not started");
        return KeepsakeHandle { shell: None };
    };
    let Some(document) = window.document() else {
        tracing::error!(target: LOG_TARGET, "no document; page layer not started");
        return KeepsakeHandle { shell: None };
    };

    let config = load_config(config_json);
    let host = DomHost::new(window, document, config.selectors);
    let runtime = match PageRuntime::new(config.page) {
        Ok(runtime) => runtime.with_touch_input(host.touch_capable()),
        Err(err) => {
            tracing::error!(target: LOG_TARGET, error = %err, "page runtime rejected configuration");
            return KeepsakeHandle { shell: None };
        }
    };

    let shell = Shell::new(runtime, host);

    let mut rng = SmallRng::from_os_rng();
    let ready = shell
        .runtime
        .borrow_mut()
        .start(&shell.host, &mut rng, Utc::now());
    shell.flush();

    shell.wire_scroll();
    shell.wire_countdown();
    shell.wire_fade_in();
    shell.wire_anchors();
    shell.wire_gallery_input();
    shell.wire_lightbox();
    shell.watch_gallery_images();
    shell.run_initialization(ready);

    tracing::info!(target: LOG_TARGET, "page layer started");
    KeepsakeHandle { shell: Some(shell) }
}
