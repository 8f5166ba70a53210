use std::cell::Cell;
use std::rc::Rc;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::js_sys;
use web_sys::{Document, HtmlElement, HtmlImageElement, IntersectionObserver,
    IntersectionObserverEntry, Window};

use crate::util;

const LOAD_MORE_THRESHOLD_PX: f64 = 1_000.0;
const LOAD_MORE_COOLDOWN_MS: u32 = 1_000;

/// Viewport-driven behavior: lazy images and the infinite-scroll hook.
pub fn init(window: &Window, document: &Document) {
    lazy_load_images(document);
    bind_infinite_scroll(window, document);
}

/// `img[data-src]` images load when they enter the viewport. Browsers
/// without IntersectionObserver just load everything eagerly.
fn lazy_load_images(document: &Document) {
    let mut images: Vec<HtmlImageElement> = Vec::new();
    util::for_each(document, "img[data-src]", |el| {
        if let Ok(img) = el.dyn_into::<HtmlImageElement>() {
            images.push(img);
        }
    });
    if images.is_empty() {
        return;
    }

    if !supports_intersection_observer() {
        for img in &images {
            load_image(img);
        }
        return;
    }

    let callback = Closure::<dyn FnMut(js_sys::Array, IntersectionObserver)>::new(
        |entries: js_sys::Array, observer: IntersectionObserver| {
            for entry in entries.iter() {
                let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                    continue;
                };
                if !entry.is_intersecting() {
                    continue;
                }
                if let Ok(img) = entry.target().dyn_into::<HtmlImageElement>() {
                    load_image(&img);
                    observer.unobserve(&img);
                }
            }
        },
    );

    match IntersectionObserver::new(callback.as_ref().unchecked_ref()) {
        Ok(observer) => {
            for img in &images {
                observer.observe(img);
            }
            callback.forget();
        }
        Err(_) => {
            for img in &images {
                load_image(img);
            }
        }
    }
}

fn load_image(img: &HtmlImageElement) {
    if let Some(src) = img.get_attribute("data-src") {
        img.set_src(&src);
        let _ = img.remove_attribute("data-src");
    }
}

fn supports_intersection_observer() -> bool {
    web_sys::window()
        .map(|w| {
            js_sys::Reflect::has(&w, &"IntersectionObserver".into()).unwrap_or(false)
        })
        .unwrap_or(false)
}

/// Fires the load-more hook when scrolling within reach of the bottom,
/// at most once per cooldown window.
fn bind_infinite_scroll(window: &Window, document: &Document) {
    let loading = Rc::new(Cell::new(false));
    let win = window.clone();
    let doc = document.clone();
    util::listen(window, "scroll", move |_| {
        if loading.get() {
            return;
        }

        let viewport = win.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        let scrolled = win.scroll_y().unwrap_or(0.0);
        let page_height = doc
            .document_element()
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
            .map(|el| el.offset_height() as f64)
            .unwrap_or(0.0);

        if viewport + scrolled >= page_height - LOAD_MORE_THRESHOLD_PX {
            loading.set(true);
            load_more(&loading);
        }
    });
}

// Older pages are still served as full documents; this only reports the
// threshold crossing until a paginated endpoint exists to call.
fn load_more(loading: &Rc<Cell<bool>>) {
    log::debug!("infinite scroll threshold reached");
    let loading = loading.clone();
    util::after(LOAD_MORE_COOLDOWN_MS, move || loading.set(false));
}
