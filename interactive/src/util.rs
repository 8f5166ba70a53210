use gloo_timers::future::TimeoutFuture;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Element, EventTarget, HtmlElement};

const NOTIFY_LINGER_MS: u32 = 5_000;

/// Attaches a page-lifetime event listener. The closure is leaked on
/// purpose: these bindings live as long as the document does.
pub fn listen(target: &EventTarget, event: &str, f: impl FnMut(web_sys::Event) + 'static) {
    let closure = Closure::<dyn FnMut(web_sys::Event)>::new(f);
    let _ = target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
    closure.forget();
}

/// Runs `f` once after `ms` milliseconds on the UI event loop.
pub fn after(ms: u32, f: impl FnOnce() + 'static) {
    spawn_local(async move {
        TimeoutFuture::new(ms).await;
        f();
    });
}

pub fn for_each(document: &Document, selector: &str, mut f: impl FnMut(Element)) {
    let Ok(list) = document.query_selector_all(selector) else {
        return;
    };
    for i in 0..list.length() {
        if let Some(node) = list.item(i) {
            if let Ok(el) = node.dyn_into::<Element>() {
                f(el);
            }
        }
    }
}

/// Nearest ancestor of the event target matching `selector`.
pub fn closest(event: &web_sys::Event, selector: &str) -> Option<Element> {
    event
        .target()?
        .dyn_into::<Element>()
        .ok()?
        .closest(selector)
        .ok()
        .flatten()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyKind {
    Info,
    Success,
    Warning,
    Danger,
}

impl NotifyKind {
    pub fn as_class(self) -> &'static str {
        match self {
            NotifyKind::Info => "info",
            NotifyKind::Success => "success",
            NotifyKind::Warning => "warning",
            NotifyKind::Danger => "danger",
        }
    }

    /// Unknown kinds fall back to `Info` rather than failing a caller
    /// that only wanted a toast.
    pub fn parse(s: &str) -> Self {
        match s {
            "success" => NotifyKind::Success,
            "warning" => NotifyKind::Warning,
            "danger" => NotifyKind::Danger,
            _ => NotifyKind::Info,
        }
    }
}

/// Floating dismissible alert in the top-right corner, auto-removed
/// after a few seconds.
pub fn show_notification(document: &Document, message: &str, kind: NotifyKind) {
    let Some(body) = document.body() else { return };
    let Ok(div) = document.create_element("div") else {
        return;
    };
    let Ok(div) = div.dyn_into::<HtmlElement>() else {
        return;
    };

    div.set_class_name(&format!(
        "alert alert-{} alert-dismissible fade show position-fixed",
        kind.as_class()
    ));
    let style = div.style();
    let _ = style.set_property("top", "20px");
    let _ = style.set_property("right", "20px");
    let _ = style.set_property("z-index", "9999");
    div.set_inner_html(&format!(
        "{message}<button type=\"button\" class=\"btn-close\" data-bs-dismiss=\"alert\"></button>"
    ));

    let _ = body.append_child(&div);
    after(NOTIFY_LINGER_MS, move || div.remove());
}

/// Human "time ago" label from a difference in whole seconds.
pub fn time_ago(diff_seconds: i64) -> String {
    const MINUTE: i64 = 60;
    const HOUR: i64 = 3_600;
    const DAY: i64 = 86_400;
    const MONTH: i64 = 2_592_000;
    const YEAR: i64 = 31_536_000;

    if diff_seconds < MINUTE {
        "just now".to_string()
    } else if diff_seconds < HOUR {
        format!("{}m ago", diff_seconds / MINUTE)
    } else if diff_seconds < DAY {
        format!("{}h ago", diff_seconds / HOUR)
    } else if diff_seconds < MONTH {
        format!("{}d ago", diff_seconds / DAY)
    } else if diff_seconds < YEAR {
        format!("{}mo ago", diff_seconds / MONTH)
    } else {
        format!("{}y ago", diff_seconds / YEAR)
    }
}

/// Ellipsis truncation, counted in chars so multi-byte text stays valid.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let head: String = text.chars().take(max).collect();
        format!("{head}...")
    }
}
