mod api;
mod comments;
mod enhance;
mod nav;
mod observe;
mod search;
mod theme;
mod util;
mod votes;

use std::rc::Rc;

use wasm_bindgen::prelude::wasm_bindgen;
use web_sys::js_sys;

use crate::api::{FetchTransport, MetaCsrf};
use crate::votes::VoteInteraction;

fn main() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Debug);

    let Some(window) = web_sys::window() else {
        return;
    };
    let Some(document) = window.document() else {
        return;
    };

    enhance::init(&document);
    observe::init(&window, &document);
    search::bind(&document);
    theme::init(&window, &document);
    nav::init(&document);
    comments::bind(&document);

    let interaction = Rc::new(VoteInteraction::new(FetchTransport, MetaCsrf));
    votes::bind(&document, interaction);

    log::debug!("agora interactivity mounted");
}

// ── Template-facing helpers ──
// Exported under the names the inline template scripts already call.

#[wasm_bindgen(js_name = showNotification)]
pub fn show_notification(message: &str, kind: &str) {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };
    util::show_notification(&document, message, util::NotifyKind::parse(kind));
}

#[wasm_bindgen(js_name = timeAgo)]
pub fn time_ago(date: &js_sys::Date) -> String {
    let diff = ((js_sys::Date::now() - date.get_time()) / 1_000.0) as i64;
    util::time_ago(diff.max(0))
}

/// Callers that pass no length get the long-standing default of 100.
#[wasm_bindgen(js_name = truncate)]
pub fn truncate(text: &str, max: Option<usize>) -> String {
    util::truncate(text, max.unwrap_or(100))
}

#[cfg(test)]
mod tests {
    #[test]
    fn truncate_length_defaults_to_100() {
        let long = "x".repeat(120);
        assert_eq!(super::truncate(&long, None).chars().count(), 103);
        assert_eq!(super::truncate("short", None), "short");
        assert_eq!(super::truncate("hello world", Some(5)), "hello...");
    }
}

#[wasm_bindgen(js_name = toggleReplyForm)]
pub fn toggle_reply_form(comment_id: &str) {
    if let Some(document) = web_sys::window().and_then(|w| w.document()) {
        comments::toggle_reply_form(&document, comment_id);
    }
}

#[wasm_bindgen(js_name = toggleMobileMenu)]
pub fn toggle_mobile_menu() {
    if let Some(document) = web_sys::window().and_then(|w| w.document()) {
        nav::toggle_mobile_menu(&document);
    }
}
