use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{
    Document, Element, HtmlButtonElement, HtmlElement, HtmlTextAreaElement, KeyboardEvent,
    ScrollBehavior, ScrollIntoViewOptions, ScrollLogicalPosition,
};

use crate::util;
use crate::util::NotifyKind;

const ALERT_LINGER_MS: u32 = 5_000;
const ALERT_FADE_MS: u32 = 500;
const COPY_BADGE_MS: u32 = 2_000;
const SUBMIT_LOCK_MS: u32 = 10_000;

/// Wires every page-load enhancement that needs no network access.
pub fn init(document: &Document) {
    dismiss_alerts(document);
    bind_smooth_scroll(document);
    bind_textarea_autoresize(document);
    bind_clipboard_copy(document);
    bind_form_loading(document);
    bind_shortcuts(document);
    bind_tooltips(document);
}

/// Non-permanent alerts fade out after a few seconds and leave the DOM.
fn dismiss_alerts(document: &Document) {
    util::for_each(document, ".alert:not(.alert-permanent)", |el| {
        let Ok(el) = el.dyn_into::<HtmlElement>() else {
            return;
        };
        util::after(ALERT_LINGER_MS, move || {
            let style = el.style();
            let _ = style.set_property("transition", "opacity 0.5s");
            let _ = style.set_property("opacity", "0");
            util::after(ALERT_FADE_MS, move || el.remove());
        });
    });
}

fn bind_smooth_scroll(document: &Document) {
    let doc = document.clone();
    util::for_each(document, "a[href^='#']", move |link| {
        let doc = doc.clone();
        let anchor = link.clone();
        util::listen(&link, "click", move |event| {
            let href = anchor.get_attribute("href").unwrap_or_default();
            // Bare "#" is a common no-op href, leave it to the browser.
            if href.len() <= 1 {
                return;
            }
            // An invalid selector falls through silently.
            if let Ok(Some(target)) = doc.query_selector(&href) {
                event.prevent_default();
                let opts = ScrollIntoViewOptions::new();
                opts.set_behavior(ScrollBehavior::Smooth);
                opts.set_block(ScrollLogicalPosition::Start);
                target.scroll_into_view_with_scroll_into_view_options(&opts);
            }
        });
    });
}

fn bind_textarea_autoresize(document: &Document) {
    util::for_each(document, "textarea", |el| {
        let Ok(area) = el.dyn_into::<HtmlTextAreaElement>() else {
            return;
        };
        fit_textarea(&area);
        let handle = area.clone();
        util::listen(&area, "input", move |_| fit_textarea(&handle));
    });
}

fn fit_textarea(area: &HtmlTextAreaElement) {
    let style = area.style();
    let _ = style.set_property("height", "auto");
    let _ = style.set_property("height", &format!("{}px", area.scroll_height()));
}

/// `[data-copy]` elements copy their attribute text and briefly show a
/// "Copied!" confirmation.
fn bind_clipboard_copy(document: &Document) {
    let doc = document.clone();
    util::for_each(document, "[data-copy]", move |el| {
        let Ok(button) = el.dyn_into::<HtmlElement>() else {
            return;
        };
        let doc = doc.clone();
        let handle = button.clone();
        util::listen(&button, "click", move |_| {
            let Some(text) = handle.get_attribute("data-copy") else {
                return;
            };
            let doc = doc.clone();
            let handle = handle.clone();
            spawn_local(async move {
                let Some(window) = web_sys::window() else { return };
                let clipboard = window.navigator().clipboard();
                if JsFuture::from(clipboard.write_text(&text)).await.is_err() {
                    util::show_notification(&doc, "Could not copy to clipboard", NotifyKind::Danger);
                    return;
                }

                let original = handle.inner_html();
                handle.set_inner_html("<i class=\"fas fa-check\"></i> Copied!");
                let _ = handle.class_list().add_1("btn-success");
                util::after(COPY_BADGE_MS, move || {
                    handle.set_inner_html(&original);
                    let _ = handle.class_list().remove_1("btn-success");
                });
            });
        });
    });
}

/// Submit buttons swap to a spinner and lock while the server handles
/// the form. Navigation normally replaces the page; the timed unlock is
/// the safety valve when it does not.
fn bind_form_loading(document: &Document) {
    util::for_each(document, "form", |form| {
        let handle = form.clone();
        util::listen(&form, "submit", move |_| {
            let Ok(Some(button)) = handle.query_selector("button[type='submit']") else {
                return;
            };
            let Ok(button) = button.dyn_into::<HtmlButtonElement>() else {
                return;
            };
            if button.disabled() {
                return;
            }

            let original = button.inner_html();
            button.set_inner_html("<i class=\"fas fa-spinner fa-spin\"></i> Loading...");
            button.set_disabled(true);
            util::after(SUBMIT_LOCK_MS, move || {
                button.set_inner_html(&original);
                button.set_disabled(false);
            });
        });
    });
}

/// Ctrl/Cmd+`/` focuses search; Escape closes an open modal.
fn bind_shortcuts(document: &Document) {
    let doc = document.clone();
    util::listen(document, "keydown", move |event| {
        let Ok(event) = event.dyn_into::<KeyboardEvent>() else {
            return;
        };

        if (event.ctrl_key() || event.meta_key()) && event.key() == "/" {
            event.prevent_default();
            if let Ok(Some(input)) = doc.query_selector("#searchInput, input[type='search']") {
                if let Ok(input) = input.dyn_into::<HtmlElement>() {
                    let _ = input.focus();
                }
            }
        }

        if event.key() == "Escape" {
            if let Ok(Some(modal)) = doc.query_selector(".modal.show") {
                let _ = modal.class_list().remove_1("show");
            }
        }
    });
}

/// Minimal tooltip for `[data-bs-toggle="tooltip"]` elements, fed by
/// their `title` attribute.
fn bind_tooltips(document: &Document) {
    let doc = document.clone();
    util::for_each(document, "[data-bs-toggle='tooltip']", move |el| {
        let Some(text) = el
            .get_attribute("title")
            .or_else(|| el.get_attribute("data-bs-title"))
            .filter(|t| !t.is_empty())
        else {
            return;
        };

        let active: Rc<RefCell<Option<HtmlElement>>> = Rc::new(RefCell::new(None));
        {
            let doc = doc.clone();
            let owner = el.clone();
            let active = active.clone();
            util::listen(&el, "mouseenter", move |_| {
                if let Some(tip) = build_tooltip(&doc, &owner, &text) {
                    if let Some(old) = active.borrow_mut().replace(tip) {
                        old.remove();
                    }
                }
            });
        }
        {
            let active = active.clone();
            util::listen(&el, "mouseleave", move |_| {
                if let Some(tip) = active.borrow_mut().take() {
                    tip.remove();
                }
            });
        }
    });
}

fn build_tooltip(document: &Document, owner: &Element, text: &str) -> Option<HtmlElement> {
    let body = document.body()?;
    let tip: HtmlElement = document.create_element("div").ok()?.dyn_into().ok()?;
    tip.set_class_name("agora-tooltip");
    tip.set_text_content(Some(text));

    let rect = owner.get_bounding_client_rect();
    let style = tip.style();
    let _ = style.set_property("position", "fixed");
    let _ = style.set_property("left", &format!("{}px", rect.left() + rect.width() / 2.0));
    let _ = style.set_property("top", &format!("{}px", rect.top() - 8.0));
    let _ = style.set_property("transform", "translate(-50%, -100%)");
    let _ = style.set_property("z-index", "9999");

    body.append_child(&tip).ok()?;
    Some(tip)
}
