use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement};

use crate::util;

const SLIDE_MS: u32 = 200;
const SHOW_DELAY_MS: u32 = 50;
const FOCUS_DELAY_MS: u32 = 250;

/// Element id of the reply form belonging to a comment.
pub fn reply_form_id(comment_id: &str) -> String {
    format!("reply-form-{comment_id}")
}

/// Icon class and label for the nested-replies toggle button.
pub fn replies_toggle_labels(expanded: bool) -> (&'static str, &'static str) {
    if expanded {
        ("fas fa-chevron-up collapse-icon", "Hide replies")
    } else {
        ("fas fa-chevron-down collapse-icon", "Show replies")
    }
}

/// Inline `display` semantics: anything but an explicit "none" counts
/// as shown.
pub fn display_means_shown(display: &str) -> bool {
    display != "none"
}

fn is_shown(el: &HtmlElement) -> bool {
    el.style()
        .get_property_value("display")
        .map(|d| display_means_shown(&d))
        .unwrap_or(true)
}

fn slide_out(el: &HtmlElement) {
    let style = el.style();
    let _ = style.set_property("transition", "all 0.2s ease");
    let _ = style.set_property("opacity", "0");
    let _ = style.set_property("transform", "translateY(-10px)");

    let el = el.clone();
    util::after(SLIDE_MS, move || {
        let _ = el.style().set_property("display", "none");
    });
}

fn slide_in(el: &HtmlElement) {
    let style = el.style();
    let _ = style.set_property("display", "block");
    let _ = style.set_property("opacity", "0");
    let _ = style.set_property("transform", "translateY(-10px)");
    let _ = style.set_property("transition", "all 0.2s ease");

    let el = el.clone();
    util::after(SHOW_DELAY_MS, move || {
        let style = el.style();
        let _ = style.set_property("opacity", "1");
        let _ = style.set_property("transform", "translateY(0)");
    });
}

/// Reply-form surface the toggle drives. Injected so the hidden→shown→
/// hidden sequencing can be exercised without a DOM.
pub trait ReplyForm {
    fn is_shown(&self) -> bool;
    fn slide_in(&self);
    fn slide_out(&self);
    /// Move focus into the form's text field once it is visible.
    fn focus_input(&self);
}

/// Shows the form when hidden (then focuses its text field), hides it
/// when shown.
pub fn toggle_form(form: &impl ReplyForm) {
    if form.is_shown() {
        form.slide_out();
    } else {
        form.slide_in();
        form.focus_input();
    }
}

struct DomReplyForm {
    el: HtmlElement,
}

impl ReplyForm for DomReplyForm {
    fn is_shown(&self) -> bool {
        is_shown(&self.el)
    }

    fn slide_in(&self) {
        slide_in(&self.el);
    }

    fn slide_out(&self) {
        slide_out(&self.el);
    }

    fn focus_input(&self) {
        if let Ok(Some(textarea)) = self.el.query_selector("textarea") {
            if let Ok(textarea) = textarea.dyn_into::<HtmlElement>() {
                util::after(FOCUS_DELAY_MS, move || {
                    let _ = textarea.focus();
                });
            }
        }
    }
}

/// Shows or hides the reply form for a comment, moving focus into its
/// textarea once shown. A missing form is a silent no-op.
pub fn toggle_reply_form(document: &Document, comment_id: &str) {
    let Some(el) = document
        .get_element_by_id(&reply_form_id(comment_id))
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
    else {
        return;
    };

    toggle_form(&DomReplyForm { el });
}

/// Collapses or expands a nested-reply container and keeps the toggle
/// button's icon and label in step.
pub fn toggle_nested_replies(document: &Document, container_id: &str, toggle: &Element) {
    let Some(container) = document
        .get_element_by_id(container_id)
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
    else {
        return;
    };

    let expanding = !is_shown(&container);
    if expanding {
        slide_in(&container);
    } else {
        slide_out(&container);
    }

    let (icon_class, label) = replies_toggle_labels(expanding);
    if let Ok(Some(icon)) = toggle.query_selector(".collapse-icon") {
        icon.set_class_name(icon_class);
    }
    if let Ok(Some(text)) = toggle.query_selector(".small") {
        text.set_text_content(Some(label));
    }
}

/// Click delegation for reply buttons and nested-reply toggles.
pub fn bind(document: &Document) {
    let doc = document.clone();
    util::listen(document, "click", move |event| {
        if let Some(btn) = util::closest(&event, ".reply-btn") {
            event.prevent_default();
            match btn.get_attribute("data-comment-id") {
                Some(id) if !id.is_empty() => toggle_reply_form(&doc, &id),
                _ => log::warn!("reply button without data-comment-id"),
            }
            return;
        }

        if let Some(btn) = util::closest(&event, ".replies-toggle-btn") {
            event.prevent_default();
            match btn.get_attribute("data-replies-target") {
                Some(id) if !id.is_empty() => toggle_nested_replies(&doc, &id, &btn),
                _ => log::warn!("replies toggle without data-replies-target"),
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use super::*;

    #[derive(Default)]
    struct RecordingForm {
        shown: Cell<bool>,
        events: RefCell<Vec<&'static str>>,
    }

    impl ReplyForm for RecordingForm {
        fn is_shown(&self) -> bool {
            self.shown.get()
        }
        fn slide_in(&self) {
            self.shown.set(true);
            self.events.borrow_mut().push("slide_in");
        }
        fn slide_out(&self) {
            self.shown.set(false);
            self.events.borrow_mut().push("slide_out");
        }
        fn focus_input(&self) {
            self.events.borrow_mut().push("focus");
        }
    }

    #[test]
    fn toggling_twice_shows_focuses_then_hides() {
        let form = RecordingForm::default();

        toggle_form(&form);
        assert!(form.is_shown());
        assert_eq!(*form.events.borrow(), ["slide_in", "focus"]);

        toggle_form(&form);
        assert!(!form.is_shown());
        assert_eq!(*form.events.borrow(), ["slide_in", "focus", "slide_out"]);
    }

    #[test]
    fn already_visible_form_only_hides() {
        let form = RecordingForm::default();
        form.shown.set(true);

        toggle_form(&form);
        assert_eq!(*form.events.borrow(), ["slide_out"]);
    }

    #[test]
    fn unset_display_counts_as_shown() {
        assert!(display_means_shown(""));
        assert!(display_means_shown("block"));
        assert!(!display_means_shown("none"));
    }

    #[test]
    fn reply_form_id_is_predictable() {
        assert_eq!(reply_form_id("42"), "reply-form-42");
        assert_eq!(reply_form_id("abc"), "reply-form-abc");
    }

    #[test]
    fn toggle_labels_track_expansion() {
        let (icon, label) = replies_toggle_labels(true);
        assert!(icon.contains("chevron-up"));
        assert_eq!(label, "Hide replies");

        let (icon, label) = replies_toggle_labels(false);
        assert!(icon.contains("chevron-down"));
        assert_eq!(label, "Show replies");
    }
}
