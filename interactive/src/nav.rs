use wasm_bindgen::JsCast;
use web_sys::{Document, Element};

use crate::util;

/// Navigation glue: the desktop navbar collapse and the mobile menu
/// with its outside-click and link-click closing rules.
pub fn init(document: &Document) {
    if let Ok(Some(toggler)) = document.query_selector(".navbar-toggler") {
        let doc = document.clone();
        util::listen(&toggler, "click", move |_| {
            if let Ok(Some(collapse)) = doc.query_selector(".navbar-collapse") {
                let _ = collapse.class_list().toggle("show");
            }
        });
    }

    if let Ok(Some(toggle)) = document.query_selector(".mobile-menu-toggle") {
        let doc = document.clone();
        util::listen(&toggle, "click", move |_| toggle_mobile_menu(&doc));
    }

    let doc = document.clone();
    util::listen(document, "click", move |event| {
        let Some(nav) = doc.get_element_by_id("mobileNav") else {
            return;
        };
        if !nav.class_list().contains("active") {
            return;
        }
        let Some(target) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
            return;
        };

        let inside_nav = nav.contains(Some(target.as_ref()));
        let on_toggle = doc
            .query_selector(".mobile-menu-toggle")
            .ok()
            .flatten()
            .map(|t| t.contains(Some(target.as_ref())))
            .unwrap_or(false);
        let on_link = target.class_list().contains("mobile-nav-link");

        // A nav link closes the menu even though it is inside it; any
        // other inside click keeps it open, as does the toggle itself.
        if on_link || (!inside_nav && !on_toggle) {
            close_mobile_menu(&doc);
        }
    });
}

/// Opens or closes the mobile menu, locking body scroll while open.
pub fn toggle_mobile_menu(document: &Document) {
    let Some(nav) = document.get_element_by_id("mobileNav") else {
        return;
    };
    let Ok(Some(toggle)) = document.query_selector(".mobile-menu-toggle") else {
        return;
    };

    let _ = nav.class_list().toggle("active");
    let _ = toggle.class_list().toggle("active");
    lock_body_scroll(document, nav.class_list().contains("active"));
}

fn close_mobile_menu(document: &Document) {
    if let Some(nav) = document.get_element_by_id("mobileNav") {
        let _ = nav.class_list().remove_1("active");
    }
    if let Ok(Some(toggle)) = document.query_selector(".mobile-menu-toggle") {
        let _ = toggle.class_list().remove_1("active");
    }
    lock_body_scroll(document, false);
}

fn lock_body_scroll(document: &Document, locked: bool) {
    let Some(body) = document.body() else { return };
    let style = body.style();
    if locked {
        let _ = style.set_property("overflow", "hidden");
    } else {
        let _ = style.remove_property("overflow");
    }
}
