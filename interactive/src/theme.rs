use web_sys::{Document, Window};

use crate::util;

const STORAGE_KEY: &str = "theme";
const BODY_CLASS: &str = "dark-theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

/// Applies the saved theme and wires the `#themeToggle` control. The
/// choice persists in localStorage across visits.
pub fn init(window: &Window, document: &Document) {
    let storage = window.local_storage().ok().flatten();

    if let Some(saved) = storage
        .as_ref()
        .and_then(|s| s.get_item(STORAGE_KEY).ok().flatten())
        .and_then(|v| Theme::parse(&v))
    {
        apply(document, saved);
    }

    let Some(toggle) = document.get_element_by_id("themeToggle") else {
        return;
    };
    let doc = document.clone();
    util::listen(&toggle, "click", move |_| {
        let next = current(&doc).toggled();
        apply(&doc, next);
        if let Some(storage) = &storage {
            let _ = storage.set_item(STORAGE_KEY, next.as_str());
        }
    });
}

fn current(document: &Document) -> Theme {
    let dark = document
        .body()
        .map(|b| b.class_list().contains(BODY_CLASS))
        .unwrap_or(false);
    if dark {
        Theme::Dark
    } else {
        Theme::Light
    }
}

fn apply(document: &Document, theme: Theme) {
    let Some(body) = document.body() else { return };
    let list = body.class_list();
    let _ = match theme {
        Theme::Dark => list.add_1(BODY_CLASS),
        Theme::Light => list.remove_1(BODY_CLASS),
    };
}
