use std::cell::Cell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlInputElement};

use crate::util;

pub const DEBOUNCE_MS: u32 = 300;
pub const MIN_QUERY_LEN: usize = 2;

/// Whether a raw input value should trigger a search once the debounce
/// window closes. Returns the trimmed query when it should.
pub fn searchable(raw: &str) -> Option<&str> {
    let query = raw.trim();
    (query.chars().count() >= MIN_QUERY_LEN).then_some(query)
}

/// Debounced input handling for `#searchInput`. Each keystroke bumps a
/// generation counter; only the timer holding the latest generation
/// fires, so there is nothing to cancel.
pub fn bind(document: &Document) {
    let Some(input) = document.get_element_by_id("searchInput") else {
        return;
    };
    let Ok(input) = input.dyn_into::<HtmlInputElement>() else {
        return;
    };

    let generation = Rc::new(Cell::new(0u64));
    let handle = input.clone();
    util::listen(&input, "input", move |_| {
        let current = generation.get() + 1;
        generation.set(current);

        let Some(query) = searchable(&handle.value()).map(str::to_string) else {
            return;
        };
        let generation = generation.clone();
        util::after(DEBOUNCE_MS, move || {
            if generation.get() == current {
                run_search(&query);
            }
        });
    });
}

// Search results are still a server-rendered page; the debounced hook
// only reports what it would have asked for.
fn run_search(query: &str) {
    log::debug!("debounced search fired: {query:?}");
}
