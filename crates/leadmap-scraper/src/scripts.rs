//! Page scripts and selectors for the map-search UI.
//!
//! Everything the pipeline knows about the target markup lives here: the
//! discovery feed, the per-listing anchor element, and the single-round-trip
//! extraction function. Field extraction is one `evaluate` call, not one
//! call per field.

/// Results feed container on the search page.
pub const FEED_SELECTOR: &str = r#"div[role="feed"]"#;

/// Anchor element on a place page; its absence invalidates the record.
pub const LEAD_ANCHOR_SELECTOR: &str = "h1.DUwDvf";

/// Returns all currently visible place links in the feed.
pub const COLLECT_LINKS_JS: &str = r#"
() => {
    const anchors = document.querySelectorAll('a[href*="/maps/place/"]');
    return [...anchors].map(a => a.href).filter(Boolean);
}
"#;

/// Extracts the lead fields from a place page, or null when the anchor
/// element is missing.
pub const EXTRACT_LEAD_JS: &str = r#"
() => {
    const h1 = document.querySelector('h1.DUwDvf');
    if (!h1) return null;
    const getText = el => {
        if (!el) return 'N/A';
        return el.innerText.replace(/\n/g, ' ').trim();
    };
    return {
        name:    h1.innerText.trim(),
        address: getText(document.querySelector('button[data-item-id="address"]')),
        phone:   getText(document.querySelector('button[data-item-id^="phone:tel:"]')),
        website: getText(document.querySelector('a[data-item-id="authority"]')),
    };
}
"#;

/// Scrolls the results feed to the bottom to trigger lazy loading.
pub const SCROLL_FEED_JS: &str = r#"
() => {
    const feed = document.querySelector('div[role="feed"]');
    if (feed) feed.scrollTop = feed.scrollHeight;
}
"#;

/// Enables "update results when the map moves", suppressing the click when
/// the control is already active. Returns whether a click happened.
pub const ENABLE_LIVE_RESULTS_JS: &str = r#"
() => {
    const box = document.querySelector('[role="checkbox"][aria-label="Update results when map moves"]')
        || document.querySelector('button[aria-label="Update results when map moves"]');
    if (!box) return false;
    if (box.getAttribute('aria-checked') === 'true') return false;
    box.click();
    return true;
}
"#;

/// Build the map-search URL for a query.
pub fn build_search_url(query: &str) -> String {
    let joined = query.split_whitespace().collect::<Vec<_>>().join("+");
    format!("https://www.google.com/maps/search/{joined}?entry=ttu")
}
