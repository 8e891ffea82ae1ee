//! Page canonicalization and event naming rules.
//!
//! Event names are fully determined by `(event_type, page_name, component)`:
//!
//! | type      | name                                         |
//! |-----------|----------------------------------------------|
//! | view      | `View_{page}`                                |
//! | click     | `Click_{page}_{component or "Button"}`       |
//! | expose    | `Expose_{page}_{component or "Element"}`     |
//! | disappear | `Disappear_{page}_{component or "Element"}`  |

use url::Url;

use crate::events::EventType;

/// Page name used for the root path.
pub const HOME_PAGE: &str = "Home";

/// Default subject for click events without a name.
pub const DEFAULT_BUTTON: &str = "Button";

/// Default subject for expose/disappear events without a name.
pub const DEFAULT_ELEMENT: &str = "Element";

/// Prefix of page-view event names.
pub const VIEW_PREFIX: &str = "View_";

/// Canonicalizes a URL path into a page name.
///
/// `/` becomes `Home`, `/test/page` becomes `TestPage`. Each non-empty
/// segment gets its first character upper-cased and the segments are
/// concatenated. Idempotent: a canonical name maps to itself.
pub fn canonical_page_name(path: &str) -> String {
    let name: String = path
        .strip_prefix('/')
        .unwrap_or(path)
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(capitalize)
        .collect();

    if name.is_empty() {
        HOME_PAGE.to_string()
    } else {
        name
    }
}

/// Extracts the path of a location, which may be an absolute URL or a
/// root-relative reference such as `/b?x=1`. Falls back to `/`.
pub fn location_path(location: &str) -> String {
    let parsed = Url::parse(location).or_else(|_| {
        Url::parse("http://localhost/").and_then(|base| base.join(location))
    });
    match parsed {
        Ok(url) => url.path().to_string(),
        Err(_) => "/".to_string(),
    }
}

/// Canonical page name of a location.
pub fn page_name_of(location: &str) -> String {
    canonical_page_name(&location_path(location))
}

fn capitalize(segment: &str) -> String {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Builds the event name for a typed event on a page.
pub fn event_name(event_type: EventType, page_name: &str, component: Option<&str>) -> String {
    match event_type {
        EventType::View => format!("{}{}", VIEW_PREFIX, page_name),
        EventType::Click => format!(
            "Click_{}_{}",
            page_name,
            component.unwrap_or(DEFAULT_BUTTON)
        ),
        EventType::Expose => format!(
            "Expose_{}_{}",
            page_name,
            component.unwrap_or(DEFAULT_ELEMENT)
        ),
        EventType::Disappear => format!(
            "Disappear_{}_{}",
            page_name,
            component.unwrap_or(DEFAULT_ELEMENT)
        ),
    }
}

/// Page name implied by a funnel step: `View_Home` -> `Home`.
///
/// Names without the view prefix are returned unchanged.
pub fn page_of_step(step: &str) -> &str {
    step.strip_prefix(VIEW_PREFIX).unwrap_or(step)
}
