//! URL utilities for consistent URL handling

use url::Url;

/// Resolve a possibly-relative href against the site's base origin.
///
/// Empty hrefs resolve to `None`; absolute `http(s)` URLs pass through
/// unchanged.
pub fn absolutize(base: &str, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    if href.starts_with("http://") || href.starts_with("https://") {
        return Some(href.to_string());
    }
    let base_url = Url::parse(base).ok()?;
    base_url.join(href).map(|u| u.to_string()).ok()
}

/// Last path segment of a URL with query and fragment stripped.
///
/// This is the destination filename for localized images. Distinct source
/// URLs sharing a basename collide on the same destination; the first
/// download wins.
pub fn path_basename(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let name = parsed.path_segments()?.next_back()?;
    if name.is_empty() {
        return None;
    }
    Some(name.to_string())
}
