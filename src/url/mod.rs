//! URL handling for listing links
//!
//! Listing cards carry site-relative detail links. This module turns them into
//! absolute URLs on the configured origin.

use url::Url;

/// Joins a card's detail link onto the site origin
///
/// # Joining Rules
///
/// 1. Trailing slashes are removed from the origin
/// 2. Leading slashes are removed from the link
/// 3. The two parts are joined with exactly one `/`
/// 4. An absolute link keeps only its path and query, re-rooted on the origin
///
/// # Arguments
///
/// * `origin` - The configured base origin (e.g. "https://bidplus.gem.gov.in")
/// * `href` - The raw `href` attribute found on the card
///
/// # Examples
///
/// ```
/// use gem_tenders::url::join_detail_url;
///
/// let url = join_detail_url("https://bidplus.gem.gov.in/", "//showbidDocument/7");
/// assert_eq!(url, "https://bidplus.gem.gov.in/showbidDocument/7");
/// ```
pub fn join_detail_url(origin: &str, href: &str) -> String {
    let origin = origin.trim_end_matches('/');
    let href = href.trim();

    let relative = match Url::parse(href) {
        Ok(absolute) if absolute.has_host() => match absolute.query() {
            Some(query) => format!("{}?{}", absolute.path(), query),
            None => absolute.path().to_string(),
        },
        _ => href.to_string(),
    };

    format!("{}/{}", origin, relative.trim_start_matches('/'))
}

/// Resolves an optional `href` into a detail URL, or an empty string
///
/// A card whose header link has no `href` still gets a fixed-width record, so
/// absence maps to `""` rather than to an error.
pub fn detail_url_or_empty(origin: &str, href: Option<&str>) -> String {
    match href.map(str::trim) {
        Some(href) if !href.is_empty() => join_detail_url(origin, href),
        _ => String::new(),
    }
}
