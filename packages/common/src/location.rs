//! Facility locations.
//!
//! Admins paste whatever their maps app gives them: a share URL, the full
//! `<iframe>` embed snippet, bare coordinates or a plain address. The
//! stored text is kept as-is and [`embed_url`] derives a URL that can be
//! put in an iframe.

use url::Url;

const EMBED_BASE: &str = "https://maps.google.com/maps";

/// Derive an embeddable maps URL from a stored location.
///
/// Returns `None` when nothing usable can be derived, e.g. for short links
/// that only resolve through a redirect.
pub fn embed_url(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if raw.to_ascii_lowercase().contains("<iframe") {
        let src = iframe_src(raw)?;
        return embed_url(&src);
    }

    if raw.starts_with("http://") || raw.starts_with("https://") {
        let url = Url::parse(raw).ok()?;
        return embed_from_url(&url);
    }

    if let Some((lat, lng)) = parse_coordinates(raw) {
        return Some(build_embed(&format!("{lat},{lng}")));
    }

    Some(build_embed(raw))
}

fn embed_from_url(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_ascii_lowercase();
    if !is_maps_host(&host) {
        return None;
    }

    let path = url.path();
    if path.contains("/maps/embed") || url.query_pairs().any(|(k, v)| k == "output" && v == "embed")
    {
        return Some(url.to_string());
    }

    if let Some((lat, lng)) = path
        .split('/')
        .find_map(|segment| segment.strip_prefix('@'))
        .and_then(parse_coordinates)
    {
        return Some(build_embed(&format!("{lat},{lng}")));
    }

    if let Some((_, q)) = url
        .query_pairs()
        .find(|(k, v)| (k == "q" || k == "query") && !v.trim().is_empty())
    {
        return Some(build_embed(q.trim()));
    }

    let mut segments = path.split('/');
    if segments.any(|s| s == "place")
        && let Some(name) = segments.next().filter(|s| !s.is_empty())
    {
        let decoded = url::form_urlencoded::parse(format!("q={name}").as_bytes())
            .next()
            .map(|(_, v)| v.into_owned())
            .unwrap_or_default();
        return Some(build_embed(&decoded));
    }

    None
}

/// `google.<tld>` or `google.co[m].<cc>`, optionally under `www.` or `maps.`.
fn is_maps_host(host: &str) -> bool {
    let host = host.strip_suffix('.').unwrap_or(host);
    let host = host
        .strip_prefix("www.")
        .or_else(|| host.strip_prefix("maps."))
        .unwrap_or(host);
    let is_tld = |label: &str| {
        (2..=3).contains(&label.len()) && label.bytes().all(|b| b.is_ascii_lowercase())
    };
    match host.split('.').collect::<Vec<_>>().as_slice() {
        ["google", tld] => is_tld(*tld),
        ["google", "co" | "com", cc] => cc.len() == 2 && is_tld(*cc),
        _ => false,
    }
}

fn iframe_src(html: &str) -> Option<String> {
    let lower = html.to_ascii_lowercase();
    let start = lower.find("src=")? + 4;
    let rest = &html[start..];
    let quote = rest.chars().next()?;
    if quote != '"' && quote != '\'' {
        return None;
    }
    let rest = &rest[1..];
    let end = rest.find(quote)?;
    Some(rest[..end].replace("&amp;", "&"))
}

/// Parse `"lat,lng"` (optionally followed by a zoom, as in `@lat,lng,15z`).
fn parse_coordinates(raw: &str) -> Option<(f64, f64)> {
    let mut parts = raw.split(',').map(str::trim);
    let lat: f64 = parts.next()?.parse().ok()?;
    let lng: f64 = parts.next()?.parse().ok()?;
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
        return None;
    }
    Some((lat, lng))
}

fn build_embed(query: &str) -> String {
    let q: String = url::form_urlencoded::byte_serialize(query.as_bytes()).collect();
    format!("{EMBED_BASE}?q={q}&z=15&output=embed")
}
