use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::utils::mime::file_name;

/// Post ids are lowercase base36.
static POST_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]{3,12}$").expect("post id regex compiles"));

/// A `t3_` fullname, or an unprefixed id that contains at least one digit.
fn bare_post_id(input: &str) -> Option<String> {
    let (id, prefixed) = match input.strip_prefix("t3_") {
        Some(rest) => (rest, true),
        None => (input, false),
    };
    if !POST_ID_RE.is_match(id) {
        return None;
    }
    if !prefixed && !id.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(id.to_string())
}

/// Extract a post id from whatever the caller handed us.
///
/// Accepts:
/// - a bare id containing a digit (`abc123`) or any fullname (`t3_abcdef`)
/// - a permalink such as `https://www.reddit.com/r/funny/comments/abc123/some_title/`
/// - a short link such as `https://redd.it/abc123`
///
/// Anything else yields `None` rather than a guess.
#[must_use]
pub fn extract_post_id(input: &str) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if let Some(id) = bare_post_id(input) {
        return Some(id);
    }

    let url = Url::parse(input).ok()?;
    let host = url.host_str()?.to_ascii_lowercase();
    let segments: Vec<&str> = url
        .path_segments()?
        .filter(|segment| !segment.is_empty())
        .collect();

    let candidate = if host == "redd.it" {
        segments.first().copied()
    } else if host == "reddit.com" || host.ends_with(".reddit.com") {
        segments
            .iter()
            .position(|segment| *segment == "comments")
            .and_then(|idx| segments.get(idx + 1))
            .copied()
    } else {
        None
    }?;

    let candidate = candidate.to_ascii_lowercase();
    POST_ID_RE.is_match(&candidate).then_some(candidate)
}

/// Post id named by a staged image key such as `reddit/funny/posts/16ok566.jpg`.
#[must_use]
pub fn post_id_from_object_key(key: &str) -> Option<String> {
    let name = file_name(key.trim())?;
    let (stem, _ext) = name.split_once('.')?;
    bare_post_id(stem)
}

/// `t3_` fullname used by the post source for link posts.
#[must_use]
pub fn post_fullname(post_id: &str) -> String {
    if post_id.starts_with("t3_") {
        post_id.to_string()
    } else {
        format!("t3_{post_id}")
    }
}
