//! Media detection helpers for post links.

use url::Url;

/// Which link targets count as images. Matching is on the file extension of
/// the URL path; query string and fragment are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaPolicy {
    extensions: Vec<String>,
    case_sensitive: bool,
}

impl Default for MediaPolicy {
    fn default() -> Self {
        Self::new(
            ["jpg", "jpeg", "png"].iter().map(ToString::to_string),
            false,
        )
    }
}

impl MediaPolicy {
    pub fn new<I, S>(extensions: I, case_sensitive: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let extensions = extensions
            .into_iter()
            .map(Into::into)
            .map(|e: String| e.trim_start_matches('.').to_string())
            .map(|e| if case_sensitive { e } else { e.to_ascii_lowercase() })
            .collect();
        Self {
            extensions,
            case_sensitive,
        }
    }

    #[must_use]
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// `true` when the link points at a recognized image file. A missing or
    /// unparseable extension is simply "not an image".
    #[must_use]
    pub fn is_image(&self, url: &str) -> bool {
        let Some(ext) = file_extension(url) else {
            return false;
        };
        let ext = if self.case_sensitive {
            ext
        } else {
            ext.to_ascii_lowercase()
        };
        self.extensions.iter().any(|allowed| *allowed == ext)
    }
}

fn url_path(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_string(),
    }
}

/// Last non-empty path segment of the link, e.g. `cat.jpg`.
#[must_use]
pub fn file_name(url: &str) -> Option<String> {
    url_path(url)
        .rsplit('/')
        .find(|segment| !segment.is_empty())
        .map(ToString::to_string)
}

/// Extension of the link's file name without the dot.
#[must_use]
pub fn file_extension(url: &str) -> Option<String> {
    let name = file_name(url)?;
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_string())
}

/// Object key the image of `url` is staged under.
#[must_use]
pub fn object_key_for(prefix: &str, url: &str) -> Option<String> {
    let name = file_name(url)?;
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        Some(name)
    } else {
        Some(format!("{prefix}/{name}"))
    }
}

#[must_use]
pub fn content_type_for(key: &str) -> String {
    mime_guess::from_path(key)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}
