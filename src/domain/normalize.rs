//! URL normalization applied before a URL reaches the filter chain.

use url::Url;

use super::error::UrlError;

/// Normalize a user-supplied URL.
///
/// Defaults the scheme to `https`, requires a host, and trims trailing
/// slashes from the path.
pub fn normalize_url(raw: &str) -> Result<String, UrlError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(UrlError::Empty);
    }

    let with_scheme = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("https://{}", raw)
    };

    let mut parsed = Url::parse(&with_scheme)?;
    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost);
    }

    let trimmed = parsed.path().trim_end_matches('/').to_string();
    parsed.set_path(&trimmed);

    let mut normalized = parsed.to_string();
    // Special schemes always serialize a root path as "/".
    if parsed.path() == "/" && parsed.query().is_none() && parsed.fragment().is_none() {
        normalized.pop();
    }
    Ok(normalized)
}
