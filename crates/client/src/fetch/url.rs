//! Request URL resolution for consistent cache identity.

use url::Url;

/// Error type for URL resolution failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

impl From<UrlError> for momentum_core::Error {
    fn from(err: UrlError) -> Self {
        momentum_core::Error::InvalidUrl(err.to_string())
    }
}

/// Resolve a path or URL against the app scope into its canonical form.
///
/// Normalization steps:
/// 1. Trim leading/trailing whitespace
/// 2. Resolve relative input (`./app.js`, `/app.js`, `app.js`) against `scope`;
///    absolute URLs are taken as-is
/// 3. Require http or https
/// 4. Lowercase the host
/// 5. Remove fragment (#...)
/// 6. Keep query string intact (do not reorder)
pub fn resolve(scope: &Url, input: &str) -> Result<Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let mut parsed = scope.join(trimmed).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }

    if let Some(host) = parsed.host_str().map(str::to_lowercase) {
        parsed
            .set_host(Some(&host))
            .map_err(|e| UrlError::InvalidUrl(e.to_string()))?;
    }

    parsed.set_fragment(None);

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope() -> Url {
        Url::parse("http://app.test/momentum/").unwrap()
    }

    #[test]
    fn test_resolve_dot_relative() {
        let url = resolve(&scope(), "./app.js").unwrap();
        assert_eq!(url.as_str(), "http://app.test/momentum/app.js");
    }

    #[test]
    fn test_resolve_bare_relative() {
        assert_eq!(resolve(&scope(), "app.js").unwrap(), resolve(&scope(), "./app.js").unwrap());
    }

    #[test]
    fn test_resolve_scope_root() {
        let url = resolve(&scope(), "./").unwrap();
        assert_eq!(url.as_str(), "http://app.test/momentum/");
    }

    #[test]
    fn test_resolve_absolute_path() {
        let url = resolve(&scope(), "/a.js").unwrap();
        assert_eq!(url.as_str(), "http://app.test/a.js");
    }

    #[test]
    fn test_resolve_absolute_url_and_lowercase_host() {
        let url = resolve(&scope(), "HTTPS://CDN.EXAMPLE.COM/font.woff2").unwrap();
        assert_eq!(url.as_str(), "https://cdn.example.com/font.woff2");
    }

    #[test]
    fn test_resolve_remove_fragment_keep_query() {
        let url = resolve(&scope(), "./index.html?b=2&a=1#habits").unwrap();
        assert_eq!(url.query(), Some("b=2&a=1"));
        assert_eq!(url.fragment(), None);
    }

    #[test]
    fn test_resolve_trim_whitespace() {
        let url = resolve(&scope(), "  ./styles.css  ").unwrap();
        assert_eq!(url.as_str(), "http://app.test/momentum/styles.css");
    }

    #[test]
    fn test_resolve_unsupported_scheme() {
        let result = resolve(&scope(), "file:///etc/passwd");
        assert!(matches!(result, Err(UrlError::UnsupportedScheme(_))));
    }

    #[test]
    fn test_resolve_empty() {
        assert!(matches!(resolve(&scope(), ""), Err(UrlError::Empty)));
        assert!(matches!(resolve(&scope(), "   "), Err(UrlError::Empty)));
    }
}
