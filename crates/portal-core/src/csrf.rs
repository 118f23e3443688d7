//! Anti-forgery (CSRF) token discovery
//!
//! State-changing requests to the portal must carry the session's CSRF token.
//! The token is looked up, in priority order, in the `csrftoken` cookie, a
//! `<meta name="csrf-token">` tag, and the hidden `csrfmiddlewaretoken` form
//! field of a bootstrap page.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{PortalError, PortalResult};

/// Cookie the portal stores the token in
pub const CSRF_COOKIE_NAME: &str = "csrftoken";
/// Header mutating requests carry the token in
pub const CSRF_HEADER_NAME: &str = "X-CSRFToken";

static META_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<meta\b[^>]*\bname\s*=\s*["']csrf-token["'][^>]*>"#)
        .expect("valid meta tag regex")
});

static FORM_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<input\b[^>]*\bname\s*=\s*["']csrfmiddlewaretoken["'][^>]*>"#)
        .expect("valid form field regex")
});

static CONTENT_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)\bcontent\s*=\s*["']([^"']*)["']"#).expect("valid content regex")
});

static VALUE_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)\bvalue\s*=\s*["']([^"']*)["']"#).expect("valid value regex")
});

/// Where a token was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsrfSource {
    Configured,
    Cookie,
    MetaTag,
    FormField,
}

/// Anti-forgery token attached to mutating requests
#[derive(Clone, PartialEq, Eq)]
pub struct CsrfToken {
    value: String,
    source: CsrfSource,
}

impl CsrfToken {
    pub fn new(value: impl Into<String>, source: CsrfSource) -> Self {
        Self {
            value: value.into(),
            source,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn source(&self) -> CsrfSource {
        self.source
    }
}

// Keep the secret out of logs.
impl fmt::Debug for CsrfToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CsrfToken")
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

/// Find the token in cookie headers first, then in the page markup.
///
/// `cookie_headers` may hold `Set-Cookie` values or a `Cookie` request header;
/// both are scanned for `csrftoken=`.
pub fn discover_csrf_token<'a, I>(cookie_headers: I, html: Option<&str>) -> PortalResult<CsrfToken>
where
    I: IntoIterator<Item = &'a str>,
{
    for header in cookie_headers {
        if let Some(value) = cookie_value(header, CSRF_COOKIE_NAME) {
            return Ok(CsrfToken::new(value, CsrfSource::Cookie));
        }
    }

    if let Some(html) = html {
        if let Some(value) = tag_attribute(&META_TAG, &CONTENT_ATTR, html) {
            return Ok(CsrfToken::new(value, CsrfSource::MetaTag));
        }
        if let Some(value) = tag_attribute(&FORM_FIELD, &VALUE_ATTR, html) {
            return Ok(CsrfToken::new(value, CsrfSource::FormField));
        }
    }

    Err(PortalError::MissingCsrfToken)
}

/// Value of cookie `name` in a `Cookie` or `Set-Cookie` header.
pub fn cookie_value(header: &str, name: &str) -> Option<String> {
    header.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key.trim() == name && !value.trim().is_empty())
            .then(|| value.trim().trim_matches('"').to_string())
    })
}

fn tag_attribute(tag: &Regex, attr: &Regex, html: &str) -> Option<String> {
    tag.find_iter(html).find_map(|m| {
        attr.captures(m.as_str())
            .and_then(|caps| caps.get(1))
            .map(|value| value.as_str().to_string())
            .filter(|value| !value.is_empty())
    })
}
