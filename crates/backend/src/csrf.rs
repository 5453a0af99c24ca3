//! CSRF token lookup from a `Cookie`-style header string.

/// Cookie the backend issues the token under.
pub const CSRF_COOKIE_NAME: &str = "csrftoken";

/// Header every mutating request carries the token in.
pub const CSRF_HEADER: &str = "X-CSRFToken";

/// Returns the URL-decoded value of the `csrftoken` cookie, if present.
///
/// `cookies` is the raw `name=value; name=value` string. The first matching
/// cookie wins, as in a browser's `document.cookie`.
#[must_use]
pub fn csrf_token_from_cookies(cookies: &str) -> Option<String> {
    cookie_value(cookies, CSRF_COOKIE_NAME)
}

fn cookie_value(cookies: &str, name: &str) -> Option<String> {
    cookies
        .split(';')
        .map(str::trim)
        .find_map(|pair| pair.strip_prefix(name)?.strip_prefix('='))
        .map(decode_component)
}

// form_urlencoded treats `+` as a space; cookie values keep it literal.
fn decode_component(raw: &str) -> String {
    let escaped = raw.replace('+', "%2B");
    url::form_urlencoded::parse(format!("v={escaped}").as_bytes())
        .next()
        .map_or_else(|| raw.to_owned(), |(_, value)| value.into_owned())
}
