//! Cookie header parsing and `Set-Cookie` values for the session.

use axum::http::HeaderMap;
use axum::http::header::COOKIE;

pub const SESSION_COOKIE: &str = "session";
pub const USERNAME_COOKIE: &str = "username";

/// Find a cookie value by name across all `Cookie` headers.
pub fn find<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

fn build(name: &str, value: &str, max_age: i64, http_only: bool, secure: bool) -> String {
    let mut cookie = format!("{name}={value}; Path=/; Max-Age={max_age}; SameSite=Strict");
    if http_only {
        cookie.push_str("; HttpOnly");
    }
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Cookies set on sign-in: the HttpOnly token and a script-readable username.
pub fn sign_in(token: &str, username: &str, max_age: i64, secure: bool) -> [String; 2] {
    [
        build(SESSION_COOKIE, token, max_age, true, secure),
        build(USERNAME_COOKIE, username, max_age, false, secure),
    ]
}

/// Cookies that expire both sign-in cookies immediately.
pub fn sign_out(secure: bool) -> [String; 2] {
    [
        build(SESSION_COOKIE, "", 0, true, secure),
        build(USERNAME_COOKIE, "", 0, false, secure),
    ]
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn finds_cookie_among_many() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("a=1; session=tok"));
        headers.append(COOKIE, HeaderValue::from_static("username=alice"));
        assert_eq!(find(&headers, "session"), Some("tok"));
        assert_eq!(find(&headers, "username"), Some("alice"));
        assert_eq!(find(&headers, "missing"), None);
    }

    #[test]
    fn session_cookie_is_http_only() {
        let [session, username] = sign_in("tok", "alice", 60, true);
        assert!(session.starts_with("session=tok;"));
        assert!(session.contains("HttpOnly"));
        assert!(session.contains("Secure"));
        assert!(!username.contains("HttpOnly"));
    }

    #[test]
    fn sign_out_expires_cookies() {
        for cookie in sign_out(false) {
            assert!(cookie.contains("Max-Age=0"));
            assert!(!cookie.contains("Secure"));
        }
    }
}
