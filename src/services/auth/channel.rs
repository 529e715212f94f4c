//! Where a credential may be found on an inbound request.

use axum::http::{HeaderMap, header};
use axum_extra::extract::cookie::CookieJar;

/// Which channels `protect` is allowed to read a credential from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthMode {
    /// Cookie first, then `Authorization: Bearer`.
    #[default]
    Any,
    Cookie,
    Header,
}

impl AuthMode {
    /// Probe order for this mode; the first channel that yields a credential wins.
    pub fn channels(&self) -> &'static [CredentialChannel] {
        match self {
            AuthMode::Any => &[CredentialChannel::Cookie, CredentialChannel::Header],
            AuthMode::Cookie => &[CredentialChannel::Cookie],
            AuthMode::Header => &[CredentialChannel::Header],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialChannel {
    Cookie,
    Header,
}

impl CredentialChannel {
    pub fn probe(&self, headers: &HeaderMap, cookie_name: &str) -> Option<String> {
        match self {
            CredentialChannel::Cookie => from_cookie(headers, cookie_name),
            CredentialChannel::Header => headers
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .and_then(bearer_token)
                .map(str::to_string),
        }
    }
}

fn from_cookie(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    CookieJar::from_headers(headers)
        .get(cookie_name)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}

/// Extract the credential from an `Authorization` value.
///
/// The scheme match is case-insensitive; the credential is the second
/// whitespace-separated token.
pub fn bearer_token(value: &str) -> Option<&str> {
    const PREFIX: &str = "bearer ";

    let head = value.get(..PREFIX.len())?;
    if !head.eq_ignore_ascii_case(PREFIX) {
        return None;
    }

    value.split_whitespace().nth(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(header::HeaderName, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(name.clone(), HeaderValue::from_static(*value));
        }
        map
    }

    #[test]
    fn bearer_scheme_is_case_insensitive() {
        assert_eq!(bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(bearer_token("bearer abc"), Some("abc"));
        assert_eq!(bearer_token("BEARER abc"), Some("abc"));
        assert_eq!(bearer_token("Bearer   abc  extra"), Some("abc"));
    }

    #[test]
    fn bearer_rejects_other_shapes() {
        assert_eq!(bearer_token("Basic dXNlcjpwdw=="), None);
        assert_eq!(bearer_token("Bearer"), None);
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("Bearerabc"), None);
        assert_eq!(bearer_token(""), None);
    }

    #[test]
    fn mode_probe_order() {
        assert_eq!(
            AuthMode::Any.channels(),
            &[CredentialChannel::Cookie, CredentialChannel::Header]
        );
        assert_eq!(AuthMode::Cookie.channels(), &[CredentialChannel::Cookie]);
        assert_eq!(AuthMode::Header.channels(), &[CredentialChannel::Header]);
        assert_eq!(AuthMode::default(), AuthMode::Any);
    }

    #[test]
    fn cookie_probe_reads_named_cookie() {
        let map = headers(&[(header::COOKIE, "flash=hi||info; token=abc.def.ghi")]);
        assert_eq!(
            CredentialChannel::Cookie.probe(&map, "token").as_deref(),
            Some("abc.def.ghi")
        );
        assert_eq!(CredentialChannel::Cookie.probe(&map, "session"), None);
    }

    #[test]
    fn empty_cookie_is_not_a_credential() {
        let map = headers(&[(header::COOKIE, "token=")]);
        assert_eq!(CredentialChannel::Cookie.probe(&map, "token"), None);
    }

    #[test]
    fn header_probe_reads_bearer() {
        let map = headers(&[(header::AUTHORIZATION, "Bearer abc.def.ghi")]);
        assert_eq!(
            CredentialChannel::Header.probe(&map, "token").as_deref(),
            Some("abc.def.ghi")
        );
        assert_eq!(CredentialChannel::Cookie.probe(&map, "token"), None);
    }
}
