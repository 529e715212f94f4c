//! One-shot flash messages carried in a single cookie.
//!
//! The cookie value is `message||variant`. A value is written by one request,
//! read by the next one and removed on that read, whether or not it decodes
//! cleanly.

use std::fmt;
use std::str::FromStr;

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Serialize;

pub const DELIMITER: &str = "||";

/// Display category of a flash message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    #[default]
    Primary,
    Secondary,
    Success,
    Danger,
    Warning,
    Info,
    Light,
    Dark,
}

impl Variant {
    pub const ALL: [Variant; 8] = [
        Variant::Primary,
        Variant::Secondary,
        Variant::Success,
        Variant::Danger,
        Variant::Warning,
        Variant::Info,
        Variant::Light,
        Variant::Dark,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Primary => "primary",
            Variant::Secondary => "secondary",
            Variant::Success => "success",
            Variant::Danger => "danger",
            Variant::Warning => "warning",
            Variant::Info => "info",
            Variant::Light => "light",
            Variant::Dark => "dark",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownVariant;

impl FromStr for Variant {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Variant::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or(UnknownVariant)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlashEntry {
    pub message: String,
    pub variant: Variant,
}

pub fn encode(message: &str, variant: Variant) -> String {
    format!("{message}{DELIMITER}{variant}")
}

/// Decode a cookie value. Never fails: anything unrecognized degrades to the
/// default variant.
pub fn decode(value: &str) -> FlashEntry {
    let segments: Vec<&str> = value.split(DELIMITER).collect();
    let message = segments.first().copied().unwrap_or_default().to_string();

    let variant = match segments.as_slice() {
        [_, .., last] => last.parse().unwrap_or_default(),
        _ => Variant::default(),
    };

    FlashEntry { message, variant }
}

/// Reads and writes the flash cookie on a request's cookie jar.
#[derive(Debug, Clone)]
pub struct FlashChannel {
    cookie_name: String,
    secure: bool,
}

impl FlashChannel {
    pub fn new(cookie_name: impl Into<String>, secure: bool) -> Self {
        Self {
            cookie_name: cookie_name.into(),
            secure,
        }
    }

    pub fn write(&self, jar: CookieJar, message: &str, variant: Variant) -> CookieJar {
        let cookie = Cookie::build((self.cookie_name.clone(), encode(message, variant)))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure);

        jar.add(cookie)
    }

    /// Take the pending flash entry, if any.
    ///
    /// The cookie is removed before the value is decoded, so the entry is shown
    /// at most once.
    pub fn read_and_clear(&self, jar: CookieJar) -> (CookieJar, Option<FlashEntry>) {
        let raw = jar.get(&self.cookie_name).map(|c| c.value().to_string());
        let jar = jar.remove(Cookie::build((self.cookie_name.clone(), "")).path("/"));

        (jar, raw.as_deref().map(decode))
    }
}
