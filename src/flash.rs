//! One-shot toast messages
//!
//! A mutation sets the `flash` cookie and redirects; the next page render
//! takes the message out of the cookie and shows it once.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const FLASH_COOKIE: &str = "flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Error,
            message: message.into(),
        }
    }
}

/// Queue a toast for the next page
pub fn set(jar: CookieJar, flash: Flash) -> CookieJar {
    let value = match serde_json::to_string(&flash) {
        Ok(value) => value,
        Err(e) => {
            debug!("Flash not serializable: {}", e);
            return jar;
        }
    };

    jar.add(
        Cookie::build((FLASH_COOKIE, value))
            .path("/")
            .same_site(SameSite::Lax)
            .http_only(true)
            .build(),
    )
}

/// Take the queued toast, clearing the cookie
pub fn take(jar: CookieJar) -> (CookieJar, Option<Flash>) {
    let Some(cookie) = jar.get(FLASH_COOKIE) else {
        return (jar, None);
    };

    let flash = serde_json::from_str(cookie.value()).ok();

    let mut removal = Cookie::build((FLASH_COOKIE, "")).path("/").build();
    removal.make_removal();

    (jar.add(removal), flash)
}
