//! Basic-auth request stage

use axum::http::{header, HeaderMap};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

use crate::config::AdminCredentials;
use crate::error::ApiError;

/// Compare two byte strings in time independent of where they differ
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    let length_differs = u8::from(a.len() != b.len());
    let mismatch = a
        .iter()
        .zip(b.iter())
        .fold(length_differs, |acc, (x, y)| acc | (x ^ y));
    mismatch == 0
}

/// Decode `Authorization: Basic ...` into username and password
pub fn parse_basic(headers: &HeaderMap) -> Option<(String, String)> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, encoded) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }

    let decoded = BASE64.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}

/// Accept the request only if it carries the admin credentials
///
/// Username and password are both compared on every call.
pub fn authenticate(headers: &HeaderMap, admin: &AdminCredentials) -> Result<String, ApiError> {
    let (username, password) = parse_basic(headers).ok_or(ApiError::Unauthorized)?;

    let username_ok = constant_time_eq(username.as_bytes(), admin.username.as_bytes());
    let password_ok = constant_time_eq(password.as_bytes(), admin.password.as_bytes());
    if username_ok & password_ok {
        Ok(username)
    } else {
        tracing::warn!("rejected credentials");
        Err(ApiError::Unauthorized)
    }
}
