//! HTTP Basic Authentication Middleware
//!
//! Guards the business routes with a single configured credential pair.
//! In the test environment every request is admitted.

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::prelude::*;
use std::sync::Arc;
use subtle::ConstantTimeEq;

/// Challenge sent with every 401.
const CHALLENGE: &str = "Basic realm=\"Authorization Required\"";

/// Configured credentials for the business routes.
#[derive(Clone)]
pub struct BasicAuth {
    username: String,
    password: String,
    bypass: bool,
}

impl BasicAuth {
    /// Require the given username and password.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            bypass: false,
        }
    }

    /// Admit every request (test environment).
    pub fn bypass() -> Self {
        Self {
            username: String::new(),
            password: String::new(),
            bypass: true,
        }
    }

    pub fn is_bypassed(&self) -> bool {
        self.bypass
    }

    /// Check an `Authorization` header value.
    pub fn verify(&self, authorization: Option<&str>) -> bool {
        if self.bypass {
            return true;
        }

        let Some((username, password)) = authorization.and_then(decode_basic) else {
            return false;
        };

        let user_ok = username.as_bytes().ct_eq(self.username.as_bytes());
        let pass_ok = password.as_bytes().ct_eq(self.password.as_bytes());
        bool::from(user_ok & pass_ok)
    }
}

/// Split `Basic <base64(user:pass)>` into its parts.
fn decode_basic(value: &str) -> Option<(String, String)> {
    let (scheme, encoded) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }

    let decoded = BASE64_STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}

/// Axum middleware rejecting requests without valid credentials.
pub async fn require_basic_auth(
    State(auth): State<Arc<BasicAuth>>,
    request: Request,
    next: Next,
) -> Response {
    let authorization = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    if auth.verify(authorization) {
        return next.run(request).await;
    }

    tracing::warn!(
        path = %request.uri().path(),
        has_header = authorization.is_some(),
        "rejected request with invalid basic auth credentials"
    );

    let mut response = StatusCode::UNAUTHORIZED.into_response();
    response.headers_mut().insert(
        header::WWW_AUTHENTICATE,
        HeaderValue::from_static(CHALLENGE),
    );
    response
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn header_for(user: &str, pass: &str) -> String {
        format!("Basic {}", BASE64_STANDARD.encode(format!("{}:{}", user, pass)))
    }

    #[test]
    fn test_verify_valid_credentials() {
        let auth = BasicAuth::new("admin", "hunter2");
        assert!(auth.verify(Some(&header_for("admin", "hunter2"))));
    }

    #[test]
    fn test_verify_wrong_password() {
        let auth = BasicAuth::new("admin", "hunter2");
        assert!(!auth.verify(Some(&header_for("admin", "hunter3"))));
        assert!(!auth.verify(Some(&header_for("admin", "hunter"))));
    }

    #[test]
    fn test_verify_wrong_username() {
        let auth = BasicAuth::new("admin", "hunter2");
        assert!(!auth.verify(Some(&header_for("root", "hunter2"))));
    }

    #[test]
    fn test_verify_missing_header() {
        let auth = BasicAuth::new("admin", "hunter2");
        assert!(!auth.verify(None));
    }

    #[test]
    fn test_verify_malformed_headers() {
        let auth = BasicAuth::new("admin", "hunter2");
        assert!(!auth.verify(Some("Bearer abc")));
        assert!(!auth.verify(Some("Basic")));
        assert!(!auth.verify(Some("Basic !!!not-base64!!!")));
        // "adminhunter2" has no delimiter
        assert!(!auth.verify(Some(&format!(
            "Basic {}",
            BASE64_STANDARD.encode("adminhunter2")
        ))));
    }

    #[test]
    fn test_verify_scheme_case_insensitive() {
        let auth = BasicAuth::new("admin", "hunter2");
        let value = header_for("admin", "hunter2").replacen("Basic", "basic", 1);
        assert!(auth.verify(Some(&value)));
    }

    #[test]
    fn test_password_may_contain_colon() {
        let auth = BasicAuth::new("admin", "a:b:c");
        assert!(auth.verify(Some(&header_for("admin", "a:b:c"))));
    }

    #[test]
    fn test_bypass_admits_everything() {
        let auth = BasicAuth::bypass();
        assert!(auth.is_bypassed());
        assert!(auth.verify(None));
        assert!(auth.verify(Some("garbage")));
    }

    #[test]
    fn test_decode_basic() {
        assert_eq!(
            decode_basic(&header_for("u", "p")),
            Some(("u".to_string(), "p".to_string()))
        );
        assert_eq!(decode_basic("Digest abc"), None);
    }
}
