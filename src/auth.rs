//! Write access control
//!
//! Reads are always public. Writes go through a `WriteGuard` checked before
//! the body is read. The default guard lets every write through; deployments
//! that need a shared secret configure `BearerToken`.

use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;

pub trait WriteGuard: Send + Sync {
    /// Whether a write carrying `headers` may proceed.
    fn authorize(&self, headers: &HeaderMap) -> bool;
}

/// Accepts every write.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenAccess;

impl WriteGuard for OpenAccess {
    fn authorize(&self, _headers: &HeaderMap) -> bool {
        true
    }
}

/// Accepts writes carrying `Authorization: Bearer <token>`.
#[derive(Clone)]
pub struct BearerToken {
    token: String,
}

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into() }
    }
}

impl std::fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BearerToken").field("token", &"<redacted>").finish()
    }
}

impl WriteGuard for BearerToken {
    fn authorize(&self, headers: &HeaderMap) -> bool {
        headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .is_some_and(|presented| constant_time_eq(presented.trim().as_bytes(), self.token.as_bytes()))
    }
}

/// Compares without short-circuiting on the first differing byte.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(auth: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(auth).unwrap());
        headers
    }

    #[test]
    fn test_open_access() {
        assert!(OpenAccess.authorize(&HeaderMap::new()));
    }

    #[test]
    fn test_bearer_token() {
        let guard = BearerToken::new("s3cret");
        assert!(guard.authorize(&headers_with("Bearer s3cret")));
        assert!(!guard.authorize(&headers_with("Bearer s3cre")));
        assert!(!guard.authorize(&headers_with("Bearer s3cret2")));
        assert!(!guard.authorize(&headers_with("Basic s3cret")));
        assert!(!guard.authorize(&HeaderMap::new()));
    }

    #[test]
    fn test_debug_redacts_token() {
        let printed = format!("{:?}", BearerToken::new("s3cret"));
        assert!(!printed.contains("s3cret"));
    }
}
