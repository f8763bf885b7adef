//! Authentication and per-request header management.
//!
//! The access token is not known at construction time: it arrives from the
//! surrounding authentication layer after login and may be cleared on
//! logout. [`SharedTokenManager`] holds that mutable token behind a lock so
//! one instance can be shared between the session facade and the services.

use http::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use parking_lot::RwLock;
use secrecy::{ExposeSecret, SecretString};
use uuid::Uuid;

/// Header carrying the per-request random id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Header carrying the caller-generated correlation id
pub const CORRELATION_ID_HEADER: &str = "correlation-id";

/// Trait for contributing authentication headers to a request
pub trait AuthManager: Send + Sync {
    /// Add authentication headers to the request.
    ///
    /// A missing token simply contributes nothing; the authentication
    /// failure is deferred to the caller's precondition check or the server.
    fn add_auth_headers(&self, headers: &mut HeaderMap);

    /// Returns whether an access token is currently held
    fn has_token(&self) -> bool;
}

/// Shared bearer-token store.
///
/// The token is process-wide mutable state: set after the user
/// authenticates, cleared on logout.
#[derive(Default)]
pub struct SharedTokenManager {
    token: RwLock<Option<SecretString>>,
}

impl SharedTokenManager {
    /// Create a new manager with no token set
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the access token, replacing any previous one
    pub fn set_token(&self, token: SecretString) {
        *self.token.write() = Some(token);
    }

    /// Discard the access token
    pub fn clear_token(&self) {
        *self.token.write() = None;
    }
}

impl AuthManager for SharedTokenManager {
    fn add_auth_headers(&self, headers: &mut HeaderMap) {
        let guard = self.token.read();
        if let Some(token) = guard.as_ref() {
            match HeaderValue::from_str(&format!("Bearer {}", token.expose_secret())) {
                Ok(mut value) => {
                    value.set_sensitive(true);
                    headers.insert(AUTHORIZATION, value);
                }
                Err(_) => {
                    tracing::warn!("access token contains characters invalid in a header; omitting Authorization");
                }
            }
        }
    }

    fn has_token(&self) -> bool {
        self.token.read().is_some()
    }
}

/// Build the headers for one request.
///
/// Must be called fresh for every request: the `x-request-id` (random UUID)
/// and `correlation-id` (`corr-<epoch-millis>`) are minted per call and
/// never reused.
pub fn request_headers(auth: &dyn AuthManager) -> HeaderMap {
    let mut headers = HeaderMap::new();

    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    // A hyphenated UUID and "corr-<millis>" are always valid header values.
    let request_id = Uuid::new_v4().to_string();
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        headers.insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
    }

    let correlation_id = format!("corr-{}", chrono::Utc::now().timestamp_millis());
    if let Ok(value) = HeaderValue::from_str(&correlation_id) {
        headers.insert(HeaderName::from_static(CORRELATION_ID_HEADER), value);
    }

    auth.add_auth_headers(&mut headers);
    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_headers_without_token() {
        let manager = SharedTokenManager::new();
        let headers = request_headers(&manager);

        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
        assert!(headers.get(REQUEST_ID_HEADER).is_some());
        assert!(headers
            .get(CORRELATION_ID_HEADER)
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("corr-"));
        assert!(headers.get(AUTHORIZATION).is_none());
    }

    #[test]
    fn test_request_headers_with_token() {
        let manager = SharedTokenManager::new();
        manager.set_token(SecretString::new("tok-123".to_string()));

        let headers = request_headers(&manager);
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer tok-123");
    }

    #[test]
    fn test_request_ids_are_unique_per_call() {
        let manager = SharedTokenManager::new();
        let first = request_headers(&manager);
        let second = request_headers(&manager);

        let first_id = first.get(REQUEST_ID_HEADER).unwrap();
        let second_id = second.get(REQUEST_ID_HEADER).unwrap();
        assert!(!first_id.to_str().unwrap().is_empty());
        assert_ne!(first_id, second_id);
    }

    #[test]
    fn test_clear_token_removes_authorization() {
        let manager = SharedTokenManager::new();
        manager.set_token(SecretString::new("tok-123".to_string()));
        assert!(manager.has_token());

        manager.clear_token();
        assert!(!manager.has_token());

        let headers = request_headers(&manager);
        assert!(headers.get(AUTHORIZATION).is_none());
    }
}
