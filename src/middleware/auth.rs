use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Duration, Utc};
use rand_core::{OsRng, RngCore};
use serde_json::json;
use sha2::{Digest, Sha256};

use crate::{error::AppError, routes::AppState};

pub const SESSION_DURATION_HOURS: i64 = 24;

/// Expired entries are only swept once the store grows past this size.
const CLEANUP_THRESHOLD: usize = 100;

/// A freshly issued session.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// In-memory bearer-token store. Cloning shares the same map.
///
/// Tokens are keyed by their SHA-256 hash so the raw value never sits in the map.
/// Everything is lost on restart.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    sessions: Arc<Mutex<HashMap<String, DateTime<Utc>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_session(&self) -> Session {
        self.create_session_at(Utc::now())
    }

    pub fn create_session_at(&self, now: DateTime<Utc>) -> Session {
        let token = generate_token();
        let expires_at = now + Duration::hours(SESSION_DURATION_HOURS);

        let mut sessions = self.lock();
        sessions.insert(hash_token(&token), expires_at);

        if sessions.len() > CLEANUP_THRESHOLD {
            sessions.retain(|_, expiry| now <= *expiry);
            tracing::debug!(remaining = sessions.len(), "Evicted expired sessions");
        }

        Session { token, expires_at }
    }

    pub fn validate_session(&self, token: &str) -> bool {
        self.validate_session_at(token, Utc::now())
    }

    pub fn validate_session_at(&self, token: &str, now: DateTime<Utc>) -> bool {
        let key = hash_token(token);
        let mut sessions = self.lock();

        match sessions.get(&key) {
            Some(expires_at) if now > *expires_at => {
                sessions.remove(&key);
                false
            }
            Some(_) => true,
            None => false,
        }
    }

    pub fn delete_session(&self, token: &str) {
        self.lock().remove(&hash_token(token));
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, DateTime<Utc>>> {
        // A poisoned map is still a valid map.
        self.sessions.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Compares a login attempt against the configured admin password.
///
/// Both sides are hashed first so the comparison does not short-circuit on the
/// first differing byte of the secret.
pub fn verify_password(candidate: &str, expected: Option<&str>) -> Result<bool, AppError> {
    let expected = expected.ok_or_else(|| {
        AppError::Internal("ADMIN_PASSWORD environment variable is not set".to_string())
    })?;

    let a = Sha256::digest(candidate.as_bytes());
    let b = Sha256::digest(expected.as_bytes());
    let diff = a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y));

    Ok(diff == 0)
}

pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// 32 random bytes, hex encoded.
fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .filter(|token| !token.is_empty())
}

/// Extractor for admin-only handlers. Carries the presented token so logout can drop it.
#[derive(Debug, Clone)]
pub struct AdminSession {
    pub token: String,
}

impl FromRequestParts<AppState> for AdminSession {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or(AuthError::MissingToken)?;

        if !state.sessions.validate_session(token) {
            return Err(AuthError::InvalidToken);
        }

        Ok(AdminSession {
            token: token.to_string(),
        })
    }
}

#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (code, message) = match self {
            AuthError::MissingToken => ("missing_token", "Authorization token is required"),
            AuthError::InvalidToken => ("invalid_token", "Invalid or expired session"),
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (StatusCode::UNAUTHORIZED, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn issued_token_validates() {
        let store = SessionStore::new();
        let session = store.create_session();

        assert_eq!(session.token.len(), 64);
        assert!(store.validate_session(&session.token));
        assert!(!store.validate_session("not-a-token"));
    }

    #[test]
    fn expired_token_is_rejected_and_removed() {
        let store = SessionStore::new();
        let issued_at = Utc::now() - Duration::hours(SESSION_DURATION_HOURS + 1);
        let session = store.create_session_at(issued_at);

        assert_eq!(store.len(), 1);
        assert!(!store.validate_session(&session.token));
        assert!(store.is_empty());
    }

    #[test]
    fn token_is_valid_until_expiry() {
        let store = SessionStore::new();
        let now = Utc::now();
        let session = store.create_session_at(now);

        assert!(store.validate_session_at(&session.token, now + Duration::hours(23)));
        assert!(!store.validate_session_at(&session.token, now + Duration::hours(25)));
    }

    #[test]
    fn logout_invalidates_token() {
        let store = SessionStore::new();
        let session = store.create_session();

        store.delete_session(&session.token);
        assert!(!store.validate_session(&session.token));
    }

    #[test]
    fn expired_sessions_are_swept_past_threshold() {
        let store = SessionStore::new();
        let old = Utc::now() - Duration::hours(48);
        for _ in 0..CLEANUP_THRESHOLD {
            store.create_session_at(old);
        }
        assert_eq!(store.len(), CLEANUP_THRESHOLD);

        let fresh = store.create_session();
        assert_eq!(store.len(), 1);
        assert!(store.validate_session(&fresh.token));
    }

    #[test]
    fn password_check() {
        assert!(verify_password("hunter2", Some("hunter2")).unwrap());
        assert!(!verify_password("hunter3", Some("hunter2")).unwrap());
        assert!(verify_password("hunter2", None).is_err());
    }

    #[test]
    fn bearer_token_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc123"));
        assert_eq!(bearer_token(&headers), Some("abc123"));
    }
}
