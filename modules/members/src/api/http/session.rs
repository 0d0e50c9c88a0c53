use axum::{
    extract::Request,
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    Extension,
};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "registry_session";

/// Session data created after a successful login
#[derive(Clone, Debug)]
pub struct Session {
    pub created_at: DateTime<Utc>,
}

/// In-memory session store. Sessions expire after the configured TTL.
pub struct SessionStore {
    ttl_hours: i64,
    sessions: RwLock<HashMap<String, Session>>,
}

impl SessionStore {
    pub fn new(ttl_hours: i64) -> Self {
        Self {
            ttl_hours,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Create a new session and return the token
    pub async fn create_session(&self) -> String {
        let token = Uuid::new_v4().to_string();
        let mut sessions = self.sessions.write().await;
        sessions.insert(
            token.clone(),
            Session {
                created_at: Utc::now(),
            },
        );
        token
    }

    /// Get session by token, None when missing or expired
    pub async fn get_session(&self, token: &str) -> Option<Session> {
        let sessions = self.sessions.read().await;
        let session = sessions.get(token)?;

        let elapsed = Utc::now().signed_duration_since(session.created_at);
        if elapsed.num_hours() >= self.ttl_hours {
            return None;
        }

        Some(session.clone())
    }

    /// Delete session (logout)
    pub async fn delete_session(&self, token: &str) {
        let mut sessions = self.sessions.write().await;
        sessions.remove(token);
    }

    /// Drop expired sessions (run periodically)
    pub async fn cleanup_expired(&self) {
        let mut sessions = self.sessions.write().await;
        let now = Utc::now();
        sessions.retain(|_, session| {
            now.signed_duration_since(session.created_at).num_hours() < self.ttl_hours
        });
    }
}

/// Login settings handed to the login handlers. The access key stands in
/// for the external auth subsystem.
#[derive(Clone)]
pub struct AuthSettings {
    pub access_key: Option<String>,
}

/// Pull the session token out of the Cookie header, if any.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE).then(|| value.to_string())
    })
}

/// Middleware guarding the member pages: without a valid session cookie
/// the request is redirected to the login flow, with the original URL
/// carried in `next`.
pub async fn require_session(
    Extension(store): Extension<Arc<SessionStore>>,
    request: Request,
    next: Next,
) -> Response {
    let authed = match session_token(request.headers()) {
        Some(token) => store.get_session(&token).await.is_some(),
        None => false,
    };

    if !authed {
        let wanted = request
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        let target = format!("/login?next={}", urlencoding::encode(wanted));
        return Redirect::to(&target).into_response();
    }

    next.run(request).await
}

/// Set-Cookie value for a fresh session token.
pub fn session_cookie(token: &str) -> String {
    format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax")
}

/// Set-Cookie value that clears the session cookie.
pub fn clear_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; Max-Age=0")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_session_creation_and_lookup() {
        let store = SessionStore::new(24);

        let token = store.create_session().await;
        assert!(!token.is_empty());

        let retrieved = store.get_session(&token).await;
        assert!(retrieved.is_some());

        store.delete_session(&token).await;
        assert!(store.get_session(&token).await.is_none());
    }

    #[tokio::test]
    async fn test_session_expiration() {
        let store = SessionStore::new(24);
        let token = store.create_session().await;

        // Backdate the session past the TTL
        {
            let mut sessions = store.sessions.write().await;
            let session = sessions.get_mut(&token).unwrap();
            session.created_at = Utc::now() - chrono::Duration::hours(25);
        }

        assert!(store.get_session(&token).await.is_none());

        store.cleanup_expired().await;
        assert!(store.sessions.read().await.is_empty());
    }

    #[test]
    fn test_cookie_parsing() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            format!("other=1; {SESSION_COOKIE}=abc123; theme=dark")
                .parse()
                .unwrap(),
        );
        assert_eq!(session_token(&headers).as_deref(), Some("abc123"));

        let empty = HeaderMap::new();
        assert!(session_token(&empty).is_none());
    }
}
