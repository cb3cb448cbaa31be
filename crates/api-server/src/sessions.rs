use chrono::{DateTime, Utc};
use dashmap::DashMap;
use uuid::Uuid;

use crate::auth::hash_token;
use crate::directory::{Role, User};

/// Authenticated caller, inserted into request extensions by the auth middleware.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: u64,
    pub email: String,
    pub role: Role,
    pub expires_at: DateTime<Utc>,
}

/// Bearer-token sessions keyed by the SHA-256 of the token.
/// Raw tokens are only ever held by the client.
pub struct SessionStore {
    sessions: DashMap<String, Session>,
    ttl: chrono::Duration,
}

impl SessionStore {
    pub fn new(ttl: chrono::Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl,
        }
    }

    /// Open a session for `user` and return its bearer token.
    pub fn issue(&self, user: &User) -> String {
        let token = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());
        let session = Session {
            user_id: user.id,
            email: user.email.clone(),
            role: user.role,
            expires_at: Utc::now() + self.ttl,
        };
        self.sessions.insert(hash_token(&token), session);
        token
    }

    /// Look up a live session. Expired sessions are dropped on access.
    pub fn validate(&self, token: &str) -> Option<Session> {
        let key = hash_token(token);
        let session = self.sessions.get(&key)?.clone();
        if session.expires_at <= Utc::now() {
            self.sessions.remove(&key);
            return None;
        }
        Some(session)
    }

    pub fn revoke(&self, token: &str) -> bool {
        self.sessions.remove(&hash_token(token)).is_some()
    }

    /// Remove every expired session. Called periodically by a background task.
    pub fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let before = self.sessions.len();
        self.sessions.retain(|_, session| session.expires_at > now);
        before - self.sessions.len()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
