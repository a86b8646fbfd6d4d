//! Per-visitor memory of the last form prediction, used to show the result
//! after the Post/Redirect/Get round trip.

use std::time::{Duration, Instant};

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use dashmap::DashMap;
use iris::PredictionResult;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "iris_session";

#[derive(Debug, Clone)]
struct SessionEntry {
    result: PredictionResult,
    stored_at: Instant,
}

#[derive(Debug)]
pub struct SessionStore {
    entries: DashMap<Uuid, SessionEntry>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// The last prediction stored for `id`, unless it has expired.
    pub fn last_prediction(&self, id: &Uuid) -> Option<PredictionResult> {
        let entry = self.entries.get(id)?;
        if entry.stored_at.elapsed() >= self.ttl {
            return None;
        }
        Some(entry.result.clone())
    }

    pub fn store(&self, id: Uuid, result: PredictionResult) {
        self.purge_expired();
        self.entries.insert(
            id,
            SessionEntry {
                result,
                stored_at: Instant::now(),
            },
        );
    }

    pub fn purge_expired(&self) {
        let ttl = self.ttl;
        self.entries.retain(|_, entry| entry.stored_at.elapsed() < ttl);
    }
}

/// The session id carried by the request cookies, ignoring malformed values.
pub fn session_id(jar: &CookieJar) -> Option<Uuid> {
    jar.get(SESSION_COOKIE)
        .and_then(|cookie| Uuid::parse_str(cookie.value_trimmed()).ok())
}

pub fn session_cookie(id: &Uuid) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, id.as_hyphenated().to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}
