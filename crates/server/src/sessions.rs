//! Per-visitor client state.
//!
//! Every browser gets a `banner_session` cookie holding a random id on its
//! first request. The id keys a [`ClientSession`] (login flag, current view,
//! draft form). Only requests that change state create an entry; idle
//! entries are dropped when new ones are made, and the map is capped.

use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    extract::Request,
    http::{header, HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use client_core::ClientSession;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "banner_session";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VisitorId(pub Uuid);

pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(2 * 60 * 60);
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

struct TrackedSession {
    session: ClientSession,
    last_seen: Instant,
}

struct Sessions {
    entries: HashMap<VisitorId, TrackedSession>,
    idle_timeout: Duration,
    max_sessions: usize,
}

impl Sessions {
    /// Drops sessions idle for longer than the timeout, then the least
    /// recently seen ones until a new entry fits. A session with a
    /// generation in flight is never dropped.
    fn make_room(&mut self, now: Instant) {
        let idle_timeout = self.idle_timeout;
        let before = self.entries.len();
        let mut released_previews = 0;
        self.entries.retain(|_, tracked| {
            let keep = tracked.session.form.is_in_flight()
                || now.saturating_duration_since(tracked.last_seen) < idle_timeout;
            if !keep {
                released_previews += tracked.session.form.images.live_previews();
            }
            keep
        });

        while self.entries.len() >= self.max_sessions {
            let oldest = self
                .entries
                .iter()
                .filter(|(_, tracked)| !tracked.session.form.is_in_flight())
                .min_by_key(|(_, tracked)| tracked.last_seen)
                .map(|(visitor, _)| *visitor);
            let Some(visitor) = oldest else { break };
            if let Some(evicted) = self.entries.remove(&visitor) {
                released_previews += evicted.session.form.images.live_previews();
            }
        }

        let dropped = before - self.entries.len();
        if dropped > 0 {
            debug!(dropped, released_previews, "expired visitor sessions");
        }
    }
}

#[derive(Clone)]
pub struct SessionRegistry {
    inner: Arc<Mutex<Sessions>>,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_IDLE_TIMEOUT, DEFAULT_MAX_SESSIONS)
    }
}

impl SessionRegistry {
    pub fn new(idle_timeout: Duration, max_sessions: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Sessions {
                entries: HashMap::new(),
                idle_timeout,
                max_sessions: max_sessions.max(1),
            })),
        }
    }

    /// Runs `f` against the visitor's session without creating one; an
    /// unknown visitor sees a fresh logged-out session.
    pub async fn read<R>(&self, visitor: VisitorId, f: impl FnOnce(&ClientSession) -> R) -> R {
        let mut sessions = self.inner.lock().await;
        match sessions.entries.get_mut(&visitor) {
            Some(tracked) => {
                tracked.last_seen = Instant::now();
                f(&tracked.session)
            }
            None => f(&ClientSession::default()),
        }
    }

    /// Runs `f` against the visitor's session, creating it on first use.
    /// Keep `f` synchronous and short: the registry is locked while it runs.
    pub async fn with_session<R>(
        &self,
        visitor: VisitorId,
        f: impl FnOnce(&mut ClientSession) -> R,
    ) -> R {
        let mut guard = self.inner.lock().await;
        let sessions = &mut *guard;
        let now = Instant::now();
        if !sessions.entries.contains_key(&visitor) {
            sessions.make_room(now);
        }
        let tracked = sessions
            .entries
            .entry(visitor)
            .or_insert_with(|| TrackedSession {
                session: ClientSession::default(),
                last_seen: now,
            });
        tracked.last_seen = now;
        f(&mut tracked.session)
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.entries.len()
    }
}

pub fn visitor_from_headers(headers: &HeaderMap) -> Option<VisitorId> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|raw| raw.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
        .map(VisitorId)
}

/// Middleware: attaches a [`VisitorId`] to every request and sets the cookie
/// when the browser did not send a usable one.
pub async fn assign_visitor(mut request: Request, next: Next) -> Response {
    let existing = visitor_from_headers(request.headers());
    let visitor = existing.unwrap_or_else(|| VisitorId(Uuid::new_v4()));
    request.extensions_mut().insert(visitor);

    let mut response = next.run(request).await;
    if existing.is_none() {
        debug!(visitor = %visitor.0, "new visitor");
        let cookie = format!(
            "{SESSION_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax",
            visitor.0
        );
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
    }
    response
}

#[cfg(test)]
#[path = "tests/sessions_tests.rs"]
mod tests;
