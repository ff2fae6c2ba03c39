//! In-memory registry of form sessions
//!
//! Each session carries its captcha, suspicious-event counter and last
//! receipt. The lock is never held across an await point.

use chrono::{DateTime, Duration, Utc};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};
use uuid::Uuid;

use crate::{
    config::SecurityConfig,
    error::{AppError, AppResult},
    security::{RateLimiter, Receipt, SessionContext},
};

struct SessionRegistry {
    sessions: HashMap<Uuid, SessionContext>,
    limiter: RateLimiter,
}

/// Freshly opened session
#[derive(Debug, Clone)]
pub struct StartedSession {
    pub id: Uuid,
    pub captcha_question: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct SessionService {
    inner: Arc<Mutex<SessionRegistry>>,
    ttl: Duration,
}

impl SessionService {
    pub fn new(config: &SecurityConfig) -> Self {
        Self {
            inner: Arc::new(Mutex::new(SessionRegistry {
                sessions: HashMap::new(),
                limiter: RateLimiter::new(
                    config.max_submissions,
                    Duration::minutes(config.window_minutes),
                ),
            })),
            ttl: Duration::minutes(config.session_ttl_minutes),
        }
    }

    fn lock(&self) -> AppResult<MutexGuard<'_, SessionRegistry>> {
        self.inner
            .lock()
            .map_err(|_| AppError::Internal("session registry lock poisoned".to_string()))
    }

    fn prune(&self, registry: &mut SessionRegistry, now: DateTime<Utc>) {
        let ttl = self.ttl;
        let expired: Vec<Uuid> = registry
            .sessions
            .values()
            .filter(|ctx| now - ctx.last_seen >= ttl)
            .map(|ctx| ctx.id)
            .collect();

        for id in expired {
            registry.sessions.remove(&id);
            registry.limiter.forget(&id.to_string());
        }
    }

    /// Open a new session with its own captcha
    pub fn start(&self, now: DateTime<Utc>) -> AppResult<StartedSession> {
        let mut registry = self.lock()?;
        self.prune(&mut registry, now);

        let ctx = SessionContext::new(now);
        let started = StartedSession {
            id: ctx.id,
            captcha_question: ctx.captcha_question(),
            expires_at: now + self.ttl,
        };
        registry.sessions.insert(ctx.id, ctx);

        tracing::debug!(session = %started.id, "Session started");
        Ok(started)
    }

    /// Drop a session and everything tied to it
    pub fn end(&self, id: Uuid) -> AppResult<()> {
        let mut registry = self.lock()?;
        registry
            .sessions
            .remove(&id)
            .ok_or_else(|| AppError::NotFound(format!("Session {} not found", id)))?;
        registry.limiter.forget(&id.to_string());
        tracing::debug!(session = %id, "Session ended");
        Ok(())
    }

    /// Run `f` against a live session and the shared rate limiter
    pub fn with_session<T>(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
        f: impl FnOnce(&mut SessionContext, &mut RateLimiter) -> T,
    ) -> AppResult<T> {
        let mut registry = self.lock()?;
        self.prune(&mut registry, now);

        let SessionRegistry { sessions, limiter } = &mut *registry;
        let ctx = sessions
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Session {} not found or expired", id)))?;
        ctx.last_seen = now;
        Ok(f(ctx, limiter))
    }

    /// Current captcha question of a session
    pub fn captcha_question(&self, id: Uuid, now: DateTime<Utc>) -> AppResult<String> {
        self.with_session(id, now, |ctx, _| ctx.captcha_question())
    }

    pub fn store_receipt(&self, id: Uuid, receipt: Receipt) -> AppResult<()> {
        let mut registry = self.lock()?;
        let ctx = registry
            .sessions
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Session {} not found", id)))?;
        ctx.receipt = Some(receipt);
        Ok(())
    }

    /// PDF of the last accepted submission of the session
    pub fn receipt(&self, id: Uuid) -> AppResult<Receipt> {
        let registry = self.lock()?;
        registry
            .sessions
            .get(&id)
            .and_then(|ctx| ctx.receipt.clone())
            .ok_or_else(|| AppError::NotFound("No hay comprobante disponible para esta sesión".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> SessionService {
        SessionService::new(&SecurityConfig::default())
    }

    fn active_sessions(sessions: &SessionService) -> usize {
        sessions.lock().map(|r| r.sessions.len()).unwrap_or_default()
    }

    #[test]
    fn test_start_and_end() {
        let sessions = service();
        let now = Utc::now();
        let started = sessions.start(now).expect("start");
        assert!(started.captcha_question.starts_with("¿Cuánto es"));
        assert_eq!(started.expires_at, now + Duration::minutes(240));
        assert_eq!(active_sessions(&sessions), 1);

        sessions.end(started.id).expect("end");
        assert_eq!(active_sessions(&sessions), 0);
        assert!(matches!(sessions.end(started.id), Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_unknown_session_is_not_found() {
        let result = service().with_session(Uuid::new_v4(), Utc::now(), |_, _| ());
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_expired_sessions_are_pruned() {
        let sessions = service();
        let now = Utc::now();
        let old = sessions.start(now).expect("start");

        let later = now + Duration::minutes(241);
        let result = sessions.with_session(old.id, later, |_, _| ());
        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert_eq!(active_sessions(&sessions), 0);
    }

    #[test]
    fn test_access_refreshes_last_seen() {
        let sessions = service();
        let now = Utc::now();
        let started = sessions.start(now).expect("start");

        let later = now + Duration::minutes(200);
        sessions.with_session(started.id, later, |_, _| ()).expect("alive");
        let much_later = later + Duration::minutes(200);
        assert!(sessions.with_session(started.id, much_later, |_, _| ()).is_ok());
    }

    #[test]
    fn test_receipt_round_trip() {
        let sessions = service();
        let started = sessions.start(Utc::now()).expect("start");
        assert!(matches!(sessions.receipt(started.id), Err(AppError::NotFound(_))));

        sessions
            .store_receipt(
                started.id,
                Receipt {
                    request_id: 42,
                    file_name: "Solicitud_ST_42_20250314.pdf".to_string(),
                    pdf: b"%PDF-1.3".to_vec(),
                },
            )
            .expect("stored");
        let receipt = sessions.receipt(started.id).expect("receipt");
        assert_eq!(receipt.request_id, 42);
    }
}
