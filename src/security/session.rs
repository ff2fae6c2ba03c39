//! Per-session security state

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::captcha::Captcha;

/// PDF summary of the last accepted submission, kept for re-download
#[derive(Debug, Clone)]
pub struct Receipt {
    pub request_id: i32,
    pub file_name: String,
    pub pdf: Vec<u8>,
}

/// Everything the server remembers about one form session
#[derive(Debug)]
pub struct SessionContext {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    captcha: Captcha,
    suspicious_events: u32,
    blocked: bool,
    pub receipt: Option<Receipt>,
}

impl SessionContext {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self::with_captcha(now, Captcha::generate())
    }

    pub fn with_captcha(now: DateTime<Utc>, captcha: Captcha) -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: now,
            last_seen: now,
            captcha,
            suspicious_events: 0,
            blocked: false,
            receipt: None,
        }
    }

    /// Key under which the rate limiter tracks this session
    pub fn rate_limit_key(&self) -> String {
        self.id.to_string()
    }

    pub fn captcha_question(&self) -> String {
        self.captcha.question()
    }

    pub fn check_captcha(&self, answer: &str) -> bool {
        self.captcha.check(answer)
    }

    /// A challenge is answered at most once successfully
    pub fn rotate_captcha(&mut self) {
        self.captcha = Captcha::generate();
    }

    /// Count a failed check; returns true once the session is blocked
    pub fn record_suspicious(&mut self, max_events: u32) -> bool {
        self.suspicious_events += 1;
        if self.suspicious_events >= max_events {
            self.blocked = true;
        }
        self.blocked
    }

    pub fn suspicious_events(&self) -> u32 {
        self.suspicious_events
    }

    pub fn is_blocked(&self) -> bool {
        self.blocked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocked_on_third_event() {
        let mut ctx = SessionContext::with_captcha(Utc::now(), Captcha::new(1, 1));
        assert!(!ctx.record_suspicious(3));
        assert!(!ctx.record_suspicious(3));
        assert!(ctx.record_suspicious(3));
        assert!(ctx.is_blocked());
        assert_eq!(ctx.suspicious_events(), 3);
    }

    #[test]
    fn test_captcha_answer() {
        let ctx = SessionContext::with_captcha(Utc::now(), Captcha::new(4, 5));
        assert_eq!(ctx.captcha_question(), "¿Cuánto es 4 + 5?");
        assert!(ctx.check_captcha("9"));
    }
}
