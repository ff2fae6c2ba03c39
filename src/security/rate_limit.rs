//! Sliding-window rate limiter keyed by session

use chrono::{DateTime, Duration, Utc};
use std::collections::{HashMap, VecDeque};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Has alcanzado el límite de {max} solicitudes por hora. Intenta en {retry_after_minutes} minutos.")]
pub struct RateLimited {
    pub max: usize,
    pub retry_after_minutes: i64,
}

/// Accepted submissions per key within a sliding window
#[derive(Debug)]
pub struct RateLimiter {
    max: usize,
    window: Duration,
    entries: HashMap<String, VecDeque<DateTime<Utc>>>,
}

impl RateLimiter {
    pub fn new(max: usize, window: Duration) -> Self {
        Self {
            max,
            window,
            entries: HashMap::new(),
        }
    }

    /// Fails when `key` already used every slot of the current window
    pub fn check(&mut self, key: &str, now: DateTime<Utc>) -> Result<(), RateLimited> {
        let Some(history) = self.entries.get_mut(key) else {
            return Ok(());
        };

        while history.front().is_some_and(|t| now - *t >= self.window) {
            history.pop_front();
        }

        if history.len() < self.max {
            return Ok(());
        }

        let retry_after_minutes = history
            .front()
            .map(|oldest| (*oldest + self.window - now).num_minutes().max(1))
            .unwrap_or(1);

        Err(RateLimited {
            max: self.max,
            retry_after_minutes,
        })
    }

    pub fn record(&mut self, key: &str, now: DateTime<Utc>) {
        self.entries.entry(key.to_string()).or_default().push_back(now);
    }

    pub fn forget(&mut self, key: &str) {
        self.entries.remove(key);
    }
}
