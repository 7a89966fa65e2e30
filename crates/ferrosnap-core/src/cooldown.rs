//! Per-adapter eligibility clock.
//!
//! After an adapter reports a rate limit it is ineligible until its
//! cooldown elapses. The router consults this clock before every attempt
//! and skips an ineligible adapter instead of sleeping. All reads and
//! read-modify-write updates happen under a single lock acquisition, and
//! the lock is never held across an `.await`.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

use crate::ProviderId;

/// Shared "next eligible time" per adapter.
#[derive(Debug, Default)]
pub struct EligibilityClock {
    next_eligible: Mutex<HashMap<ProviderId, Instant>>,
}

impl EligibilityClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remaining wait before `provider` may be called, or `None` when it is
    /// eligible now.
    pub fn remaining(&self, provider: ProviderId) -> Option<Duration> {
        let now = Instant::now();
        let mut next_eligible = self.lock();
        match next_eligible.get(&provider) {
            Some(&until) if until > now => Some(until - now),
            Some(_) => {
                next_eligible.remove(&provider);
                None
            }
            None => None,
        }
    }

    /// Makes `provider` ineligible for at least `cooldown` from now. An
    /// existing, later deadline is kept. Returns the effective deadline.
    pub fn defer(&self, provider: ProviderId, cooldown: Duration) -> Instant {
        let candidate = Instant::now() + cooldown;
        let mut next_eligible = self.lock();
        let deadline = next_eligible
            .entry(provider)
            .and_modify(|until| *until = (*until).max(candidate))
            .or_insert(candidate);
        *deadline
    }

    /// Adapters currently cooling down, with their remaining wait.
    pub fn cooling_down(&self) -> Vec<(ProviderId, Duration)> {
        let now = Instant::now();
        let mut entries = self
            .lock()
            .iter()
            .filter(|(_, until)| **until > now)
            .map(|(provider, until)| (*provider, *until - now))
            .collect::<Vec<_>>();
        entries.sort_by_key(|(provider, _)| *provider);
        entries
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<ProviderId, Instant>> {
        self.next_eligible
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
