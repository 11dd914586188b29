//! Origination rate limiting
//!
//! Applies to locally originated traffic only, never to relayed
//! messages. Limits follow the application's quality-of-service
//! budget: one distress beacon per minute is enough to stay
//! discoverable, and chat above ten per minute is someone holding the
//! button down.

use aidmesh_protocol::MessageKind;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Default per-minute origination budgets
pub const SOS_PER_MINUTE: u32 = 1;
pub const DM_PER_MINUTE: u32 = 10;
pub const VOICE_CLIPS_PER_MINUTE: u32 = 6;

/// Windowed per-kind counter for originated messages
#[derive(Debug)]
pub struct OriginationLimiter {
    limits: HashMap<MessageKind, u32>,
    counters: HashMap<MessageKind, (u32, Instant)>,
    window: Duration,
}

impl OriginationLimiter {
    pub fn new() -> Self {
        let mut limits = HashMap::new();
        limits.insert(MessageKind::Sos, SOS_PER_MINUTE);
        limits.insert(MessageKind::Dm, DM_PER_MINUTE);
        limits.insert(MessageKind::VoicePing, VOICE_CLIPS_PER_MINUTE);
        OriginationLimiter {
            limits,
            counters: HashMap::new(),
            window: Duration::from_secs(60),
        }
    }

    /// Count one origination of `kind`. `Err(limit)` when the budget
    /// for the current window is spent. Kinds without a configured
    /// budget are unlimited.
    pub fn check(&mut self, kind: MessageKind) -> Result<(), u32> {
        let Some(&limit) = self.limits.get(&kind) else {
            return Ok(());
        };
        let now = Instant::now();
        let entry = self.counters.entry(kind).or_insert((0, now));

        if now.duration_since(entry.1) >= self.window {
            *entry = (0, now);
        }
        entry.0 += 1;
        if entry.0 > limit {
            return Err(limit);
        }
        Ok(())
    }

    /// Reset all counters.
    pub fn clear(&mut self) {
        self.counters.clear();
    }
}

impl Default for OriginationLimiter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sos_budget_is_one() {
        let mut limiter = OriginationLimiter::new();
        assert!(limiter.check(MessageKind::Sos).is_ok());
        assert_eq!(limiter.check(MessageKind::Sos), Err(SOS_PER_MINUTE));
    }

    #[test]
    fn test_dm_budget() {
        let mut limiter = OriginationLimiter::new();
        for _ in 0..DM_PER_MINUTE {
            assert!(limiter.check(MessageKind::Dm).is_ok());
        }
        assert!(limiter.check(MessageKind::Dm).is_err());
    }

    #[test]
    fn test_unbudgeted_kind_unlimited() {
        let mut limiter = OriginationLimiter::new();
        for _ in 0..100 {
            assert!(limiter.check(MessageKind::Ack).is_ok());
        }
    }

    #[test]
    fn test_clear_resets_budget() {
        let mut limiter = OriginationLimiter::new();
        assert!(limiter.check(MessageKind::Sos).is_ok());
        assert!(limiter.check(MessageKind::Sos).is_err());
        limiter.clear();
        assert!(limiter.check(MessageKind::Sos).is_ok());
    }
}
