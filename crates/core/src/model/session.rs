use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{PartKey, TestId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionConfigError {
    #[error("no parts selected for the session")]
    NoParts,

    #[error("part {0} selected more than once")]
    DuplicatePart(PartKey),
}

/// Immutable configuration for one test session, fixed at start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    test_id: TestId,
    selected_parts: Vec<PartKey>,
    time_limit_seconds: Option<u32>,
    is_full_test: bool,
}

impl SessionConfig {
    /// Build a session configuration.
    ///
    /// A limit of `Some(0)` is treated as untimed, matching the host
    /// shell passing a falsy time limit for practice mode.
    ///
    /// # Errors
    ///
    /// Returns `SessionConfigError` if no parts are selected or a part
    /// appears twice.
    pub fn new(
        test_id: TestId,
        selected_parts: Vec<PartKey>,
        time_limit_seconds: Option<u32>,
    ) -> Result<Self, SessionConfigError> {
        if selected_parts.is_empty() {
            return Err(SessionConfigError::NoParts);
        }
        for (i, part) in selected_parts.iter().enumerate() {
            if selected_parts[..i].contains(part) {
                return Err(SessionConfigError::DuplicatePart(*part));
            }
        }

        let time_limit_seconds = time_limit_seconds.filter(|limit| *limit > 0);
        let is_full_test = selected_parts.len() == PartKey::ALL.len();

        Ok(Self {
            test_id,
            selected_parts,
            time_limit_seconds,
            is_full_test,
        })
    }

    #[must_use]
    pub fn test_id(&self) -> &TestId {
        &self.test_id
    }

    #[must_use]
    pub fn selected_parts(&self) -> &[PartKey] {
        &self.selected_parts
    }

    #[must_use]
    pub fn time_limit_seconds(&self) -> Option<u32> {
        self.time_limit_seconds
    }

    #[must_use]
    pub fn is_full_test(&self) -> bool {
        self.is_full_test
    }
}

//
// ─── SESSION CLOCK ─────────────────────────────────────────────────────────────
//

/// The single per-session countdown (or count-up, if untimed).
///
/// Pure state machine: one `tick` per elapsed second, driven externally.
/// It never auto-submits; expiry is an observable state, not an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionClock {
    limit: Option<u32>,
    seconds: u32,
}

impl SessionClock {
    /// Initialize to the limit when timed, else to zero. A zero limit
    /// means untimed.
    #[must_use]
    pub fn new(limit: Option<u32>) -> Self {
        let limit = limit.filter(|l| *l > 0);
        Self {
            limit,
            seconds: limit.unwrap_or(0),
        }
    }

    /// Advance by one second: timed sessions count down (floored at 0),
    /// untimed sessions count up.
    pub fn tick(&mut self) {
        if self.limit.is_some() {
            self.seconds = self.seconds.saturating_sub(1);
        } else {
            self.seconds = self.seconds.saturating_add(1);
        }
    }

    /// Remaining seconds when timed, elapsed seconds when untimed.
    #[must_use]
    pub fn seconds(&self) -> u32 {
        self.seconds
    }

    #[must_use]
    pub fn is_timed(&self) -> bool {
        self.limit.is_some()
    }

    /// A timed clock that has reached zero. Untimed clocks never expire.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.limit.is_some() && self.seconds == 0
    }

    /// Display form of the counter (`mm:ss`). Pure projection, not a
    /// state transition.
    #[must_use]
    pub fn display(&self) -> String {
        format_mm_ss(self.seconds)
    }
}

/// Format whole seconds as `mm:ss` for the session header.
#[must_use]
pub fn format_mm_ss(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn config(parts: Vec<PartKey>, limit: Option<u32>) -> Result<SessionConfig, SessionConfigError> {
        SessionConfig::new(TestId::new("t1"), parts, limit)
    }

    #[test]
    fn config_rejects_empty_and_duplicate_parts() {
        assert!(matches!(
            config(Vec::new(), None),
            Err(SessionConfigError::NoParts)
        ));
        assert!(matches!(
            config(vec![PartKey::Photographs, PartKey::Photographs], None),
            Err(SessionConfigError::DuplicatePart(PartKey::Photographs))
        ));
    }

    #[test]
    fn config_normalizes_zero_limit_to_untimed() {
        let cfg = config(vec![PartKey::Photographs], Some(0)).unwrap();
        assert_eq!(cfg.time_limit_seconds(), None);
    }

    #[test]
    fn config_marks_all_seven_parts_as_full_test() {
        let cfg = config(PartKey::ALL.to_vec(), Some(7200)).unwrap();
        assert!(cfg.is_full_test());

        let cfg = config(vec![PartKey::Photographs], None).unwrap();
        assert!(!cfg.is_full_test());
    }

    #[test]
    fn timed_clock_counts_down_and_floors_at_zero() {
        let mut clock = SessionClock::new(Some(3));
        let mut seen = vec![clock.seconds()];
        for _ in 0..5 {
            let before = clock.seconds();
            clock.tick();
            // each tick decrements by at most one and never underflows
            assert!(before.saturating_sub(clock.seconds()) <= 1);
            seen.push(clock.seconds());
        }
        assert_eq!(seen, vec![3, 2, 1, 0, 0, 0]);
        assert!(clock.is_expired());
    }

    #[test]
    fn untimed_clock_counts_up_and_never_expires() {
        let mut clock = SessionClock::new(None);
        for _ in 0..4 {
            clock.tick();
        }
        assert_eq!(clock.seconds(), 4);
        assert!(!clock.is_expired());
    }

    #[test]
    fn zero_limit_clock_counts_up() {
        let mut clock = SessionClock::new(Some(0));
        assert!(!clock.is_timed());
        clock.tick();
        assert_eq!(clock.seconds(), 1);
    }

    #[test]
    fn clock_display_is_mm_ss() {
        assert_eq!(format_mm_ss(0), "00:00");
        assert_eq!(format_mm_ss(61), "01:01");
        assert_eq!(format_mm_ss(7200), "120:00");
        assert_eq!(SessionClock::new(Some(75)).display(), "01:15");
    }
}
