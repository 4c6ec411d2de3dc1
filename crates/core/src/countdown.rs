//! Deadline-based countdown for the exclusive offer.
//!
//! The deadline is fixed once and persisted by the caller. Reloading a saved
//! deadline never moves it, so the countdown survives restarts and expires
//! exactly once.

use std::fmt;

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Default length of the offer window.
pub const OFFER_WINDOW: Duration = Duration::hours(48);

/// A fixed deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Countdown {
    deadline: DateTime<Utc>,
}

/// Result of [`Countdown::resume_or_start`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountdownStart {
    pub countdown: Countdown,
    /// Deadline to store when a new one was chosen; `None` when resumed.
    pub persist: Option<String>,
}

impl Countdown {
    #[must_use]
    pub const fn new(deadline: DateTime<Utc>) -> Self {
        Self { deadline }
    }

    /// A countdown that has already run out.
    #[must_use]
    pub const fn expired() -> Self {
        Self::new(DateTime::<Utc>::MIN_UTC)
    }

    /// Resume a saved deadline, or start a new one `window` from `now`.
    ///
    /// A saved value is never replaced. One that does not parse as an
    /// RFC 3339 timestamp reads as expired.
    #[must_use]
    pub fn resume_or_start(
        saved: Option<&str>,
        now: DateTime<Utc>,
        window: Duration,
    ) -> CountdownStart {
        if let Some(saved) = saved {
            return CountdownStart {
                countdown: parse_deadline(saved).map_or_else(Self::expired, Self::new),
                persist: None,
            };
        }

        let countdown = Self::new(now + window);
        CountdownStart {
            persist: Some(countdown.to_iso_string()),
            countdown,
        }
    }

    #[must_use]
    pub const fn deadline(&self) -> DateTime<Utc> {
        self.deadline
    }

    /// The deadline as `2024-01-01T00:00:00.000Z`.
    #[must_use]
    pub fn to_iso_string(&self) -> String {
        self.deadline.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// Time left until the deadline, zero once it has passed.
    #[must_use]
    pub fn remaining(&self, now: DateTime<Utc>) -> TimeLeft {
        let left = (self.deadline - now).num_seconds().max(0);
        TimeLeft::from_seconds(u64::try_from(left).unwrap_or(0))
    }
}

fn parse_deadline(saved: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(saved.trim())
        .ok()
        .map(|deadline| deadline.with_timezone(&Utc))
}

/// Remaining time split into hours, minutes and seconds.
///
/// There is no day component, so `hours` may exceed 23.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TimeLeft {
    pub hours: u64,
    pub minutes: u8,
    pub seconds: u8,
}

impl TimeLeft {
    pub const ZERO: Self = Self {
        hours: 0,
        minutes: 0,
        seconds: 0,
    };

    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn from_seconds(total: u64) -> Self {
        Self {
            hours: total / 3600,
            // Both are < 60.
            minutes: ((total % 3600) / 60) as u8,
            seconds: (total % 60) as u8,
        }
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    #[must_use]
    pub fn hours_padded(&self) -> String {
        format!("{:02}", self.hours)
    }

    #[must_use]
    pub fn minutes_padded(&self) -> String {
        format!("{:02}", self.minutes)
    }

    #[must_use]
    pub fn seconds_padded(&self) -> String {
        format!("{:02}", self.seconds)
    }
}

impl fmt::Display for TimeLeft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hours, self.minutes, self.seconds)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, h, m, s).unwrap()
    }

    #[test]
    fn test_start_without_saved_deadline() {
        let now = at(0, 0, 0);
        let start = Countdown::resume_or_start(None, now, OFFER_WINDOW);

        assert_eq!(start.countdown.deadline(), now + Duration::hours(48));
        assert_eq!(start.persist.as_deref(), Some("2024-01-03T00:00:00.000Z"));
        assert_eq!(
            start.countdown.remaining(now),
            TimeLeft {
                hours: 48,
                minutes: 0,
                seconds: 0
            }
        );
    }

    #[test]
    fn test_saved_deadline_is_resumed_verbatim() {
        let now = at(10, 0, 0);
        let saved = "2024-01-01T12:00:00.000Z";
        let start = Countdown::resume_or_start(Some(saved), now, OFFER_WINDOW);

        assert!(start.persist.is_none());
        assert_eq!(start.countdown.to_iso_string(), saved);
        let left = start.countdown.remaining(now);
        assert!(left.hours == 1 || left.hours == 2, "got {left}");
    }

    #[test]
    fn test_unparseable_saved_deadline_reads_as_expired() {
        let now = at(0, 0, 0);
        for saved in ["not-a-date", "next tuesday", ""] {
            let start = Countdown::resume_or_start(Some(saved), now, OFFER_WINDOW);
            assert!(start.persist.is_none(), "{saved:?} must not be replaced");
            assert_eq!(start.countdown.remaining(now), TimeLeft::ZERO);
            assert!(start.countdown.remaining(now + Duration::hours(72)).is_zero());
        }
    }

    #[test]
    fn test_expired_deadline_stays_at_zero() {
        let countdown = Countdown::new(at(0, 0, 0));
        let later = at(5, 30, 0);

        assert_eq!(countdown.remaining(later), TimeLeft::ZERO);
        assert!(countdown.remaining(later + Duration::days(3)).is_zero());

        // Resuming an expired deadline does not restart it.
        let start =
            Countdown::resume_or_start(Some(&countdown.to_iso_string()), later, OFFER_WINDOW);
        assert!(start.persist.is_none());
        assert!(start.countdown.remaining(later).is_zero());
    }

    #[test]
    fn test_time_left_decomposition_and_padding() {
        let left = TimeLeft::from_seconds(3600 * 30 + 60 * 5 + 7);
        assert_eq!(left.hours, 30);
        assert_eq!(left.minutes_padded(), "05");
        assert_eq!(left.seconds_padded(), "07");
        assert_eq!(left.to_string(), "30:05:07");
        assert_eq!(TimeLeft::ZERO.hours_padded(), "00");
    }

    #[test]
    fn test_offset_timestamps_are_accepted() {
        let now = at(0, 0, 0);
        let start =
            Countdown::resume_or_start(Some("2024-01-01T03:00:00+02:00"), now, OFFER_WINDOW);
        assert_eq!(start.countdown.deadline(), at(1, 0, 0));
    }
}
