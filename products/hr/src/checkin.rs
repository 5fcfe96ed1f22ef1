use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum CheckInStatus {
    #[default]
    CheckedOut,
    CheckedIn { since: DateTime<Utc> },
}

/// The header check-in button. Owned per session; purely cosmetic, nothing
/// here feeds the attendance dataset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CheckInPanel {
    status: CheckInStatus,
}

impl CheckInPanel {
    pub fn status(&self) -> CheckInStatus {
        self.status
    }

    pub fn is_checked_in(&self) -> bool {
        matches!(self.status, CheckInStatus::CheckedIn { .. })
    }

    pub fn checked_in_at(&self) -> Option<DateTime<Utc>> {
        match self.status {
            CheckInStatus::CheckedIn { since } => Some(since),
            CheckInStatus::CheckedOut => None,
        }
    }

    /// Checking in again while checked in keeps the first timestamp.
    pub fn check_in(&mut self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self.status {
            CheckInStatus::CheckedIn { since } => since,
            CheckInStatus::CheckedOut => {
                self.status = CheckInStatus::CheckedIn { since: now };
                tracing::debug!(%now, "checked in");
                now
            }
        }
    }

    pub fn check_out(&mut self) {
        if self.is_checked_in() {
            tracing::debug!("checked out");
        }
        self.status = CheckInStatus::CheckedOut;
    }

    pub fn elapsed(&self, now: DateTime<Utc>) -> Option<String> {
        self.checked_in_at().map(|since| format_elapsed(since, now))
    }
}

/// `"{h}h {m}m"`; clock skew never yields a negative reading.
pub fn format_elapsed(since: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let minutes = (now - since).num_minutes().max(0);
    format!("{}h {}m", minutes / 60, minutes % 60)
}

/// One readout of the header clock.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClockTick {
    pub now: DateTime<Utc>,
    pub elapsed: Option<String>,
}

impl ClockTick {
    pub fn at(now: DateTime<Utc>, checked_in_at: Option<DateTime<Utc>>) -> Self {
        Self {
            now,
            elapsed: checked_in_at.map(|since| format_elapsed(since, now)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 12, h, m, 0).unwrap()
    }

    #[test]
    fn panel_tracks_elapsed_time_until_checkout() {
        let mut panel = CheckInPanel::default();
        assert_eq!(panel.status(), CheckInStatus::CheckedOut);
        assert_eq!(panel.elapsed(at(9, 0)), None);

        assert_eq!(panel.check_in(at(9, 0)), at(9, 0));
        assert_eq!(panel.check_in(at(9, 30)), at(9, 0));
        assert_eq!(panel.elapsed(at(11, 47)).as_deref(), Some("2h 47m"));

        panel.check_out();
        assert!(!panel.is_checked_in());
        assert_eq!(panel.checked_in_at(), None);
    }

    #[test]
    fn ticks_clamp_negative_durations() {
        let since = at(10, 0);
        let tick = ClockTick::at(since - Duration::minutes(5), Some(since));
        assert_eq!(tick.elapsed.as_deref(), Some("0h 0m"));
        assert_eq!(ClockTick::at(since, None).elapsed, None);
    }
}
