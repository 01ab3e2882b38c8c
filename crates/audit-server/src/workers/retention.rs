//! Retention worker — fires the purge engine once daily.
//!
//! Sleeps until the configured HH:MM UTC, runs the fixed retention
//! criterion, and loops. A failed run is logged and abandoned; there is
//! no catch-up for missed runs, the next trigger is simply the next
//! day's wall-clock time.

use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};
use tokio::task::JoinHandle;

use crate::purge::{PurgeCriteria, PurgeEngine, PurgeInitiator};

pub fn start(engine: PurgeEngine, criteria: PurgeCriteria, at: NaiveTime) -> JoinHandle<()> {
    tokio::spawn(async move {
        tracing::info!(
            at = %at.format("%H:%M"),
            criteria = %criteria.describe(),
            "Retention worker started (daily)"
        );

        loop {
            let wait = until_next_trigger(Utc::now(), at);
            tokio::time::sleep(wait).await;

            // completion is logged by the engine; failure is terminal
            // for this run only
            if let Err(e) = engine.execute(&criteria, &PurgeInitiator::Scheduled).await {
                tracing::error!(error = %e, "Scheduled purge failed; next trigger unaffected");
            }
        }
    })
}

/// Next occurrence of `at` (UTC) strictly after `now`.
fn next_trigger(now: DateTime<Utc>, at: NaiveTime) -> DateTime<Utc> {
    let today = now.date_naive().and_time(at);
    let next = if today > now.naive_utc() {
        today
    } else {
        today + Duration::days(1)
    };
    Utc.from_utc_datetime(&next)
}

fn until_next_trigger(now: DateTime<Utc>, at: NaiveTime) -> std::time::Duration {
    (next_trigger(now, at) - now).to_std().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn trigger_later_today_when_time_not_yet_passed() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 1, 30, 0).unwrap();
        let next = next_trigger(now, at(2, 0));
        assert_eq!(next, Utc.with_ymd_and_hms(2025, 6, 1, 2, 0, 0).unwrap());
    }

    #[test]
    fn trigger_tomorrow_when_time_already_passed() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 2, 0, 0).unwrap();
        let next = next_trigger(now, at(2, 0));
        assert_eq!(next, Utc.with_ymd_and_hms(2025, 6, 2, 2, 0, 0).unwrap());
    }

    #[test]
    fn missed_runs_are_skipped_not_queued() {
        // a process asleep for three days still gets exactly one next
        // trigger, within 24h of waking
        let now = Utc.with_ymd_and_hms(2025, 6, 4, 12, 0, 0).unwrap();
        let next = next_trigger(now, at(2, 0));
        assert_eq!(next, Utc.with_ymd_and_hms(2025, 6, 5, 2, 0, 0).unwrap());
    }
}
