//! Calendar period windows used by ranking retention.
//!
//! Windows are recomputed from `now` on every run. The current window is open
//! ended, the archive window has no lower bound, and every bounded window's
//! start is the next older window's end.

use time::{Date, Duration, Month, OffsetDateTime, Time};

use super::ranking::{RankingType, RetentionLevel};

/// Half-open `[start, end)` window; `None` means unbounded on that side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodWindow {
    pub level: RetentionLevel,
    pub start: Option<OffsetDateTime>,
    pub end: Option<OffsetDateTime>,
}

impl PeriodWindow {
    pub fn contains(&self, t: OffsetDateTime) -> bool {
        self.start.map_or(true, |s| t >= s) && self.end.map_or(true, |e| t < e)
    }
}

fn midnight(date: Date) -> OffsetDateTime {
    date.with_time(Time::MIDNIGHT).assume_utc()
}

fn months_back(date: Date, k: u32) -> Date {
    let total = date.year() * 12 + (date.month() as i32 - 1) - k as i32;
    let year = total.div_euclid(12);
    let month0 = total.rem_euclid(12) as u8;
    let month = Month::try_from(month0 + 1).unwrap_or(Month::January);
    Date::from_calendar_date(year, month, 1).unwrap_or(date)
}

/// Start of the `k`-th period before the one containing `now` (0 = current).
pub fn period_start(kind: RankingType, now: OffsetDateTime, k: u32) -> Option<OffsetDateTime> {
    let today = now.to_offset(time::UtcOffset::UTC).date();
    match kind {
        RankingType::Daily => Some(midnight(today) - Duration::days(i64::from(k))),
        RankingType::Weekly => {
            let monday =
                today - Duration::days(i64::from(today.weekday().number_days_from_monday()));
            Some(midnight(monday) - Duration::weeks(i64::from(k)))
        }
        RankingType::Monthly => Some(midnight(months_back(today, k))),
        RankingType::AllTime => None,
    }
}

/// Ordered windows from newest to oldest.
///
/// `all_time` has a single unbounded `current` window. Other types get
/// current, previous, `older_periods` older windows and one archive bucket.
pub fn windows(kind: RankingType, now: OffsetDateTime, older_periods: u32) -> Vec<PeriodWindow> {
    if kind == RankingType::AllTime {
        return vec![PeriodWindow {
            level: RetentionLevel::Current,
            start: None,
            end: None,
        }];
    }

    let bounded = 2 + older_periods;
    let mut out = Vec::with_capacity(bounded as usize + 1);
    let mut end = None;
    for k in 0..bounded {
        let start = period_start(kind, now, k);
        let level = match k {
            0 => RetentionLevel::Current,
            1 => RetentionLevel::Previous,
            _ => RetentionLevel::Older,
        };
        out.push(PeriodWindow { level, start, end });
        end = start;
    }
    out.push(PeriodWindow {
        level: RetentionLevel::Archive,
        start: None,
        end,
    });
    out
}

/// `YYYY-MM-DD` of `now` in UTC.
pub fn day_key(now: OffsetDateTime) -> String {
    let d = now.to_offset(time::UtcOffset::UTC).date();
    format!("{:04}-{:02}-{:02}", d.year(), d.month() as u8, d.day())
}
