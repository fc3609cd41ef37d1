//! Calendar-aware "registered for" durations.
//!
//! Turns a pair of Unix timestamps into a short phrase such as
//! `"2 years 3 months"` or `"5 minutes"`. Text and plural forms come from a
//! caller-supplied [`Translate`] implementation; "now" comes from the caller
//! or from a [`Clock`].

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

fn is_leap_year(year: i64) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

fn days_in_month(year: i64, month: u8) -> u8 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => 0,
    }
}

/// Days since 1970-01-01 using Howard Hinnant's days_from_civil algorithm.
fn days_from_civil(year: i64, month: u8, day: u8) -> i128 {
    let year = year as i128;
    let y = if month <= 2 { year - 1 } else { year };
    let era = if y >= 0 { y } else { y - 399 } / 400;
    let yoe = y - era * 400; // [0, 399]
    let m = month as i128;
    let doy = (153 * (if m > 2 { m - 3 } else { m + 9 }) + 2) / 5 + day as i128 - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy; // [0, 146096]
    era * 146097 + doe - 719468
}

/// Converts Unix epoch seconds to a UTC CivilTime using Hinnant's civil_from_days.
fn epoch_to_civil(secs: u64) -> CivilTime {
    let day_secs = secs % 86400;
    let hour = (day_secs / 3600) as u8;
    let minute = ((day_secs % 3600) / 60) as u8;
    let second = (day_secs % 60) as u8;

    let z = (secs / 86400) as i64 + 719468; // shift epoch to 0000-03-01
    let era = if z >= 0 { z } else { z - 146096 } / 146097;
    let doe = z - era * 146097; // day of era [0, 146096]
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146096) / 365; // year of era [0, 399]
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100); // day of year [0, 365]
    let mp = (5 * doy + 2) / 153; // month proxy [0, 11]
    let day = (doy - (153 * mp + 2) / 5 + 1) as u8;
    let month = if mp < 10 { mp + 3 } else { mp - 9 } as u8;
    let year = if month <= 2 { y + 1 } else { y };

    CivilTime {
        year,
        month,
        day,
        hour,
        minute,
        second,
    }
}

/// A UTC calendar date and time of day, to the second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CivilTime {
    year: i64,
    month: u8,
    day: u8,
    hour: u8,
    minute: u8,
    second: u8,
}

impl CivilTime {
    pub fn new(year: i64, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Option<Self> {
        if !(1..=12).contains(&month) {
            return None;
        }
        if day < 1 || day > days_in_month(year, month) {
            return None;
        }
        if hour > 23 || minute > 59 || second > 59 {
            return None;
        }
        Some(Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        })
    }

    /// Constructs a CivilTime from Unix epoch seconds (UTC).
    pub fn from_epoch(secs: u64) -> Self {
        epoch_to_civil(secs)
    }

    pub fn year(&self) -> i64 {
        self.year
    }
    pub fn month(&self) -> u8 {
        self.month
    }
    pub fn day(&self) -> u8 {
        self.day
    }
    pub fn hour(&self) -> u8 {
        self.hour
    }
    pub fn minute(&self) -> u8 {
        self.minute
    }
    pub fn second(&self) -> u8 {
        self.second
    }

    pub fn is_leap_year(&self) -> bool {
        is_leap_year(self.year)
    }

    /// Number of days in this value's month.
    pub fn days_in_month(&self) -> u8 {
        days_in_month(self.year, self.month)
    }

    /// Number of days in this value's year.
    pub fn days_in_year(&self) -> u16 {
        if self.is_leap_year() {
            366
        } else {
            365
        }
    }

    /// Shifts by whole calendar months, keeping the time of day.
    /// The day is clamped to the target month's length, so Jan 31 + 1 month is Feb 28 (or 29).
    /// The year saturates at the `i64` range.
    pub fn add_months(&self, months: i64) -> Self {
        let index = self.year as i128 * 12 + (self.month as i128 - 1) + months as i128;
        let year = index.div_euclid(12).clamp(i64::MIN as i128, i64::MAX as i128) as i64;
        let month = (index.rem_euclid(12) + 1) as u8;
        Self {
            year,
            month,
            day: self.day.min(days_in_month(year, month)),
            ..*self
        }
    }

    fn epoch_secs_wide(&self) -> i128 {
        days_from_civil(self.year, self.month, self.day) * 86400
            + self.hour as i128 * 3600
            + self.minute as i128 * 60
            + self.second as i128
    }

    /// Converts back to Unix epoch seconds, saturating outside the `u64` range.
    pub fn to_epoch_secs(&self) -> u64 {
        self.epoch_secs_wide().clamp(0, u64::MAX as i128) as u64
    }

    /// Formats as "YYYY-MM-DD".
    pub fn date(&self) -> String {
        format!("{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

impl fmt::Display for CivilTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:02}:{:02}:{:02}",
            self.date(),
            self.hour,
            self.minute,
            self.second
        )
    }
}

/// Time units in rendering order, largest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Unit {
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
}

impl Unit {
    pub const ALL: [Unit; 6] = [
        Unit::Year,
        Unit::Month,
        Unit::Day,
        Unit::Hour,
        Unit::Minute,
        Unit::Second,
    ];

    /// Stable key handed to translators: "YEAR", "MONTH", ... "SECOND".
    pub fn key(self) -> &'static str {
        match self {
            Unit::Year => "YEAR",
            Unit::Month => "MONTH",
            Unit::Day => "DAY",
            Unit::Hour => "HOUR",
            Unit::Minute => "MINUTE",
            Unit::Second => "SECOND",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Calendar-aware breakdown of the time between two instants.
///
/// Whole calendar months are counted first (years are twelve of them), and the
/// remainder, always shorter than a month, is split into days, hours, minutes
/// and seconds. [`Interval::add_to`] undoes [`Interval::between`] exactly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Interval {
    years: u64,
    months: u64,
    days: u64,
    hours: u64,
    minutes: u64,
    seconds: u64,
}

impl Interval {
    /// Returns `None` when `new_time` is before `old_time`.
    pub fn between(old_time: u64, new_time: u64) -> Option<Self> {
        if new_time < old_time {
            return None;
        }
        let start = CivilTime::from_epoch(old_time);
        let end = CivilTime::from_epoch(new_time);

        // Borrow a month when the end's day and time of day fall before the start's.
        let mut months = (end.year - start.year) * 12 + end.month as i64 - start.month as i64;
        if (end.day, end.hour, end.minute, end.second)
            < (start.day, start.hour, start.minute, start.second)
        {
            months -= 1;
        }
        let anchor = start.add_months(months);

        let rest = u64::try_from(new_time as i128 - anchor.epoch_secs_wide()).unwrap_or(0);
        let months = months.max(0) as u64;
        Some(Self {
            years: months / 12,
            months: months % 12,
            days: rest / 86400,
            hours: (rest % 86400) / 3600,
            minutes: (rest % 3600) / 60,
            seconds: rest % 60,
        })
    }

    /// Applies this interval to `old_time`, months first and then the fixed-length remainder.
    pub fn add_to(&self, old_time: u64) -> u64 {
        let months = self.years.saturating_mul(12).saturating_add(self.months);
        let anchor = CivilTime::from_epoch(old_time).add_months(months.min(i64::MAX as u64) as i64);
        let rest = self.days as i128 * 86400
            + self.hours as i128 * 3600
            + self.minutes as i128 * 60
            + self.seconds as i128;
        (anchor.epoch_secs_wide() + rest).clamp(0, u64::MAX as i128) as u64
    }

    pub fn years(&self) -> u64 {
        self.years
    }
    pub fn months(&self) -> u64 {
        self.months
    }
    pub fn days(&self) -> u64 {
        self.days
    }
    pub fn hours(&self) -> u64 {
        self.hours
    }
    pub fn minutes(&self) -> u64 {
        self.minutes
    }
    pub fn seconds(&self) -> u64 {
        self.seconds
    }

    /// Returns the magnitude of a single unit.
    pub fn get(&self, unit: Unit) -> u64 {
        match unit {
            Unit::Year => self.years,
            Unit::Month => self.months,
            Unit::Day => self.days,
            Unit::Hour => self.hours,
            Unit::Minute => self.minutes,
            Unit::Second => self.seconds,
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

/// Maps a unit and magnitude to a pluralized phrase, e.g. `(Unit::Day, 3)` to "3 days".
pub trait Translate {
    fn translate(&self, unit: Unit, count: u64) -> String;
}

impl<F> Translate for F
where
    F: Fn(Unit, u64) -> String,
{
    fn translate(&self, unit: Unit, count: u64) -> String {
        self(unit, count)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Plural {
    singular: String,
    plural: String,
}

/// Singular/plural templates per unit. `%d` is replaced with the magnitude;
/// the singular form is used only for a magnitude of exactly 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    entries: [Plural; 6],
}

impl Catalog {
    /// English templates: "%d year" / "%d years" and so on.
    pub fn english() -> Self {
        let entry = |singular: &str, plural: &str| Plural {
            singular: singular.to_string(),
            plural: plural.to_string(),
        };
        Self {
            entries: [
                entry("%d year", "%d years"),
                entry("%d month", "%d months"),
                entry("%d day", "%d days"),
                entry("%d hour", "%d hours"),
                entry("%d minute", "%d minutes"),
                entry("%d second", "%d seconds"),
            ],
        }
    }

    /// Replaces the templates for one unit.
    pub fn with(mut self, unit: Unit, singular: impl Into<String>, plural: impl Into<String>) -> Self {
        self.entries[unit as usize] = Plural {
            singular: singular.into(),
            plural: plural.into(),
        };
        self
    }

    pub fn template(&self, unit: Unit, count: u64) -> &str {
        let entry = &self.entries[unit as usize];
        if count == 1 {
            &entry.singular
        } else {
            &entry.plural
        }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::english()
    }
}

impl Translate for Catalog {
    fn translate(&self, unit: Unit, count: u64) -> String {
        self.template(unit, count).replace("%d", &count.to_string())
    }
}

/// Source of the reference "now" timestamp, in Unix epoch seconds.
pub trait Clock {
    fn now(&self) -> u64;
}

/// Reads the system wall clock. Times before the epoch read as 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default()
    }
}

/// Always reports the same timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub u64);

impl Clock for FixedClock {
    fn now(&self) -> u64 {
        self.0
    }
}

/// Which interval fields make it into the output.
///
/// Both policies show hours and minutes only for spans under a day, and
/// seconds only for spans under a minute. They differ on the calendar units:
///
/// - `Latest` shows years and months whenever they are non-zero, and days only
///   when the span is shorter than a month.
/// - `Legacy` shows years only when the span exceeds the length of the current
///   year, months only when it exceeds the length of the current month, and
///   days for any span over a day. "Current" means the calendar month/year of
///   the newer timestamp. Spans of exactly one month or one year can render
///   nothing at all under this policy (Feb 1 to Mar 1, or 2019-03-01 to
///   2020-03-01).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Policy {
    #[default]
    Latest,
    Legacy,
}

impl Policy {
    fn shows(self, unit: Unit, interval: &Interval, elapsed: u64, now: &CivilTime) -> bool {
        if interval.get(unit) == 0 {
            return false;
        }
        match (self, unit) {
            (Policy::Latest, Unit::Year) | (Policy::Latest, Unit::Month) => true,
            (Policy::Latest, Unit::Day) => interval.years == 0 && interval.months == 0,
            (Policy::Legacy, Unit::Year) => elapsed > 86400 * now.days_in_year() as u64,
            (Policy::Legacy, Unit::Month) => elapsed > 86400 * now.days_in_month() as u64,
            (Policy::Legacy, Unit::Day) => elapsed > 86400,
            (_, Unit::Hour) => (3600..86400).contains(&elapsed),
            (_, Unit::Minute) => (60..86400).contains(&elapsed),
            (_, Unit::Second) => elapsed < 60,
        }
    }
}

/// Renders elapsed time between two timestamps as translated fragments
/// joined by single spaces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DurationFormatter {
    policy: Policy,
}

impl DurationFormatter {
    pub fn new(policy: Policy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> Policy {
        self.policy
    }

    /// Returns the selected `(unit, magnitude)` pairs in rendering order.
    /// Empty when the timestamps are equal or reversed.
    pub fn parts(&self, old_time: u64, new_time: u64) -> Vec<(Unit, u64)> {
        let Some(interval) = Interval::between(old_time, new_time) else {
            #[cfg(feature = "log")]
            log::debug!("reversed interval {old_time} -> {new_time}, rendering nothing");
            return Vec::new();
        };
        #[cfg(feature = "log")]
        log::trace!("interval {old_time} -> {new_time}: {interval:?}");

        let elapsed = new_time - old_time;
        let now = CivilTime::from_epoch(new_time);
        Unit::ALL
            .into_iter()
            .filter(|&unit| self.policy.shows(unit, &interval, elapsed, &now))
            .map(|unit| (unit, interval.get(unit)))
            .collect()
    }

    /// Formats the time from `old_time` to `new_time`, e.g. "2 years 3 months".
    pub fn format<T>(&self, old_time: u64, new_time: u64, translate: &T) -> String
    where
        T: Translate + ?Sized,
    {
        self.parts(old_time, new_time)
            .into_iter()
            .map(|(unit, count)| translate.translate(unit, count))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Formats the time from `old_time` to the clock's current reading.
    pub fn format_since<C, T>(&self, old_time: u64, clock: &C, translate: &T) -> String
    where
        C: Clock + ?Sized,
        T: Translate + ?Sized,
    {
        self.format(old_time, clock.now(), translate)
    }
}

/// Formats with the default [`Policy::Latest`].
/// Convenience wrapper around [`DurationFormatter::format`].
pub fn format<T>(old_time: u64, new_time: u64, translate: &T) -> String
where
    T: Translate + ?Sized,
{
    DurationFormatter::default().format(old_time, new_time, translate)
}
