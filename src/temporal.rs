//! Temporal values.
//!
//! Sigma has six temporal shapes, all introduced on the wire by `@`:
//!
//! | shape | example |
//! |---|---|
//! | local date | `@2019-01-01` |
//! | local time | `@12:31:47.7654` |
//! | offset time | `@12:31:47+11:00` |
//! | local date-time | `@2019-01-01T12:31:47` |
//! | offset date-time | `@2019-01-01T12:31:47Z` |
//! | zoned date-time | `@2019-01-01T12:31:47+11:00[Australia/Hobart]` |
//!
//! The reader accumulates the components of a literal into [`TemporalParts`], which
//! validates them and selects the variant from which components were present.

use chrono::offset::LocalResult;
use chrono::{
    DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone,
    Timelike,
};
use chrono_tz::Tz;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A time of day with a fixed UTC offset and no date.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct OffsetTime {
    time: NaiveTime,
    offset: FixedOffset,
}

impl OffsetTime {
    #[must_use]
    pub fn new(time: NaiveTime, offset: FixedOffset) -> Self {
        OffsetTime { time, offset }
    }

    #[must_use]
    pub fn time(&self) -> NaiveTime {
        self.time
    }

    #[must_use]
    pub fn offset(&self) -> FixedOffset {
        self.offset
    }
}

impl fmt::Display for OffsetTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_time(f, &self.time)?;
        write_offset(f, self.offset.local_minus_utc())
    }
}

/// Any of the six Sigma temporal values.
///
/// Equality is structural: two offset date-times are equal only when both the local
/// date-time and the offset match, and zoned values must also name the same zone.
#[derive(Clone, Debug)]
pub enum Temporal {
    Date(NaiveDate),
    Time(NaiveTime),
    OffsetTime(OffsetTime),
    DateTime(NaiveDateTime),
    OffsetDateTime(DateTime<FixedOffset>),
    ZonedDateTime(DateTime<Tz>),
}

impl Temporal {
    /// Short name of the variant, used in coercion errors.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Temporal::Date(_) => "local date",
            Temporal::Time(_) => "local time",
            Temporal::OffsetTime(_) => "offset time",
            Temporal::DateTime(_) => "local date-time",
            Temporal::OffsetDateTime(_) => "offset date-time",
            Temporal::ZonedDateTime(_) => "zoned date-time",
        }
    }

    fn discriminant(&self) -> u8 {
        match self {
            Temporal::Date(_) => 0,
            Temporal::Time(_) => 1,
            Temporal::OffsetTime(_) => 2,
            Temporal::DateTime(_) => 3,
            Temporal::OffsetDateTime(_) => 4,
            Temporal::ZonedDateTime(_) => 5,
        }
    }
}

impl PartialEq for Temporal {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Temporal::Date(a), Temporal::Date(b)) => a == b,
            (Temporal::Time(a), Temporal::Time(b)) => a == b,
            (Temporal::OffsetTime(a), Temporal::OffsetTime(b)) => a == b,
            (Temporal::DateTime(a), Temporal::DateTime(b)) => a == b,
            (Temporal::OffsetDateTime(a), Temporal::OffsetDateTime(b)) => {
                a.naive_local() == b.naive_local() && a.offset() == b.offset()
            }
            (Temporal::ZonedDateTime(a), Temporal::ZonedDateTime(b)) => {
                a.naive_local() == b.naive_local()
                    && a.offset().fix() == b.offset().fix()
                    && a.timezone() == b.timezone()
            }
            _ => false,
        }
    }
}

impl Eq for Temporal {}

impl Hash for Temporal {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.discriminant().hash(state);
        match self {
            Temporal::Date(d) => d.hash(state),
            Temporal::Time(t) => t.hash(state),
            Temporal::OffsetTime(t) => t.hash(state),
            Temporal::DateTime(dt) => dt.hash(state),
            Temporal::OffsetDateTime(dt) => {
                dt.naive_local().hash(state);
                dt.offset().local_minus_utc().hash(state);
            }
            Temporal::ZonedDateTime(dt) => {
                dt.naive_local().hash(state);
                dt.offset().fix().local_minus_utc().hash(state);
                dt.timezone().name().hash(state);
            }
        }
    }
}

impl fmt::Display for Temporal {
    /// Canonical ISO-8601 form, without the leading `@`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Temporal::Date(d) => write_date(f, d),
            Temporal::Time(t) => write_time(f, t),
            Temporal::OffsetTime(t) => write!(f, "{}", t),
            Temporal::DateTime(dt) => write_date_time(f, dt),
            Temporal::OffsetDateTime(dt) => {
                write_date_time(f, &dt.naive_local())?;
                write_offset(f, dt.offset().local_minus_utc())
            }
            Temporal::ZonedDateTime(dt) => {
                write_date_time(f, &dt.naive_local())?;
                write_offset(f, whole_minutes(dt.offset().fix()) * 60)?;
                write!(f, "[{}]", dt.timezone().name())
            }
        }
    }
}

impl Temporal {
    /// Describes why this value has no Sigma text form, or `None` when it has one.
    ///
    /// Years must fit four digits and leap-second times are refused. Offsets must
    /// lie within `-12:00..=+14:00` and be whole minutes. A zoned value is checked
    /// with its offset truncated to the minute, as written.
    #[must_use]
    pub fn unwritable_reason(&self) -> Option<&'static str> {
        let (date, time, offset) = match self {
            Temporal::Date(d) => (Some(*d), None, None),
            Temporal::Time(t) => (None, Some(*t), None),
            Temporal::OffsetTime(t) => (None, Some(t.time), Some(t.offset.local_minus_utc())),
            Temporal::DateTime(dt) => (Some(dt.date()), Some(dt.time()), None),
            Temporal::OffsetDateTime(dt) => {
                let local = dt.naive_local();
                (
                    Some(local.date()),
                    Some(local.time()),
                    Some(dt.offset().local_minus_utc()),
                )
            }
            Temporal::ZonedDateTime(dt) => {
                let local = dt.naive_local();
                (
                    Some(local.date()),
                    Some(local.time()),
                    Some(whole_minutes(dt.offset().fix()) * 60),
                )
            }
        };
        if date.map_or(false, |d| !(0..=9999).contains(&d.year())) {
            return Some("year outside 0000..=9999");
        }
        if time.map_or(false, |t| t.nanosecond() > 999_999_999) {
            return Some("leap second");
        }
        match offset {
            Some(seconds) if seconds % 60 != 0 => Some("offset is not a whole number of minutes"),
            Some(seconds) if !(-12 * 3600..=14 * 3600).contains(&seconds) => {
                Some("offset outside -12:00..=+14:00")
            }
            _ => None,
        }
    }
}

/// Offset in minutes east of UTC, dropping any seconds.
fn whole_minutes(offset: FixedOffset) -> i32 {
    offset.local_minus_utc() / 60
}

fn write_date(f: &mut fmt::Formatter<'_>, date: &NaiveDate) -> fmt::Result {
    write!(f, "{:04}-{:02}-{:02}", date.year(), date.month(), date.day())
}

/// Seconds are always written; the fraction is written in groups of three digits.
fn write_time(f: &mut fmt::Formatter<'_>, time: &NaiveTime) -> fmt::Result {
    write!(
        f,
        "{:02}:{:02}:{:02}",
        time.hour(),
        time.minute(),
        time.second()
    )?;
    let nanos = time.nanosecond();
    if nanos == 0 {
        Ok(())
    } else if nanos % 1_000_000 == 0 {
        write!(f, ".{:03}", nanos / 1_000_000)
    } else if nanos % 1_000 == 0 {
        write!(f, ".{:06}", nanos / 1_000)
    } else {
        write!(f, ".{:09}", nanos)
    }
}

fn write_date_time(f: &mut fmt::Formatter<'_>, dt: &NaiveDateTime) -> fmt::Result {
    write_date(f, &dt.date())?;
    f.write_str("T")?;
    write_time(f, &dt.time())
}

fn write_offset(f: &mut fmt::Formatter<'_>, seconds: i32) -> fmt::Result {
    if seconds == 0 {
        return f.write_str("Z");
    }
    let sign = if seconds < 0 { '-' } else { '+' };
    let abs = seconds.unsigned_abs();
    write!(f, "{}{:02}:{:02}", sign, abs / 3600, (abs / 60) % 60)?;
    if abs % 60 != 0 {
        write!(f, ":{:02}", abs % 60)?;
    }
    Ok(())
}

/// Why a set of parsed components did not form a temporal value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TemporalError {
    /// A component is out of range.
    Invalid,
    /// The bracketed zone is not a known IANA zone.
    UnknownZone(String),
}

/// Components of a temporal literal as read from the wire.
#[derive(Clone, Debug, Default)]
pub struct TemporalParts {
    pub date: Option<(u32, u32, u32)>,
    pub time: Option<(u32, u32, u32, u32)>,
    /// Offset as (negative, hours, minutes).
    pub offset: Option<(bool, u32, u32)>,
    pub zone: Option<String>,
}

impl TemporalParts {
    /// Validates the components and builds the variant selected by which
    /// components are present.
    pub fn build(self) -> Result<Temporal, TemporalError> {
        if !self.is_valid() {
            return Err(TemporalError::Invalid);
        }
        let date = match self.date {
            Some((y, m, d)) => {
                Some(NaiveDate::from_ymd_opt(y as i32, m, d).ok_or(TemporalError::Invalid)?)
            }
            None => None,
        };
        let time = match self.time {
            Some((h, m, s, n)) => {
                Some(NaiveTime::from_hms_nano_opt(h, m, s, n).ok_or(TemporalError::Invalid)?)
            }
            None => None,
        };
        let offset = match self.offset_minutes() {
            Some(minutes) => {
                Some(FixedOffset::east_opt(minutes * 60).ok_or(TemporalError::Invalid)?)
            }
            None => None,
        };

        match (date, time, offset, self.zone) {
            (Some(date), Some(time), Some(offset), Some(zone)) => {
                let tz: Tz = zone
                    .parse()
                    .map_err(|_| TemporalError::UnknownZone(zone.clone()))?;
                Ok(Temporal::ZonedDateTime(resolve_zoned(
                    date.and_time(time),
                    offset,
                    tz,
                )?))
            }
            (Some(date), Some(time), Some(offset), None) => offset
                .from_local_datetime(&date.and_time(time))
                .single()
                .map(Temporal::OffsetDateTime)
                .ok_or(TemporalError::Invalid),
            (None, Some(time), Some(offset), None) => {
                Ok(Temporal::OffsetTime(OffsetTime::new(time, offset)))
            }
            (Some(date), Some(time), None, None) => Ok(Temporal::DateTime(date.and_time(time))),
            (Some(date), None, None, None) => Ok(Temporal::Date(date)),
            (None, Some(time), None, None) => Ok(Temporal::Time(time)),
            _ => Err(TemporalError::Invalid),
        }
    }

    fn is_valid(&self) -> bool {
        if let Some((year, month, day)) = self.date {
            if !(1..=12).contains(&month) || day < 1 || day > days_in_month(year, month) {
                return false;
            }
        }
        if let Some((hour, minute, second, nanos)) = self.time {
            if hour > 23 || minute > 59 || second > 59 || nanos > 999_999_999 {
                return false;
            }
        }
        if let Some((_, _, minutes)) = self.offset {
            if minutes > 59 {
                return false;
            }
        }
        if let Some(minutes) = self.offset_minutes() {
            if !(-12 * 60..=14 * 60).contains(&minutes) {
                return false;
            }
        }
        true
    }

    /// Offset in signed minutes east of UTC.
    fn offset_minutes(&self) -> Option<i32> {
        self.offset.map(|(negative, hours, minutes)| {
            let total = (hours.min(99) * 60 + minutes) as i32;
            if negative {
                -total
            } else {
                total
            }
        })
    }
}

fn is_leap_year(year: u32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days in `month` of `year`, leap-year aware.
#[must_use]
pub fn days_in_month(year: u32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

/// Attaches a zone to a local date-time, preferring the literal's own offset when
/// the zone rules make the local time ambiguous, and keeping the literal's instant
/// when the local time falls in a gap.
fn resolve_zoned(
    local: NaiveDateTime,
    offset: FixedOffset,
    tz: Tz,
) -> Result<DateTime<Tz>, TemporalError> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => {
            if whole_minutes(dt.offset().fix()) != whole_minutes(offset) {
                tracing::debug!(
                    zone = tz.name(),
                    literal_offset = %offset,
                    zone_offset = %dt.offset().fix(),
                    "zone rules override literal offset"
                );
            }
            Ok(dt)
        }
        LocalResult::Ambiguous(earliest, latest) => {
            if whole_minutes(latest.offset().fix()) == whole_minutes(offset) {
                Ok(latest)
            } else {
                Ok(earliest)
            }
        }
        LocalResult::None => {
            tracing::debug!(zone = tz.name(), %local, "local time falls in a zone gap");
            offset
                .from_local_datetime(&local)
                .single()
                .map(|dt| dt.with_timezone(&tz))
                .ok_or(TemporalError::Invalid)
        }
    }
}

impl From<NaiveDate> for Temporal {
    fn from(value: NaiveDate) -> Self {
        Temporal::Date(value)
    }
}

impl From<NaiveTime> for Temporal {
    fn from(value: NaiveTime) -> Self {
        Temporal::Time(value)
    }
}

impl From<OffsetTime> for Temporal {
    fn from(value: OffsetTime) -> Self {
        Temporal::OffsetTime(value)
    }
}

impl From<NaiveDateTime> for Temporal {
    fn from(value: NaiveDateTime) -> Self {
        Temporal::DateTime(value)
    }
}

impl From<DateTime<FixedOffset>> for Temporal {
    fn from(value: DateTime<FixedOffset>) -> Self {
        Temporal::OffsetDateTime(value)
    }
}

impl From<DateTime<Tz>> for Temporal {
    fn from(value: DateTime<Tz>) -> Self {
        Temporal::ZonedDateTime(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts(
        date: Option<(u32, u32, u32)>,
        time: Option<(u32, u32, u32, u32)>,
        offset: Option<i32>,
        zone: Option<&str>,
    ) -> TemporalParts {
        TemporalParts {
            date,
            time,
            offset: offset.map(|m| (m < 0, m.unsigned_abs() / 60, m.unsigned_abs() % 60)),
            zone: zone.map(str::to_string),
        }
    }

    #[test]
    fn test_variant_selection() {
        let d = Some((2019, 1, 1));
        let t = Some((12, 31, 47, 0));
        assert!(matches!(parts(d, None, None, None).build(), Ok(Temporal::Date(_))));
        assert!(matches!(parts(None, t, None, None).build(), Ok(Temporal::Time(_))));
        assert!(matches!(
            parts(None, t, Some(660), None).build(),
            Ok(Temporal::OffsetTime(_))
        ));
        assert!(matches!(parts(d, t, None, None).build(), Ok(Temporal::DateTime(_))));
        assert!(matches!(
            parts(d, t, Some(-60), None).build(),
            Ok(Temporal::OffsetDateTime(_))
        ));
        assert!(matches!(
            parts(d, t, Some(660), Some("Australia/Hobart")).build(),
            Ok(Temporal::ZonedDateTime(_))
        ));
    }

    #[test]
    fn test_range_validation() {
        assert_eq!(
            parts(Some((2019, 2, 29)), None, None, None).build(),
            Err(TemporalError::Invalid)
        );
        assert!(parts(Some((2020, 2, 29)), None, None, None).build().is_ok());
        assert_eq!(
            parts(Some((2019, 13, 1)), None, None, None).build(),
            Err(TemporalError::Invalid)
        );
        assert_eq!(
            parts(None, Some((24, 0, 0, 0)), None, None).build(),
            Err(TemporalError::Invalid)
        );
        assert_eq!(
            parts(None, Some((10, 0, 0, 0)), Some(15 * 60), None).build(),
            Err(TemporalError::Invalid)
        );
        assert!(parts(None, Some((10, 0, 0, 0)), Some(14 * 60), None)
            .build()
            .is_ok());
        assert!(parts(None, Some((10, 0, 0, 0)), Some(-12 * 60), None)
            .build()
            .is_ok());
    }

    #[test]
    fn test_unknown_zone() {
        let err = parts(
            Some((2019, 1, 1)),
            Some((12, 0, 0, 0)),
            Some(660),
            Some("Australia/Bogansville"),
        )
        .build()
        .unwrap_err();
        assert_eq!(err, TemporalError::UnknownZone("Australia/Bogansville".into()));
    }

    #[test]
    fn test_display_forms() {
        let time = NaiveTime::from_hms_nano_opt(10, 23, 56, 123_000_000).unwrap();
        assert_eq!(Temporal::Time(time).to_string(), "10:23:56.123");

        let time = NaiveTime::from_hms_opt(8, 9, 10).unwrap();
        assert_eq!(Temporal::Time(time).to_string(), "08:09:10");

        let time = NaiveTime::from_hms_nano_opt(1, 2, 3, 456_700).unwrap();
        assert_eq!(Temporal::Time(time).to_string(), "01:02:03.000456700");

        let offset = FixedOffset::east_opt(-(11 * 3600 + 30 * 60)).unwrap();
        let ot = OffsetTime::new(NaiveTime::from_hms_opt(10, 11, 12).unwrap(), offset);
        assert_eq!(Temporal::OffsetTime(ot).to_string(), "10:11:12-11:30");

        let utc = FixedOffset::east_opt(0).unwrap();
        let ot = OffsetTime::new(NaiveTime::from_hms_opt(10, 11, 12).unwrap(), utc);
        assert_eq!(ot.to_string(), "10:11:12Z");
    }

    #[test]
    fn test_zoned_display_keeps_zone() {
        let zoned = parts(
            Some((2019, 12, 21)),
            Some((10, 11, 12, 0)),
            Some(660),
            Some("Australia/Hobart"),
        )
        .build()
        .unwrap();
        assert_eq!(
            zoned.to_string(),
            "2019-12-21T10:11:12+11:00[Australia/Hobart]"
        );
    }

    #[test]
    fn test_zoned_display_truncates_mean_time_offset() {
        let hobart = Some("Australia/Hobart");
        let date = Some((1890, 1, 1));
        let midnight = Some((0, 0, 0, 0));
        let zoned = parts(date, midnight, Some(600), hobart).build().unwrap();
        assert_eq!(
            zoned.to_string(),
            "1890-01-01T00:00:00+09:49[Australia/Hobart]"
        );
        assert_eq!(zoned.unwritable_reason(), None);

        let again = parts(date, midnight, Some(9 * 60 + 49), hobart)
            .build()
            .unwrap();
        assert_eq!(again, zoned);
    }

    #[test]
    fn test_unwritable_reason() {
        let noon = NaiveTime::from_hms_opt(12, 0, 0).unwrap();
        let far = NaiveDate::from_ymd_opt(12345, 1, 1).unwrap();
        assert_eq!(
            Temporal::Date(far).unwritable_reason(),
            Some("year outside 0000..=9999")
        );
        let negative = NaiveDate::from_ymd_opt(-1, 1, 1).unwrap();
        assert!(Temporal::DateTime(negative.and_time(noon))
            .unwritable_reason()
            .is_some());

        let leap = NaiveTime::from_hms_nano_opt(23, 59, 59, 1_500_000_000).unwrap();
        assert_eq!(Temporal::Time(leap).unwritable_reason(), Some("leap second"));

        let odd = FixedOffset::east_opt(3601).unwrap();
        assert_eq!(
            Temporal::OffsetTime(OffsetTime::new(noon, odd)).unwritable_reason(),
            Some("offset is not a whole number of minutes")
        );
        let wide = FixedOffset::east_opt(-13 * 3600).unwrap();
        let dt = wide
            .from_local_datetime(&NaiveDate::from_ymd_opt(2019, 1, 1).unwrap().and_time(noon))
            .single()
            .unwrap();
        assert_eq!(
            Temporal::OffsetDateTime(dt).unwritable_reason(),
            Some("offset outside -12:00..=+14:00")
        );

        assert_eq!(Temporal::Time(noon).unwritable_reason(), None);
        let year_zero = NaiveDate::from_ymd_opt(0, 1, 1).unwrap();
        assert_eq!(Temporal::Date(year_zero).unwritable_reason(), None);
    }

    #[test]
    fn test_offset_equality_is_structural() {
        let a = parts(Some((2019, 1, 1)), Some((12, 0, 0, 0)), Some(60), None)
            .build()
            .unwrap();
        let b = parts(Some((2019, 1, 1)), Some((11, 0, 0, 0)), Some(0), None)
            .build()
            .unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2000, 2), 29);
        assert_eq!(days_in_month(1900, 2), 28);
        assert_eq!(days_in_month(2019, 4), 30);
        assert_eq!(days_in_month(2019, 12), 31);
    }
}
