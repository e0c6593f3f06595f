//! Wall-clock time zones. Phrases like "on december 25 at 8am" name a local
//! time; the offset that applies is looked up for that date, not for today.

use chrono::{Local, NaiveDate, NaiveDateTime, Offset, TimeZone};
use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};

pub trait LocalZone: Send + Sync {
    /// Offset in effect at `instant`.
    fn utc_offset(&self, instant: OffsetDateTime) -> UtcOffset;

    /// Offset for a wall-clock time. Repeated times take the earlier
    /// instant; skipped times are read with the offset from before the gap,
    /// which moves them forward.
    fn local_offset(&self, local: PrimitiveDateTime) -> UtcOffset;

    fn assume_local(&self, local: PrimitiveDateTime) -> OffsetDateTime {
        local.assume_offset(self.local_offset(local))
    }

    fn to_local(&self, instant: OffsetDateTime) -> OffsetDateTime {
        instant.to_offset(self.utc_offset(instant))
    }
}

/// A zone without daylight saving, used when `utc_offset_minutes` is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedZone(pub UtcOffset);

impl LocalZone for FixedZone {
    fn utc_offset(&self, _instant: OffsetDateTime) -> UtcOffset {
        self.0
    }

    fn local_offset(&self, _local: PrimitiveDateTime) -> UtcOffset {
        self.0
    }
}

/// The operating system's zone (honours `TZ`), including its DST rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemZone;

impl LocalZone for SystemZone {
    fn utc_offset(&self, instant: OffsetDateTime) -> UtcOffset {
        let seconds = chrono::DateTime::from_timestamp(instant.unix_timestamp(), 0)
            .map(|utc| Local.offset_from_utc_datetime(&utc.naive_utc()).fix().local_minus_utc())
            .unwrap_or(0);
        whole_seconds(seconds)
    }

    fn local_offset(&self, local: PrimitiveDateTime) -> UtcOffset {
        let Some(naive) = to_naive(local) else {
            return UtcOffset::UTC;
        };
        let seconds = match Local.from_local_datetime(&naive).earliest() {
            Some(resolved) => resolved.offset().fix().local_minus_utc(),
            None => {
                let before = naive - chrono::Duration::hours(1);
                Local
                    .from_local_datetime(&before)
                    .earliest()
                    .map(|resolved| resolved.offset().fix().local_minus_utc())
                    .unwrap_or_else(|| Local.offset_from_utc_datetime(&naive).fix().local_minus_utc())
            }
        };
        whole_seconds(seconds)
    }
}

fn to_naive(local: PrimitiveDateTime) -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(local.year(), u32::from(u8::from(local.month())), u32::from(local.day()))?
        .and_hms_opt(
            u32::from(local.hour()),
            u32::from(local.minute()),
            u32::from(local.second()),
        )
}

fn whole_seconds(seconds: i32) -> UtcOffset {
    UtcOffset::from_whole_seconds(seconds).unwrap_or(UtcOffset::UTC)
}

/// Central European rules (CET/CEST, switching at 01:00 UTC on the last
/// Sunday of March and October), for tests that need a DST change.
#[cfg(test)]
pub(crate) struct CentralEurope;

#[cfg(test)]
impl CentralEurope {
    const WINTER: UtcOffset = time::macros::offset!(+1);
    const SUMMER: UtcOffset = time::macros::offset!(+2);

    fn switch(year: i32, month: time::Month) -> OffsetDateTime {
        let last = time::Date::from_calendar_date(year, month, 31).unwrap();
        let back = i64::from(last.weekday().number_days_from_sunday());
        let sunday = last - time::Duration::days(back);
        PrimitiveDateTime::new(sunday, time::macros::time!(01:00)).assume_utc()
    }
}

#[cfg(test)]
impl LocalZone for CentralEurope {
    fn utc_offset(&self, instant: OffsetDateTime) -> UtcOffset {
        let year = instant.to_offset(UtcOffset::UTC).year();
        let summer = Self::switch(year, time::Month::March)..Self::switch(year, time::Month::October);
        if summer.contains(&instant) {
            Self::SUMMER
        } else {
            Self::WINTER
        }
    }

    fn local_offset(&self, local: PrimitiveDateTime) -> UtcOffset {
        [Self::SUMMER, Self::WINTER]
            .into_iter()
            .find(|offset| self.utc_offset(local.assume_offset(*offset)) == *offset)
            .unwrap_or(Self::WINTER)
    }
}
