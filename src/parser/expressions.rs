use regex::{Captures, Regex};
use time::util::days_in_year_month;
use time::{Date, Duration, Month, OffsetDateTime, PrimitiveDateTime, Time, Weekday};

use crate::zone::{FixedZone, LocalZone};

/// Hour used when a phrase names a day but no time ("on friday").
pub const DEFAULT_HOUR: u8 = 9;
const TONIGHT_HOUR: u8 = 20;

const NUMBER: &str = r"(\d{1,4}|an?|one|two|three|four|five|six|seven|eight|nine|ten|eleven|twelve|fifteen|twenty|thirty|forty[- ]five|sixty)";
const UNIT: &str = r"(seconds?|secs?|minutes?|mins?|hours?|hrs?|days?|weeks?|wks?|months?|years?|yrs?)";
const MONTH: &str = r"(jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)";
const WEEKDAY_FULL: &str = r"(monday|tuesday|wednesday|thursday|friday|saturday|sunday)";
const WEEKDAY_SHORT: &str = r"(mon|tues?|wed|thur?s?|fri|sat|sun)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Unit {
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatePhrase {
    Today,
    Tonight,
    DaysFromToday(i64),
    Weekday { weekday: Weekday, next: bool },
    Calendar { year: Option<i32>, month: Month, day: u8 },
    /// Moves the calendar but keeps the current time of day ("in 3 days").
    Shift { amount: i64, unit: Unit },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimePhrase {
    pub hour: u8,
    pub minute: u8,
    /// No meridiem was given, so `hour` may mean either half of the day.
    pub ambiguous: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phrase {
    Date(DatePhrase),
    Time(TimePhrase),
    Elapsed { amount: i64, unit: Unit },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Candidate {
    start: usize,
    end: usize,
    phrase: Phrase,
}

/// The first date/time expression found in a piece of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expression {
    pub start: usize,
    pub end: usize,
    pub date: OffsetDateTime,
}

type Build = fn(&Captures) -> Option<Phrase>;

struct Rule {
    pattern: Regex,
    build: Build,
}

fn rule(pattern: impl Into<String>, build: Build) -> (String, Build) {
    (pattern.into(), build)
}

pub struct ExpressionFinder {
    rules: Vec<Rule>,
}

impl Default for ExpressionFinder {
    fn default() -> Self {
        Self::new()
    }
}

impl ExpressionFinder {
    pub fn new() -> Self {
        let table: Vec<(String, Build)> = vec![
            rule(format!(r"\bin\s+{NUMBER}\s+{UNIT}\b"), build_offset),
            rule(format!(r"\b{NUMBER}\s+{UNIT}\s+from\s+now\b"), build_offset),
            rule(r"\bin\s+half\s+an?\s+hour\b", build_half_hour),
            rule(r"\bin\s+an?\s+hour\s+and\s+a\s+half\b", build_hour_and_half),
            rule(r"\b(?:the\s+)?day\s+after\s+tomorrow\b", build_day_after_tomorrow),
            rule(r"\b(?:tomorrow|tmrw|tmr)\b", build_tomorrow),
            rule(r"\btoday\b", build_today),
            rule(r"\btonight\b", build_tonight),
            rule(
                format!(r"\b(?:on\s+)?(?:(this|next|coming)\s+)?{WEEKDAY_FULL}\b"),
                build_weekday,
            ),
            rule(
                format!(r"\b(?:on|(this|next|coming))\s+{WEEKDAY_SHORT}\b\.?"),
                build_weekday,
            ),
            rule(r"\bnext\s+(week|month|year)\b", build_next_period),
            rule(r"\b(?:on\s+)?(\d{4})-(\d{1,2})-(\d{1,2})\b", build_iso_date),
            rule(
                r"\b(?:on\s+)?(\d{1,2})/(\d{1,2})(?:/(\d{4}|\d{2}))?\b",
                build_slash_date,
            ),
            rule(
                format!(r"\b(?:on\s+)?{MONTH}\.?\s+(\d{{1,2}})(?:st|nd|rd|th)?(?:,?\s+(\d{{4}}))?\b"),
                build_month_first,
            ),
            rule(
                format!(r"\b(?:on\s+)?(?:the\s+)?(\d{{1,2}})(?:st|nd|rd|th)?\s+(?:of\s+)?{MONTH}\b\.?(?:,?\s+(\d{{4}})\b)?"),
                build_day_first,
            ),
            rule(
                r"\b(?:at\s+)?(\d{1,2})(?::(\d{2}))?\s*([ap])\.?m\b\.?",
                build_meridiem_time,
            ),
            rule(r"\b(?:at\s+)?(\d{1,2}):(\d{2})\b", build_clock_time),
            rule(
                r"\bat\s+(\d{1,2})(?:\s*o'?clock)?(?:$|[^\w:/.])",
                build_bare_hour,
            ),
            rule(r"\b(?:at\s+)?(noon|midday|midnight)\b", build_named_time),
            rule(
                r"\b(?:in\s+the\s+|this\s+)?(morning|afternoon|evening)\b",
                build_named_time,
            ),
        ];

        let rules = table
            .into_iter()
            .map(|(pattern, build)| Rule {
                pattern: Regex::new(&format!("(?i){pattern}")).unwrap(),
                build,
            })
            .collect();

        Self { rules }
    }

    /// Finds and resolves the first expression in `text`, reading wall-clock
    /// phrases in `now`'s fixed UTC offset.
    pub fn find(&self, text: &str, now: OffsetDateTime) -> Option<Expression> {
        self.find_in(text, now, &FixedZone(now.offset()))
    }

    /// Like [`find`](Self::find), but wall-clock phrases are read in `zone`,
    /// using the offset in effect on the resolved date.
    pub fn find_in(
        &self,
        text: &str,
        now: OffsetDateTime,
        zone: &dyn LocalZone,
    ) -> Option<Expression> {
        let candidates = self.candidates(text);
        let first = *candidates.first()?;
        let clock = Clock {
            now: zone.to_local(now),
            zone,
        };

        let (end, date) = match first.phrase {
            Phrase::Elapsed { amount, unit } => (first.end, clock.elapse(amount, unit)?),
            Phrase::Date(date) => match self.adjacent(text, &candidates, first.end, is_time) {
                Some(next) => {
                    let Phrase::Time(time) = next.phrase else {
                        return None;
                    };
                    (next.end, resolve(Some(date), Some(time), &clock)?)
                }
                None => (first.end, resolve(Some(date), None, &clock)?),
            },
            Phrase::Time(time) => match self.adjacent(text, &candidates, first.end, is_date) {
                Some(next) => {
                    let Phrase::Date(date) = next.phrase else {
                        return None;
                    };
                    (next.end, resolve(Some(date), Some(time), &clock)?)
                }
                None => (first.end, resolve(None, Some(time), &clock)?),
            },
        };

        Some(Expression {
            start: first.start,
            end,
            date: date.replace_nanosecond(0).unwrap_or(date),
        })
    }

    fn candidates(&self, text: &str) -> Vec<Candidate> {
        let mut found = Vec::new();
        for rule in &self.rules {
            for caps in rule.pattern.captures_iter(text) {
                let Some(whole) = caps.get(0) else {
                    continue;
                };
                let Some(phrase) = (rule.build)(&caps) else {
                    continue;
                };
                let trimmed = whole
                    .as_str()
                    .trim_end_matches(|c: char| c.is_whitespace() || ",;!?".contains(c));
                if trimmed.is_empty() {
                    continue;
                }
                found.push(Candidate {
                    start: whole.start(),
                    end: whole.start() + trimmed.len(),
                    phrase,
                });
            }
        }
        found.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));
        found
    }

    /// A date and a time join into one expression when only spaces or a
    /// comma separate them.
    fn adjacent<'a>(
        &self,
        text: &str,
        candidates: &'a [Candidate],
        after: usize,
        wanted: fn(&Phrase) -> bool,
    ) -> Option<&'a Candidate> {
        candidates
            .iter()
            .filter(|c| c.start >= after && wanted(&c.phrase))
            .find(|c| {
                text[after..c.start]
                    .chars()
                    .all(|ch| ch.is_whitespace() || ch == ',')
            })
    }
}

fn is_time(phrase: &Phrase) -> bool {
    matches!(phrase, Phrase::Time(_))
}

fn is_date(phrase: &Phrase) -> bool {
    matches!(phrase, Phrase::Date(_))
}

fn build_half_hour(_: &Captures) -> Option<Phrase> {
    Some(Phrase::Elapsed {
        amount: 30,
        unit: Unit::Minute,
    })
}

fn build_hour_and_half(_: &Captures) -> Option<Phrase> {
    Some(Phrase::Elapsed {
        amount: 90,
        unit: Unit::Minute,
    })
}

fn build_day_after_tomorrow(_: &Captures) -> Option<Phrase> {
    Some(Phrase::Date(DatePhrase::DaysFromToday(2)))
}

fn build_tomorrow(_: &Captures) -> Option<Phrase> {
    Some(Phrase::Date(DatePhrase::DaysFromToday(1)))
}

fn build_today(_: &Captures) -> Option<Phrase> {
    Some(Phrase::Date(DatePhrase::Today))
}

fn build_tonight(_: &Captures) -> Option<Phrase> {
    Some(Phrase::Date(DatePhrase::Tonight))
}

fn build_offset(caps: &Captures) -> Option<Phrase> {
    let amount = parse_number(caps.get(1)?.as_str())?;
    let unit = parse_unit(caps.get(2)?.as_str())?;
    if unit >= Unit::Day {
        Some(Phrase::Date(DatePhrase::Shift { amount, unit }))
    } else {
        Some(Phrase::Elapsed { amount, unit })
    }
}

fn build_weekday(caps: &Captures) -> Option<Phrase> {
    let next = caps
        .get(1)
        .map(|m| m.as_str().eq_ignore_ascii_case("next"))
        .unwrap_or(false);
    let weekday = parse_weekday(caps.get(2)?.as_str())?;
    Some(Phrase::Date(DatePhrase::Weekday { weekday, next }))
}

fn build_next_period(caps: &Captures) -> Option<Phrase> {
    let unit = parse_unit(caps.get(1)?.as_str())?;
    Some(Phrase::Date(DatePhrase::Shift { amount: 1, unit }))
}

fn build_iso_date(caps: &Captures) -> Option<Phrase> {
    let year: i32 = caps.get(1)?.as_str().parse().ok()?;
    let month: u8 = caps.get(2)?.as_str().parse().ok()?;
    let day: u8 = caps.get(3)?.as_str().parse().ok()?;
    calendar(Some(year), month, day)
}

/// Slash dates are month first: `12/24`, `12/24/26`, `12/24/2026`.
fn build_slash_date(caps: &Captures) -> Option<Phrase> {
    let month: u8 = caps.get(1)?.as_str().parse().ok()?;
    let day: u8 = caps.get(2)?.as_str().parse().ok()?;
    let year = match caps.get(3) {
        Some(raw) => {
            let value: i32 = raw.as_str().parse().ok()?;
            Some(if raw.as_str().len() == 2 { 2000 + value } else { value })
        }
        None => None,
    };
    calendar(year, month, day)
}

fn build_month_first(caps: &Captures) -> Option<Phrase> {
    let month = parse_month(caps.get(1)?.as_str())?;
    let day: u8 = caps.get(2)?.as_str().parse().ok()?;
    let year = match caps.get(3) {
        Some(raw) => Some(raw.as_str().parse().ok()?),
        None => None,
    };
    calendar(year, month as u8, day)
}

fn build_day_first(caps: &Captures) -> Option<Phrase> {
    let day: u8 = caps.get(1)?.as_str().parse().ok()?;
    let month = parse_month(caps.get(2)?.as_str())?;
    let year = match caps.get(3) {
        Some(raw) => Some(raw.as_str().parse().ok()?),
        None => None,
    };
    calendar(year, month as u8, day)
}

fn build_meridiem_time(caps: &Captures) -> Option<Phrase> {
    let hour: u8 = caps.get(1)?.as_str().parse().ok()?;
    let minute: u8 = match caps.get(2) {
        Some(raw) => raw.as_str().parse().ok()?,
        None => 0,
    };
    if !(1..=12).contains(&hour) || minute > 59 {
        return None;
    }
    let pm = caps.get(3)?.as_str().eq_ignore_ascii_case("p");
    let hour = match (hour, pm) {
        (12, false) => 0,
        (12, true) => 12,
        (h, true) => h + 12,
        (h, false) => h,
    };
    Some(Phrase::Time(TimePhrase {
        hour,
        minute,
        ambiguous: false,
    }))
}

fn build_clock_time(caps: &Captures) -> Option<Phrase> {
    let raw_hour = caps.get(1)?.as_str();
    let hour: u8 = raw_hour.parse().ok()?;
    let minute: u8 = caps.get(2)?.as_str().parse().ok()?;
    if hour > 23 || minute > 59 {
        return None;
    }
    let zero_padded = raw_hour.len() == 2 && raw_hour.starts_with('0');
    Some(Phrase::Time(TimePhrase {
        hour,
        minute,
        ambiguous: (1..=12).contains(&hour) && !zero_padded,
    }))
}

fn build_bare_hour(caps: &Captures) -> Option<Phrase> {
    let hour: u8 = caps.get(1)?.as_str().parse().ok()?;
    if hour > 23 {
        return None;
    }
    Some(Phrase::Time(TimePhrase {
        hour,
        minute: 0,
        ambiguous: (1..=12).contains(&hour),
    }))
}

fn build_named_time(caps: &Captures) -> Option<Phrase> {
    let hour = match caps.get(1)?.as_str().to_ascii_lowercase().as_str() {
        "noon" | "midday" => 12,
        "midnight" => 0,
        "morning" => 9,
        "afternoon" => 15,
        "evening" => 18,
        _ => return None,
    };
    Some(Phrase::Time(TimePhrase {
        hour,
        minute: 0,
        ambiguous: false,
    }))
}

/// Rejects impossible dates. Without a year, February 29th is allowed and
/// resolved to the next leap year later on.
fn calendar(year: Option<i32>, month: u8, day: u8) -> Option<Phrase> {
    let month = Month::try_from(month).ok()?;
    let max_day = days_in_year_month(year.unwrap_or(2024), month);
    if day == 0 || day > max_day {
        return None;
    }
    Some(Phrase::Date(DatePhrase::Calendar { year, month, day }))
}

fn parse_number(raw: &str) -> Option<i64> {
    let lowered = raw.to_ascii_lowercase();
    let value = match lowered.as_str() {
        "a" | "an" | "one" => 1,
        "two" => 2,
        "three" => 3,
        "four" => 4,
        "five" => 5,
        "six" => 6,
        "seven" => 7,
        "eight" => 8,
        "nine" => 9,
        "ten" => 10,
        "eleven" => 11,
        "twelve" => 12,
        "fifteen" => 15,
        "twenty" => 20,
        "thirty" => 30,
        "forty five" | "forty-five" => 45,
        "sixty" => 60,
        digits => digits.parse().ok()?,
    };
    Some(value)
}

fn parse_unit(raw: &str) -> Option<Unit> {
    let lowered = raw.to_ascii_lowercase();
    let unit = match lowered.trim_end_matches('s') {
        "second" | "sec" => Unit::Second,
        "minute" | "min" => Unit::Minute,
        "hour" | "hr" => Unit::Hour,
        "day" => Unit::Day,
        "week" | "wk" => Unit::Week,
        "month" => Unit::Month,
        "year" | "yr" => Unit::Year,
        _ => return None,
    };
    Some(unit)
}

fn parse_weekday(raw: &str) -> Option<Weekday> {
    let lowered = raw.to_ascii_lowercase();
    let weekday = match lowered.get(..3)? {
        "mon" => Weekday::Monday,
        "tue" => Weekday::Tuesday,
        "wed" => Weekday::Wednesday,
        "thu" => Weekday::Thursday,
        "fri" => Weekday::Friday,
        "sat" => Weekday::Saturday,
        "sun" => Weekday::Sunday,
        _ => return None,
    };
    Some(weekday)
}

fn parse_month(raw: &str) -> Option<Month> {
    let lowered = raw.to_ascii_lowercase();
    let month = match lowered.get(..3)? {
        "jan" => Month::January,
        "feb" => Month::February,
        "mar" => Month::March,
        "apr" => Month::April,
        "may" => Month::May,
        "jun" => Month::June,
        "jul" => Month::July,
        "aug" => Month::August,
        "sep" => Month::September,
        "oct" => Month::October,
        "nov" => Month::November,
        "dec" => Month::December,
        _ => return None,
    };
    Some(month)
}

/// The reference instant, already expressed in the zone phrases are read in.
struct Clock<'a> {
    now: OffsetDateTime,
    zone: &'a dyn LocalZone,
}

impl Clock<'_> {
    fn today(&self) -> Date {
        self.now.date()
    }

    fn at(&self, date: Date, hour: u8, minute: u8) -> Option<OffsetDateTime> {
        let time = Time::from_hms(hour, minute, 0).ok()?;
        Some(self.zone.assume_local(PrimitiveDateTime::new(date, time)))
    }

    /// Sub-day amounts are exact durations.
    fn elapse(&self, amount: i64, unit: Unit) -> Option<OffsetDateTime> {
        let duration = match unit {
            Unit::Second => Duration::seconds(amount),
            Unit::Minute => Duration::minutes(amount),
            Unit::Hour => Duration::hours(amount),
            _ => return self.shift(amount, unit),
        };
        let instant = self.now.checked_add(duration)?;
        Some(self.zone.to_local(instant))
    }

    /// Day and longer amounts move the calendar and keep the wall-clock time.
    fn shift(&self, amount: i64, unit: Unit) -> Option<OffsetDateTime> {
        let date = shift_date(self.today(), amount, unit)?;
        Some(
            self.zone
                .assume_local(PrimitiveDateTime::new(date, self.now.time())),
        )
    }
}

fn shift_date(date: Date, amount: i64, unit: Unit) -> Option<Date> {
    match unit {
        Unit::Second | Unit::Minute | Unit::Hour | Unit::Day => {
            date.checked_add(Duration::days(amount))
        }
        Unit::Week => date.checked_add(Duration::weeks(amount)),
        Unit::Month => add_months(date, amount),
        Unit::Year => add_months(date, amount.checked_mul(12)?),
    }
}

/// Adds calendar months, clamping the day to the target month's length.
fn add_months(date: Date, months: i64) -> Option<Date> {
    let index = i64::from(date.year()) * 12 + i64::from(date.month() as u8 - 1) + months;
    let year = i32::try_from(index.div_euclid(12)).ok()?;
    let month = Month::try_from((index.rem_euclid(12) + 1) as u8).ok()?;
    let day = date.day().min(days_in_year_month(year, month));
    Date::from_calendar_date(year, month, day).ok()
}

fn resolve(
    date: Option<DatePhrase>,
    time: Option<TimePhrase>,
    clock: &Clock,
) -> Option<OffsetDateTime> {
    let Some(date) = date else {
        return resolve_time_only(time?, clock);
    };
    let today = clock.today();

    if let Some(time) = time.filter(|time| time.ambiguous) {
        match date {
            DatePhrase::Tonight => return resolve_tonight(time, clock),
            DatePhrase::Today => {
                let (morning, evening) = (time.hour % 12, time.hour % 12 + 12);
                return earliest_future(&[today], &[morning, evening], time.minute, clock)
                    .or_else(|| clock.at(today, evening, time.minute));
            }
            _ => {}
        }
    }

    let (hour, minute) = match time {
        Some(TimePhrase {
            hour,
            minute,
            ambiguous: true,
        }) if (1..=7).contains(&hour) => (hour + 12, minute),
        Some(time) => (time.hour, time.minute),
        None => match date {
            DatePhrase::Tonight => (TONIGHT_HOUR, 0),
            DatePhrase::Shift { amount, unit } => return clock.shift(amount, unit),
            _ => (DEFAULT_HOUR, 0),
        },
    };

    match date {
        DatePhrase::Today | DatePhrase::Tonight => clock.at(today, hour, minute),
        DatePhrase::DaysFromToday(days) => {
            clock.at(today.checked_add(Duration::days(days))?, hour, minute)
        }
        DatePhrase::Shift { amount, unit } => {
            clock.at(shift_date(today, amount, unit)?, hour, minute)
        }
        DatePhrase::Weekday { weekday, next } => {
            let ahead = (7 + i64::from(weekday.number_days_from_monday())
                - i64::from(today.weekday().number_days_from_monday()))
                % 7;
            let ahead = if ahead == 0 && next { 7 } else { ahead };
            let day = today.checked_add(Duration::days(ahead))?;
            let candidate = clock.at(day, hour, minute)?;
            if candidate <= clock.now {
                clock.at(day.checked_add(Duration::weeks(1))?, hour, minute)
            } else {
                Some(candidate)
            }
        }
        DatePhrase::Calendar {
            year: Some(year),
            month,
            day,
        } => clock.at(Date::from_calendar_date(year, month, day).ok()?, hour, minute),
        DatePhrase::Calendar {
            year: None,
            month,
            day,
        } => (today.year()..=today.year() + 8)
            .filter_map(|year| Date::from_calendar_date(year, month, day).ok())
            .filter_map(|date| clock.at(date, hour, minute))
            .find(|candidate| *candidate > clock.now),
    }
}

/// "tonight at 9" is always the evening; "tonight at 12" is the coming
/// midnight.
fn resolve_tonight(time: TimePhrase, clock: &Clock) -> Option<OffsetDateTime> {
    let today = clock.today();
    match time.hour % 12 {
        0 => clock.at(today.next_day()?, 0, time.minute),
        hour => clock.at(today, hour + 12, time.minute),
    }
}

/// A bare time means its next occurrence; an hour without am/pm takes
/// whichever half of the day comes first.
fn resolve_time_only(time: TimePhrase, clock: &Clock) -> Option<OffsetDateTime> {
    let hours = if time.ambiguous {
        vec![time.hour % 12, time.hour % 12 + 12]
    } else {
        vec![time.hour]
    };
    let today = clock.today();
    earliest_future(&[today, today.next_day()?], &hours, time.minute, clock)
}

fn earliest_future(
    days: &[Date],
    hours: &[u8],
    minute: u8,
    clock: &Clock,
) -> Option<OffsetDateTime> {
    days.iter()
        .flat_map(|day| hours.iter().filter_map(move |hour| clock.at(*day, *hour, minute)))
        .filter(|candidate| *candidate > clock.now)
        .min()
}
