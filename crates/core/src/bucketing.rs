use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Days, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::CalendarEvent;

/// Number of day cards in the week view.
pub const WEEK_LEN: usize = 5;

/// Events listed per month cell before collapsing into "+N more".
pub const MONTH_CELL_LIMIT: usize = 3;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CalendarError {
    #[error("date arithmetic out of range near {0}")]
    OutOfRange(NaiveDate),
    #[error("unknown week mode: {0}")]
    UnknownWeekMode(String),
}

/// Which five days the week view covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeekMode {
    /// Monday through Friday of the current week.
    #[default]
    #[serde(rename = "mon-fri")]
    MonFri,
    /// Today and the four days after it.
    #[serde(rename = "next-5")]
    Next5,
}

impl std::str::FromStr for WeekMode {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mon-fri" => Ok(Self::MonFri),
            "next-5" => Ok(Self::Next5),
            other => Err(CalendarError::UnknownWeekMode(other.to_string())),
        }
    }
}

/// Events that start on one calendar day, ordered by start.
#[derive(Debug, Clone, PartialEq)]
pub struct DayBucket<'a> {
    pub date: NaiveDate,
    pub events: Vec<&'a CalendarEvent>,
}

impl<'a> DayBucket<'a> {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            events: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// The first `limit` events.
    pub fn shown(&self, limit: usize) -> &[&'a CalendarEvent] {
        &self.events[..self.events.len().min(limit)]
    }

    /// How many events `shown(limit)` leaves out.
    pub fn overflow(&self, limit: usize) -> usize {
        self.events.len().saturating_sub(limit)
    }

    fn sort(&mut self) {
        self.events.sort_by_key(|ev| ev.start);
    }
}

/// One cell of the month grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonthCell {
    Blank,
    Day(NaiveDate),
}

/// Events whose start falls on `date` in `tz`.
pub fn events_on<'a, Tz: TimeZone>(
    events: &'a [CalendarEvent],
    date: NaiveDate,
    tz: &Tz,
) -> DayBucket<'a> {
    let mut bucket = DayBucket::new(date);
    bucket
        .events
        .extend(events.iter().filter(|ev| ev.date_in(tz) == date));
    bucket.sort();
    bucket
}

pub fn today<'a, Tz: TimeZone>(events: &'a [CalendarEvent], now: &DateTime<Tz>) -> DayBucket<'a> {
    events_on(events, now.date_naive(), &now.timezone())
}

/// Events on the calendar day after `now`. Uses date arithmetic, not
/// "now + 24h", so DST changes cannot skip or repeat a day.
pub fn tomorrow<'a, Tz: TimeZone>(
    events: &'a [CalendarEvent],
    now: &DateTime<Tz>,
) -> Result<DayBucket<'a>, CalendarError> {
    let today = now.date_naive();
    let next = today.succ_opt().ok_or(CalendarError::OutOfRange(today))?;
    Ok(events_on(events, next, &now.timezone()))
}

/// First day shown by the week view.
///
/// In `MonFri` mode a Sunday belongs to the week that just ended, so its
/// Monday is six days earlier.
pub fn week_start(today: NaiveDate, mode: WeekMode) -> Result<NaiveDate, CalendarError> {
    match mode {
        WeekMode::Next5 => Ok(today),
        WeekMode::MonFri => {
            let back = u64::from(today.weekday().num_days_from_monday());
            today
                .checked_sub_days(Days::new(back))
                .ok_or(CalendarError::OutOfRange(today))
        }
    }
}

pub fn week_days<Tz: TimeZone>(
    now: &DateTime<Tz>,
    mode: WeekMode,
) -> Result<[NaiveDate; WEEK_LEN], CalendarError> {
    let start = week_start(now.date_naive(), mode)?;
    let mut days = [start; WEEK_LEN];
    for (offset, day) in (0u64..).zip(days.iter_mut()) {
        *day = start
            .checked_add_days(Days::new(offset))
            .ok_or(CalendarError::OutOfRange(start))?;
    }
    Ok(days)
}

/// One bucket per week day, in order. Events outside the five days are
/// left out.
pub fn week_buckets<'a, Tz: TimeZone>(
    events: &'a [CalendarEvent],
    now: &DateTime<Tz>,
    mode: WeekMode,
) -> Result<Vec<DayBucket<'a>>, CalendarError> {
    let tz = now.timezone();
    Ok(week_days(now, mode)?
        .into_iter()
        .map(|day| events_on(events, day, &tz))
        .collect())
}

/// Sunday-aligned grid for `now`'s month: blanks before day 1, one cell per
/// day, blanks after so the cell count is a multiple of 7.
pub fn month_grid<Tz: TimeZone>(now: &DateTime<Tz>) -> Result<Vec<MonthCell>, CalendarError> {
    let today = now.date_naive();
    let first = today.with_day(1).ok_or(CalendarError::OutOfRange(today))?;
    let days = days_in_month(first)?;
    let leading = first.weekday().num_days_from_sunday() as usize;
    let total = (leading + days).div_ceil(7) * 7;

    let mut cells = Vec::with_capacity(total);
    cells.extend(std::iter::repeat_n(MonthCell::Blank, leading));
    for day in first.iter_days().take(days) {
        cells.push(MonthCell::Day(day));
    }
    cells.resize(total, MonthCell::Blank);
    Ok(cells)
}

/// Events in `now`'s month grouped by day. Each group is sorted by start;
/// truncation for display is left to the renderer.
pub fn month_buckets<'a, Tz: TimeZone>(
    events: &'a [CalendarEvent],
    now: &DateTime<Tz>,
) -> BTreeMap<NaiveDate, DayBucket<'a>> {
    let tz = now.timezone();
    let (year, month) = (now.year(), now.month());
    let mut by_day: BTreeMap<NaiveDate, DayBucket<'a>> = BTreeMap::new();

    for ev in events {
        let date = ev.date_in(&tz);
        if date.year() != year || date.month() != month {
            continue;
        }
        by_day
            .entry(date)
            .or_insert_with(|| DayBucket::new(date))
            .events
            .push(ev);
    }

    for bucket in by_day.values_mut() {
        bucket.sort();
    }
    by_day
}

fn days_in_month(first: NaiveDate) -> Result<usize, CalendarError> {
    let next_first = first
        .checked_add_months(chrono::Months::new(1))
        .ok_or(CalendarError::OutOfRange(first))?;
    Ok(next_first.signed_duration_since(first).num_days() as usize)
}
