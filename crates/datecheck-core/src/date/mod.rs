pub mod exif;
pub mod guess;

use std::fmt;

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Placeholder shown for a field that is not known.
const UNKNOWN_FIELD: &str = "..";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DateError {
    #[error("not precise enough to be converted to a timestamp: {0}")]
    Imprecise(ApproxDate),
    #[error("not a valid calendar date/time: {0}")]
    InvalidCalendar(ApproxDate),
}

/// A point in time known only down to some precision.
///
/// Fields are filled from the most significant one (`year`) downwards: once a
/// field is `None`, every less significant field is `None` too. The guesser
/// never builds a date that breaks this, but construction does not check it,
/// nor does it check calendar legality (month 13 is accepted here and only
/// rejected by [`ApproxDate::to_datetime`]).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApproxDate {
    pub year: i32,
    pub month: Option<u32>,
    pub day: Option<u32>,
    pub hour: Option<u32>,
    pub minute: Option<u32>,
    pub second: Option<u32>,
}

/// Anything an [`ApproxDate`] can be asked to contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Moment {
    Approx(ApproxDate),
    DateTime(NaiveDateTime),
    Date(NaiveDate),
}

impl From<ApproxDate> for Moment {
    fn from(date: ApproxDate) -> Self {
        Moment::Approx(date)
    }
}

impl From<&ApproxDate> for Moment {
    fn from(date: &ApproxDate) -> Self {
        Moment::Approx(*date)
    }
}

impl From<NaiveDateTime> for Moment {
    fn from(dt: NaiveDateTime) -> Self {
        Moment::DateTime(dt)
    }
}

impl From<NaiveDate> for Moment {
    fn from(d: NaiveDate) -> Self {
        Moment::Date(d)
    }
}

impl From<Moment> for ApproxDate {
    fn from(moment: Moment) -> Self {
        match moment {
            Moment::Approx(date) => date,
            Moment::DateTime(dt) => ApproxDate::from(dt),
            Moment::Date(d) => ApproxDate::from(d),
        }
    }
}

impl From<NaiveDateTime> for ApproxDate {
    fn from(dt: NaiveDateTime) -> Self {
        ApproxDate::full(dt.year(), dt.month(), dt.day(), dt.hour(), dt.minute(), dt.second())
    }
}

impl From<NaiveDate> for ApproxDate {
    fn from(d: NaiveDate) -> Self {
        ApproxDate::ymd(d.year(), d.month(), d.day())
    }
}

impl ApproxDate {
    /// Build from the known fields, most significant first.
    pub fn new(
        year: i32,
        month: Option<u32>,
        day: Option<u32>,
        hour: Option<u32>,
        minute: Option<u32>,
        second: Option<u32>,
    ) -> Self {
        Self { year, month, day, hour, minute, second }
    }

    pub fn year(year: i32) -> Self {
        Self::new(year, None, None, None, None, None)
    }

    pub fn ym(year: i32, month: u32) -> Self {
        Self::new(year, Some(month), None, None, None, None)
    }

    pub fn ymd(year: i32, month: u32, day: u32) -> Self {
        Self::new(year, Some(month), Some(day), None, None, None)
    }

    pub fn ymdh(year: i32, month: u32, day: u32, hour: u32) -> Self {
        Self::new(year, Some(month), Some(day), Some(hour), None, None)
    }

    pub fn ymdhm(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> Self {
        Self::new(year, Some(month), Some(day), Some(hour), Some(minute), None)
    }

    pub fn full(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> Self {
        Self::new(year, Some(month), Some(day), Some(hour), Some(minute), Some(second))
    }

    /// Build from the leading known fields (`[year, month, ...]`).
    /// Returns `None` for an empty slice; anything past six values is ignored.
    pub fn from_leading(values: &[u32]) -> Option<Self> {
        let (&year, rest) = values.split_first()?;
        let field = |i: usize| rest.get(i).copied();
        Some(Self::new(
            i32::try_from(year).ok()?,
            field(0),
            field(1),
            field(2),
            field(3),
            field(4),
        ))
    }

    /// The five optional fields, most significant first.
    fn tail(&self) -> [Option<u32>; 5] {
        [self.month, self.day, self.hour, self.minute, self.second]
    }

    /// True iff every field down to the second is known.
    pub fn is_precise(&self) -> bool {
        self.tail().iter().all(Option::is_some)
    }

    /// Convert to an exact timestamp. Fails for imprecise dates and for field
    /// values that do not form a real calendar date/time.
    pub fn to_datetime(&self) -> Result<NaiveDateTime, DateError> {
        let (Some(month), Some(day), Some(hour), Some(minute), Some(second)) =
            (self.month, self.day, self.hour, self.minute, self.second)
        else {
            return Err(DateError::Imprecise(*self));
        };
        NaiveDate::from_ymd_opt(self.year, month, day)
            .and_then(|d| d.and_hms_opt(hour, minute, second))
            .ok_or(DateError::InvalidCalendar(*self))
    }

    /// Whether `other` is compatible with this date at this date's precision.
    ///
    /// Fields are compared from year down to second. The first field this
    /// date leaves open while `other` knows it decides `true`; the first field
    /// this date knows while `other` leaves it open decides `false`; a
    /// differing field decides `false`.
    pub fn contains(&self, other: impl Into<Moment>) -> bool {
        let other: Moment = other.into();
        let other = ApproxDate::from(other);
        if self.year != other.year {
            return false;
        }
        for (mine, theirs) in self.tail().into_iter().zip(other.tail()) {
            match (mine, theirs) {
                (None, Some(_)) => return true,
                (Some(_), None) => return false,
                (Some(a), Some(b)) if a != b => return false,
                _ => {}
            }
        }
        true
    }

    /// Human-oriented description picking the coarsest way to say it,
    /// e.g. `somewhen in Apr 2012`.
    pub fn describe(&self) -> String {
        if self.hour.is_some() {
            let part = |v: Option<u32>| v.map_or_else(|| UNKNOWN_FIELD.to_string(), |v| v.to_string());
            return format!(
                "{}-{}-{} {}:{}:{}",
                self.year,
                part(self.month),
                part(self.day),
                part(self.hour),
                part(self.minute),
                part(self.second)
            );
        }
        match (self.month, self.day) {
            (Some(month), Some(day)) => match NaiveDate::from_ymd_opt(self.year, month, day) {
                Some(d) => format!("somewhen on {}", d.format("%Y-%m-%d")),
                None => format!("somewhen on {}-{:02}-{:02}", self.year, month, day),
            },
            (Some(month), None) => {
                let name = month
                    .checked_sub(1)
                    .and_then(|i| MONTHS.get(i as usize))
                    .map_or_else(|| format!("month {month}"), |n| n.to_string());
                format!("somewhen in {} {}", name, self.year)
            }
            _ => format!("somewhen in {}", self.year),
        }
    }
}

/// Aligned rendering: `2012-04-.. ..:..:..`.
impl fmt::Display for ApproxDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [month, day, hour, minute, second] = self.tail().map(|v| match v {
            Some(v) => format!("{v:02}"),
            None => UNKNOWN_FIELD.to_string(),
        });
        write!(f, "{:02}-{}-{} {}:{}:{}", self.year, month, day, hour, minute, second)
    }
}

impl fmt::Debug for ApproxDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<ApproxDate \"{}\">", self.describe())
    }
}
