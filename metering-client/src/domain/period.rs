use std::fmt;

use time::{Date, Month, OffsetDateTime};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PeriodError {
    #[error("month {0} is outside 1-12")]
    MonthOutOfRange(u8),
    #[error("year {0} is outside the supported calendar range")]
    YearOutOfRange(i32),
}

/// A calendar month under billing, expanded at construction into the
/// half-open UTC range `[first-of-month, first-of-next-month)` that the
/// range-scanned queries bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BillingPeriod {
    year: i32,
    month: Month,
    start: OffsetDateTime,
    end: OffsetDateTime,
}

impl BillingPeriod {
    pub fn from_ym(year: i32, month: u8) -> Result<Self, PeriodError> {
        let month = Month::try_from(month).map_err(|_| PeriodError::MonthOutOfRange(month))?;

        let start = Date::from_calendar_date(year, month, 1)
            .map_err(|_| PeriodError::YearOutOfRange(year))?;

        let (next_year, next_month) = match month {
            Month::December => (year + 1, Month::January),
            m => (year, m.next()),
        };
        let end = Date::from_calendar_date(next_year, next_month, 1)
            .map_err(|_| PeriodError::YearOutOfRange(next_year))?;

        Ok(Self {
            year,
            month,
            start: start.midnight().assume_utc(),
            end: end.midnight().assume_utc(),
        })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> Month {
        self.month
    }

    /// First instant of the month, inclusive.
    pub fn start(&self) -> OffsetDateTime {
        self.start
    }

    /// First instant of the following month, exclusive.
    pub fn end(&self) -> OffsetDateTime {
        self.end
    }
}

impl fmt::Display for BillingPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}/{}", u8::from(self.month), self.year)
    }
}
