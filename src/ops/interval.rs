use chrono::{Datelike, Months, NaiveDate, NaiveDateTime, NaiveTime};

use crate::{ops::RangeExclusive, prelude::*};

/// Wall-clock time window, as the meters stamp their readings.
pub type Interval = RangeExclusive<NaiveDateTime>;

impl Interval {
    /// Calendar month of the date: from its first day up to the first day of the next month.
    pub fn month_of(date: NaiveDate) -> Result<Self> {
        let first_day = date.with_day(1).context("the month has no first day")?;
        let next_month = first_day
            .checked_add_months(Months::new(1))
            .with_context(|| format!("`{first_day}` is too far in the future"))?;
        Ok(Self::new(first_day.and_time(NaiveTime::MIN), next_month.and_time(NaiveTime::MIN)))
    }

    /// Calendar days starting within the interval.
    pub fn days(self) -> impl Iterator<Item = NaiveDate> {
        let first_day = if self.start.time() == NaiveTime::MIN {
            self.start.date()
        } else {
            self.start.date().succ_opt().unwrap_or(NaiveDate::MAX)
        };
        first_day.iter_days().take_while(move |day| self.contains(day.and_time(NaiveTime::MIN)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_of_mid_month_date() -> Result {
        let interval = Interval::month_of(NaiveDate::from_ymd_opt(2025, 3, 18).unwrap())?;
        assert_eq!(interval.start, NaiveDate::from_ymd_opt(2025, 3, 1).unwrap().and_time(NaiveTime::MIN));
        assert_eq!(interval.end, NaiveDate::from_ymd_opt(2025, 4, 1).unwrap().and_time(NaiveTime::MIN));
        Ok(())
    }

    #[test]
    fn december_rolls_over_to_next_year() -> Result {
        let interval = Interval::month_of(NaiveDate::from_ymd_opt(2024, 12, 31).unwrap())?;
        assert_eq!(interval.end.date(), NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        Ok(())
    }

    #[test]
    fn days_of_month() -> Result {
        let february = Interval::month_of(NaiveDate::from_ymd_opt(2024, 2, 10).unwrap())?;
        assert_eq!(february.days().count(), 29);
        let april = Interval::month_of(NaiveDate::from_ymd_opt(2025, 4, 1).unwrap())?;
        assert_eq!(april.days().count(), 30);
        Ok(())
    }
}
