use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use clap::Parser;

use crate::{ops::Interval, prelude::*};

/// Report window, the current month unless specified.
#[derive(Parser)]
pub struct WindowArgs {
    /// Inclusive start: `YYYY-MM-DD` or `YYYY-MM-DD HH:MM:SS`.
    #[clap(long = "start", env = "REPORT_START", value_parser = parse_timestamp)]
    start: Option<NaiveDateTime>,

    /// Exclusive end: `YYYY-MM-DD` or `YYYY-MM-DD HH:MM:SS`.
    #[clap(long = "end", env = "REPORT_END", value_parser = parse_timestamp)]
    end: Option<NaiveDateTime>,
}

impl WindowArgs {
    pub fn resolve(&self, today: NaiveDate) -> Result<Interval> {
        let month = Interval::month_of(today)?;
        let window = Interval::new(self.start.unwrap_or(month.start), self.end.unwrap_or(month.end));
        if window.is_empty() {
            warn!(?window, "the window is empty, the reports will have no data");
        }
        Ok(window)
    }
}

fn parse_timestamp(value: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S").or_else(|_| {
        NaiveDate::parse_from_str(value, "%Y-%m-%d").map(|date| date.and_time(NaiveTime::MIN))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_timestamp_ok() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 7).unwrap();
        assert_eq!(parse_timestamp("2025-03-07"), Ok(date.and_time(NaiveTime::MIN)));
        assert_eq!(parse_timestamp("2025-03-07 13:12:00"), Ok(date.and_hms_opt(13, 12, 0).unwrap()));
        assert!(parse_timestamp("07.03.2025").is_err());
    }

    #[test]
    fn resolve_defaults_to_current_month() -> Result {
        let args = WindowArgs { start: None, end: None };
        let window = args.resolve(NaiveDate::from_ymd_opt(2025, 12, 18).unwrap())?;
        assert_eq!(window.start, NaiveDate::from_ymd_opt(2025, 12, 1).unwrap().and_time(NaiveTime::MIN));
        assert_eq!(window.end, NaiveDate::from_ymd_opt(2026, 1, 1).unwrap().and_time(NaiveTime::MIN));
        Ok(())
    }

    #[test]
    fn resolve_keeps_explicit_bounds() -> Result {
        let start = NaiveDate::from_ymd_opt(2025, 3, 2).unwrap().and_hms_opt(6, 0, 0).unwrap();
        let args = WindowArgs { start: Some(start), end: None };
        let window = args.resolve(NaiveDate::from_ymd_opt(2025, 3, 18).unwrap())?;
        assert_eq!(window.start, start);
        assert_eq!(window.end.date(), NaiveDate::from_ymd_opt(2025, 4, 1).unwrap());
        Ok(())
    }
}
