use chrono::{DurationRound, NaiveDateTime, TimeDelta};

use crate::{
    core::series::{Point, Series},
    ops::Interval,
    prelude::*,
};

/// Calendar-aligned bucket width.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Bucket {
    Daily,
    HalfHourly,
}

impl Bucket {
    #[must_use]
    pub fn time_delta(self) -> TimeDelta {
        match self {
            Self::Daily => TimeDelta::days(1),
            Self::HalfHourly => TimeDelta::minutes(30),
        }
    }

    /// Start of the bucket containing the timestamp.
    pub fn floor(self, timestamp: NaiveDateTime) -> Result<NaiveDateTime> {
        timestamp
            .duration_trunc(self.time_delta())
            .with_context(|| format!("failed to truncate `{timestamp}`"))
    }

    /// Starts of the buckets covering the window.
    pub fn starts(self, window: Interval) -> Result<Vec<NaiveDateTime>> {
        let time_delta = self.time_delta();
        let mut starts = Vec::new();
        let mut start = self.floor(window.start)?;
        while start < window.end {
            starts.push(start);
            start += time_delta;
        }
        Ok(starts)
    }
}

impl<T> Resample for T where T: ?Sized {}

pub trait Resample {
    /// Sum the values into buckets covering the entire window, empty buckets are zeros.
    ///
    /// Points outside the window are ignored.
    fn resample_sum(self, bucket: Bucket, window: Interval) -> Result<Series>
    where
        Self: IntoIterator<Item = Point> + Sized,
    {
        let mut resampled: Series = bucket.starts(window)?.into_iter().map(|key| (key, 0.0)).collect();
        let Some(&(first_key, _)) = resampled.first() else {
            return Ok(resampled);
        };
        let time_delta = bucket.time_delta();

        for (timestamp, value) in self {
            if !window.contains(timestamp) {
                continue;
            }
            let offset = (bucket.floor(timestamp)? - first_key).num_seconds() / time_delta.num_seconds();
            if let Some((_, sum)) = usize::try_from(offset).ok().and_then(|it| resampled.get_mut(it)) {
                *sum += value;
            }
        }
        Ok(resampled)
    }
}
