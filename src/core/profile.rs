use std::collections::HashSet;

use chrono::{NaiveDate, NaiveDateTime};
use itertools::Itertools;

use crate::{
    core::{
        catalog::MeterCatalog,
        series::{Bucket, Deltas, MeterSeries, Resample, Series},
    },
    db::Metric,
    ops::Interval,
    prelude::*,
};

/// Half-hourly readings of all four metrics of a single meter.
#[must_use]
#[derive(Clone, Debug)]
pub struct MeterProfile {
    pub meter: String,
    pub buckets: Vec<NaiveDateTime>,

    /// One column per metric, in [`Metric::ALL`] order.
    pub columns: Vec<(Metric, Vec<f64>)>,
}

impl MeterProfile {
    #[must_use]
    pub fn column(&self, metric: Metric) -> Option<&[f64]> {
        self.columns.iter().find(|(it, _)| *it == metric).map(|(_, values)| values.as_slice())
    }

    /// Total consumption per calendar day.
    #[must_use]
    pub fn daily_kwh(&self) -> Vec<(NaiveDate, f64)> {
        let Some(kwh) = self.column(Metric::Kwh) else {
            return Vec::new();
        };
        self.buckets
            .iter()
            .zip(kwh)
            .chunk_by(|(bucket, _)| bucket.date())
            .into_iter()
            .map(|(date, chunk)| (date, chunk.map(|(_, value)| value).sum()))
            .collect()
    }
}

/// Build the profile of every meter that reported any metric in the window.
///
/// Meters are ordered by first appearance, scanning the metrics in [`Metric::ALL`] order.
/// Counters are filtered into consumption, other metrics are summed as read.
#[instrument(skip_all, fields(?window))]
pub fn build_profiles(
    catalog: &MeterCatalog,
    metrics: &[(Metric, MeterSeries)],
    window: Interval,
) -> Result<Vec<MeterProfile>> {
    let buckets = Bucket::HalfHourly.starts(window)?;
    let mut seen = HashSet::new();
    let meters: Vec<&str> = metrics
        .iter()
        .flat_map(|(_, series)| series.meters())
        .filter(|meter| seen.insert(*meter))
        .collect();
    info!(n_meters = meters.len(), n_buckets = buckets.len(), "building the profiles…");

    meters
        .into_iter()
        .map(|meter| -> Result<MeterProfile> {
            let columns = Metric::ALL
                .into_iter()
                .map(|metric| -> Result<(Metric, Vec<f64>)> {
                    let points = metrics
                        .iter()
                        .find(|(it, _)| *it == metric)
                        .map_or(&[][..], |(_, series)| series.get(meter));
                    let resampled: Series = if metric.is_cumulative() {
                        points
                            .iter()
                            .copied()
                            .filtered_deltas(catalog.delta_filter(meter))
                            .resample_sum(Bucket::HalfHourly, window)?
                    } else {
                        points.iter().copied().resample_sum(Bucket::HalfHourly, window)?
                    };
                    Ok((metric, resampled.into_iter().map(|(_, value)| value).collect()))
                })
                .collect::<Result<_>>()?;
            Ok(MeterProfile { meter: meter.to_owned(), buckets: buckets.clone(), columns })
        })
        .collect()
}
