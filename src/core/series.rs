mod deltas;
mod resample;

use std::collections::{HashMap, hash_map::Entry};

use chrono::NaiveDateTime;

pub use self::{
    deltas::{DeltaFilter, Deltas},
    resample::{Bucket, Resample},
};
use crate::db::Reading;

pub type Point<K = NaiveDateTime, V = f64> = (K, V);
pub type Series<K = NaiveDateTime, V = f64> = Vec<Point<K, V>>;

/// Time-ordered series of one metric for every meter seen in the readings.
#[must_use]
#[derive(Clone, Debug, Default)]
pub struct MeterSeries {
    /// In the order the meters first appear.
    series: Vec<(String, Series)>,

    index: HashMap<String, usize>,
}

impl MeterSeries {
    /// Collect the readings in one pass.
    ///
    /// Readings are sorted by timestamp, the sort is stable, so equal timestamps keep the fetch order.
    pub fn from_readings<'r>(readings: impl IntoIterator<Item = &'r Reading>) -> Self {
        let mut this = Self::default();
        for reading in readings {
            for (meter, value) in &reading.values {
                let position = match this.index.entry(meter.clone()) {
                    Entry::Occupied(entry) => *entry.get(),
                    Entry::Vacant(entry) => {
                        this.series.push((meter.clone(), Series::new()));
                        *entry.insert(this.series.len() - 1)
                    }
                };
                this.series[position].1.push((reading.timestamp, *value));
            }
        }
        for (_, series) in &mut this.series {
            series.sort_by_key(|(timestamp, _)| *timestamp);
        }
        this
    }

    /// Series of the meter, empty when the meter never reported.
    #[must_use]
    pub fn get(&self, meter: &str) -> &[Point] {
        self.index.get(meter).map_or(&[], |position| &self.series[*position].1)
    }

    pub fn meters(&self) -> impl Iterator<Item = &str> {
        self.series.iter().map(|(meter, _)| meter.as_str())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn at(minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 1).unwrap().and_hms_opt(0, minute, 0).unwrap()
    }

    fn reading(minute: u32, values: &[(&str, f64)]) -> Reading {
        Reading {
            timestamp: at(minute),
            values: values.iter().map(|(meter, value)| ((*meter).to_owned(), *value)).collect(),
        }
    }

    #[test]
    fn from_readings_ok() {
        let readings = [
            reading(10, &[("A", 3.0), ("B", 30.0)]),
            reading(0, &[("A", 1.0)]),
            reading(5, &[("B", 20.0), ("A", 2.0)]),
        ];
        let series = MeterSeries::from_readings(&readings);
        assert_eq!(series.meters().collect::<Vec<_>>(), ["A", "B"]);
        assert_eq!(series.get("A"), [(at(0), 1.0), (at(5), 2.0), (at(10), 3.0)]);
        assert_eq!(series.get("B"), [(at(5), 20.0), (at(10), 30.0)]);
    }

    #[test]
    fn absent_meter_is_empty() {
        let series = MeterSeries::from_readings(&[reading(0, &[("A", 1.0)])]);
        assert!(series.get("B").is_empty());
        assert_eq!(series.get("A").len(), 1);
        assert_eq!(series.meters().count(), 1);
    }
}
