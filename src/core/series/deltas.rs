/// Turns counter increments into consumption, dropping resets and glitches.
#[must_use]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DeltaFilter {
    /// Exclusive upper bound of a plausible increment, in the meter's native unit.
    pub spike_threshold: f64,

    /// Applied after the filtering.
    pub unit_divisor: f64,
}

impl Default for DeltaFilter {
    fn default() -> Self {
        Self { spike_threshold: 1000.0, unit_divisor: 1.0 }
    }
}

impl DeltaFilter {
    /// Negative deltas are counter resets, deltas above the threshold are spikes: both become zero.
    #[must_use]
    pub fn apply(self, delta: f64) -> f64 {
        if (0.0..self.spike_threshold).contains(&delta) { delta / self.unit_divisor } else { 0.0 }
    }
}

impl<T> Deltas for T where T: ?Sized {}

pub trait Deltas {
    /// Differentiate a cumulative counter series.
    ///
    /// The first sample has no predecessor, so its delta is zero.
    fn filtered_deltas<K>(self, filter: DeltaFilter) -> impl Iterator<Item = (K, f64)>
    where
        Self: IntoIterator<Item = (K, f64)> + Sized,
    {
        let mut previous: Option<f64> = None;
        self.into_iter().map(move |(key, value)| {
            let delta = previous.map_or(0.0, |previous| value - previous);
            previous = Some(value);
            (key, filter.apply(delta))
        })
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use itertools::Itertools;

    use super::*;

    fn deltas(values: &[f64], filter: DeltaFilter) -> Vec<f64> {
        values.iter().copied().enumerate().filtered_deltas(filter).map(|(_, delta)| delta).collect()
    }

    #[test]
    fn counter_reset_is_zeroed() {
        assert_eq!(deltas(&[100.0, 105.0, 90.0, 95.0], DeltaFilter::default()), [0.0, 5.0, 0.0, 5.0]);
    }

    #[test]
    fn spike_is_zeroed_not_clamped() {
        assert_eq!(deltas(&[0.0, 2000.0], DeltaFilter::default()), [0.0, 0.0]);
        assert_eq!(deltas(&[0.0, 1000.0], DeltaFilter::default()), [0.0, 0.0]);
        assert_eq!(deltas(&[0.0, 999.5], DeltaFilter::default()), [0.0, 999.5]);
    }

    #[test]
    fn filter_then_scale() {
        let filter = DeltaFilter { unit_divisor: 1000.0, ..DeltaFilter::default() };
        assert_abs_diff_eq!(filter.apply(500.0), 0.5);

        // A scaled 1500 would pass as 1.5, but the spike check sees the native value.
        assert_abs_diff_eq!(filter.apply(1500.0), 0.0);
        for delta in deltas(&[0.0, 10.0, 990.0, 1989.0, 5000.0], filter) {
            assert!((0.0..1.0).contains(&delta), "{delta}");
        }
    }

    #[test]
    fn single_sample() {
        assert_eq!(deltas(&[42.0], DeltaFilter::default()), [0.0]);
        assert!(deltas(&[], DeltaFilter::default()).is_empty());
    }

    #[test]
    fn sum_of_monotonic_series() {
        let values = [10.0, 12.5, 12.5, 40.0, 41.25, 300.0];
        let sum: f64 = deltas(&values, DeltaFilter::default()).iter().sum();
        assert_abs_diff_eq!(sum, values.last().unwrap() - values.first().unwrap());
    }

    #[test]
    fn not_a_number_is_zeroed() {
        let deltas = deltas(&[1.0, f64::NAN, 3.0], DeltaFilter::default());
        assert!(deltas.iter().all(|delta| delta.is_finite()), "{}", deltas.iter().join(", "));
    }
}
