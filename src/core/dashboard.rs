use std::collections::HashMap;

use chrono::NaiveDateTime;

use crate::{
    core::{
        catalog::{Category, MeterCatalog},
        series::{Bucket, Deltas, MeterSeries, Resample},
    },
    ops::Interval,
    prelude::*,
};

#[must_use]
#[derive(Clone, Debug, PartialEq)]
pub struct DashboardRow {
    /// Meter name, or `Total <category>`.
    pub label: String,

    pub category: String,
    pub is_total: bool,

    /// Aligned with [`Dashboard::buckets`].
    pub values: Vec<f64>,
}

impl DashboardRow {
    #[must_use]
    pub fn sum(&self) -> f64 {
        self.values.iter().sum()
    }
}

/// Daily consumption of the catalogued meters with category totals.
#[must_use]
#[derive(Clone, Debug)]
pub struct Dashboard {
    pub buckets: Vec<NaiveDateTime>,
    pub rows: Vec<DashboardRow>,
}

impl Dashboard {
    /// Build the dashboard from the raw kWh counters.
    #[instrument(skip_all, fields(?window))]
    pub fn build(catalog: &MeterCatalog, counters: &MeterSeries, window: Interval) -> Result<Self> {
        let buckets = Bucket::Daily.starts(window)?;

        let mut consumption = HashMap::new();
        for meter in catalog.categories.iter().flat_map(|category| &category.meters) {
            let counter = counters.get(meter);
            if counter.is_empty() || consumption.contains_key(meter.as_str()) {
                continue;
            }
            let daily = counter
                .iter()
                .copied()
                .filtered_deltas(catalog.delta_filter(meter))
                .resample_sum(Bucket::Daily, window)?;
            consumption.insert(meter.as_str(), daily.into_iter().map(|(_, value)| value).collect());
        }
        debug!(n_meters = consumption.len(), "resampled");

        let rows = catalog
            .categories
            .iter()
            .flat_map(|category| aggregate_category(&consumption, category, buckets.len()))
            .collect();
        Ok(Self { buckets, rows })
    }

    pub fn totals(&self) -> impl Iterator<Item = &DashboardRow> {
        self.rows.iter().filter(|row| row.is_total)
    }
}

/// Rows of the category's meters that have data, followed by the category total.
///
/// The total sums every meter in the category except the excluded ones; a meter without data
/// contributes zero. A category without any data produces no rows at all.
pub fn aggregate_category(
    consumption: &HashMap<&str, Vec<f64>>,
    category: &Category,
    n_buckets: usize,
) -> Vec<DashboardRow> {
    let mut rows: Vec<DashboardRow> = category
        .meters
        .iter()
        .filter_map(|meter| {
            consumption.get(meter.as_str()).map(|values| DashboardRow {
                label: meter.clone(),
                category: category.name.clone(),
                is_total: false,
                values: values.clone(),
            })
        })
        .collect();
    if rows.is_empty() {
        return rows;
    }

    let mut total = vec![0.0; n_buckets];
    for values in category
        .meters
        .iter()
        .filter(|meter| category.is_counted(meter))
        .filter_map(|meter| consumption.get(meter.as_str()))
    {
        for (sum, value) in total.iter_mut().zip(values) {
            *sum += value;
        }
    }
    rows.push(DashboardRow {
        label: category.total_label(),
        category: category.name.clone(),
        is_total: true,
        values: total,
    });
    rows
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use approx::assert_abs_diff_eq;
    use chrono::NaiveDate;

    use super::*;
    use crate::db::Reading;

    fn category(meters: &[&str], excluded: &[&str]) -> Category {
        Category {
            name: "Utility".to_owned(),
            color: None,
            meters: meters.iter().map(ToString::to_string).collect(),
            exclude_from_total: excluded.iter().map(ToString::to_string).collect::<BTreeSet<_>>(),
        }
    }

    #[test]
    fn aggregate_category_ok() {
        let consumption =
            HashMap::from([("Main", vec![10.0, 20.0]), ("Sub", vec![4.0, 5.0]), ("Pump", vec![1.0, 1.0])]);
        let rows = aggregate_category(&consumption, &category(&["Main", "Sub", "Pump", "Silent"], &["Sub"]), 2);
        let labels: Vec<_> = rows.iter().map(|row| row.label.as_str()).collect();
        assert_eq!(labels, ["Main", "Sub", "Pump", "Total Utility"]);
        assert_eq!(rows[3].values, [11.0, 21.0]);
        assert!(rows[3].is_total);
    }

    #[test]
    fn excluded_meter_does_not_affect_total() {
        let category = category(&["Main", "Sub"], &["Sub"]);
        let small = HashMap::from([("Main", vec![1.0]), ("Sub", vec![2.0])]);
        let large = HashMap::from([("Main", vec![1.0]), ("Sub", vec![900.0])]);
        assert_eq!(
            aggregate_category(&small, &category, 1).last().unwrap().values,
            aggregate_category(&large, &category, 1).last().unwrap().values,
        );
    }

    #[test]
    fn category_without_data_is_omitted() {
        let consumption = HashMap::from([("Other", vec![1.0])]);
        assert!(aggregate_category(&consumption, &category(&["Main"], &[]), 1).is_empty());
    }

    #[test]
    fn build_ok() -> Result {
        let catalog = MeterCatalog::from_toml(
            r#"
            [[category]]
            name = "Transformer"
            meters = ["Capacitor", "Transformer No. 1"]
            exclude-from-total = ["Capacitor"]

            [[category]]
            name = "Water"
            meters = ["Tank"]

            [meter."Transformer No. 1"]
            unit-divisor = 1000.0
            "#,
        )?;
        let day = |day, hour| {
            NaiveDate::from_ymd_opt(2025, 3, day).unwrap().and_hms_opt(hour, 0, 0).unwrap()
        };
        let readings = [
            (day(1, 0), 100.0, 1_000.0),
            (day(1, 12), 110.0, 1_500.0),
            (day(2, 12), 90.0, 1_700.0),
            (day(2, 18), 95.0, 2_900.0),
        ]
        .map(|(timestamp, capacitor, transformer)| Reading {
            timestamp,
            values: vec![
                ("Capacitor".to_owned(), capacitor),
                ("Transformer No. 1".to_owned(), transformer),
            ],
        });
        let window = Interval::new(day(1, 0), day(3, 0));
        let dashboard = Dashboard::build(&catalog, &MeterSeries::from_readings(&readings), window)?;

        assert_eq!(dashboard.buckets, [day(1, 0), day(2, 0)]);
        let labels: Vec<_> = dashboard.rows.iter().map(|row| row.label.as_str()).collect();
        assert_eq!(labels, ["Capacitor", "Transformer No. 1", "Total Transformer"]);

        assert_eq!(dashboard.rows[0].values, [10.0, 5.0]);
        assert_abs_diff_eq!(dashboard.rows[1].values[0], 0.5);
        assert_abs_diff_eq!(dashboard.rows[1].values[1], 0.2);
        assert_abs_diff_eq!(dashboard.rows[2].sum(), 0.7);
        assert_eq!(dashboard.totals().count(), 1);
        Ok(())
    }
}
