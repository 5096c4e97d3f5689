use std::{
    collections::{BTreeMap, BTreeSet},
    path::Path,
};

use serde::Deserialize;

use crate::{core::series::DeltaFilter, prelude::*};

/// Meter categories and per-meter corrections of the energy reports.
#[must_use]
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct MeterCatalog {
    /// Deltas at or above the threshold are glitches and get zeroed.
    #[serde(default = "MeterCatalog::default_spike_threshold")]
    pub spike_threshold: f64,

    /// Categories in the report order.
    #[serde(default, rename = "category")]
    pub categories: Vec<Category>,

    #[serde(default, rename = "meter")]
    pub meters: BTreeMap<String, MeterSettings>,
}

#[must_use]
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Category {
    pub name: String,

    /// Row fill in the dashboard, `RRGGBB`.
    #[serde(default)]
    pub color: Option<String>,

    pub meters: Vec<String>,

    /// Sub-meters which are already counted by a parent meter.
    #[serde(default)]
    pub exclude_from_total: BTreeSet<String>,
}

impl Category {
    #[must_use]
    pub fn total_label(&self) -> String {
        format!("Total {}", self.name)
    }

    #[must_use]
    pub fn is_counted(&self, meter: &str) -> bool {
        !self.exclude_from_total.contains(meter)
    }

    #[must_use]
    pub fn rgb(&self) -> Option<u32> {
        self.color.as_deref().and_then(|color| u32::from_str_radix(color.trim_start_matches('#'), 16).ok())
    }
}

#[must_use]
#[derive(Copy, Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct MeterSettings {
    /// The meter reports in a smaller base unit, for example, watt-hours.
    pub unit_divisor: Option<f64>,

    pub spike_threshold: Option<f64>,
}

impl Default for MeterCatalog {
    fn default() -> Self {
        Self {
            spike_threshold: Self::default_spike_threshold(),
            categories: Vec::new(),
            meters: BTreeMap::new(),
        }
    }
}

impl MeterCatalog {
    const fn default_spike_threshold() -> f64 {
        1000.0
    }

    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("loading the meter catalog…");
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read `{}`", path.display()))?;
        let this = Self::from_toml(&text)
            .with_context(|| format!("failed to parse `{}`", path.display()))?;
        info!(n_categories = this.categories.len(), n_meters = this.meters.len(), "loaded");
        Ok(this)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let this: Self = toml::from_str(text)?;
        this.validate()?;
        Ok(this)
    }

    fn validate(&self) -> Result {
        ensure!(self.spike_threshold > 0.0, "spike threshold must be positive");
        for category in &self.categories {
            if category.color.is_some() {
                ensure!(category.rgb().is_some(), "`{}` has an invalid color", category.name);
            }
            for meter in &category.exclude_from_total {
                if !category.meters.contains(meter) {
                    warn!(category = %category.name, %meter, "excluded meter is not in the category");
                }
            }
        }
        for (meter, settings) in &self.meters {
            if let Some(divisor) = settings.unit_divisor {
                ensure!(divisor > 0.0, "`{meter}` has a non-positive unit divisor");
            }
            if let Some(threshold) = settings.spike_threshold {
                ensure!(threshold > 0.0, "`{meter}` has a non-positive spike threshold");
            }
        }
        Ok(())
    }

    /// Delta filter for the meter: the global threshold unless overridden, no scaling by default.
    pub fn delta_filter(&self, meter: &str) -> DeltaFilter {
        let settings = self.meters.get(meter).copied().unwrap_or_default();
        DeltaFilter {
            spike_threshold: settings.spike_threshold.unwrap_or(self.spike_threshold),
            unit_divisor: settings.unit_divisor.unwrap_or(1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn shipped_catalog_ok() -> Result {
        let catalog = MeterCatalog::from_toml(include_str!("../../meters.toml"))?;
        assert_abs_diff_eq!(catalog.spike_threshold, 1000.0);
        assert_eq!(catalog.categories.len(), 10);
        assert_eq!(catalog.categories[0].name, "Admin");
        assert_eq!(catalog.categories[9].name, "Water");

        let transformer = catalog.delta_filter("Transformer No. 1");
        assert_abs_diff_eq!(transformer.unit_divisor, 1000.0);
        assert_abs_diff_eq!(transformer.spike_threshold, 1000.0);

        let admin = catalog.delta_filter("Admin Main meter");
        assert_abs_diff_eq!(admin.unit_divisor, 1.0);

        let lightning =
            catalog.categories.iter().find(|category| category.name == "Total Lightning").unwrap();
        assert!(!lightning.is_counted("BMS Room ELDB"));
        assert!(lightning.is_counted("BMS Room-Aux DB - 2"));
        assert_eq!(lightning.rgb(), Some(0x00FC_F3CF));
        Ok(())
    }

    #[test]
    fn per_meter_spike_threshold_ok() -> Result {
        let catalog = MeterCatalog::from_toml(
            r#"
            spike-threshold = 500.0

            [meter."Chiller"]
            spike-threshold = 5000.0
            "#,
        )?;
        assert_abs_diff_eq!(catalog.delta_filter("Chiller").spike_threshold, 5000.0);
        assert_abs_diff_eq!(catalog.delta_filter("Pump").spike_threshold, 500.0);
        assert!(catalog.categories.is_empty());
        Ok(())
    }

    #[test]
    fn zero_divisor_is_rejected() {
        let result = MeterCatalog::from_toml(
            r#"
            [meter."Pump"]
            unit-divisor = 0.0
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn total_label() {
        let category = Category {
            name: "Water".to_owned(),
            color: None,
            meters: vec![],
            exclude_from_total: BTreeSet::new(),
        };
        assert_eq!(category.total_label(), "Total Water");
        assert_eq!(category.rgb(), None);
    }
}
