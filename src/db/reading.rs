use std::collections::{HashMap, hash_map::Entry};

use bson::{Bson, Document};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

use crate::prelude::*;

/// Metric collection in the meter database.
///
/// Every collection holds one document per polling timestamp with all devices' readings in
/// parallel `device_names` and `<metric>_values` arrays.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, derive_more::Display)]
pub enum Metric {
    #[display("kwh")]
    Kwh,

    #[display("pf")]
    Pf,

    #[display("va")]
    Va,

    #[display("current")]
    Current,
}

impl Metric {
    /// Fetch order of the meter profile report.
    pub const ALL: [Self; 4] = [Self::Kwh, Self::Pf, Self::Va, Self::Current];

    pub const fn collection_name(self) -> &'static str {
        match self {
            Self::Kwh => "kwh",
            Self::Pf => "pf",
            Self::Va => "va",
            Self::Current => "current",
        }
    }

    pub const fn values_field(self) -> &'static str {
        match self {
            Self::Kwh => "kwh_values",
            Self::Pf => "pf_values",
            Self::Va => "va_values",
            Self::Current => "current_values",
        }
    }

    /// Column header in the reports.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Kwh => "KWH",
            Self::Pf => "PF",
            Self::Va => "VA",
            Self::Current => "KW/FLOW RATE",
        }
    }

    /// Cumulative counters get differentiated, the rest are reported as read.
    pub const fn is_cumulative(self) -> bool {
        matches!(self, Self::Kwh)
    }
}

#[derive(Debug, Eq, PartialEq, thiserror::Error)]
pub enum MalformedReading {
    #[error("missing or unparseable `timestamp`")]
    Timestamp,

    #[error("missing `{0}` array")]
    MissingArray(&'static str),

    #[error("{names} device names against {values} values")]
    LengthMismatch { names: usize, values: usize },

    #[error("device name #{0} is not a string")]
    DeviceName(usize),
}

/// One polling timestamp with the readings of every device that reported.
#[must_use]
#[derive(Clone, Debug, PartialEq)]
pub struct Reading {
    pub timestamp: NaiveDateTime,

    /// Meter name to value, in the order the devices appear in the document.
    pub values: Vec<(String, f64)>,
}

impl Reading {
    /// Validate the raw parallel arrays once, so nothing downstream relies on positional alignment.
    pub fn try_from_document(document: &Document, metric: Metric) -> Result<Self, MalformedReading> {
        let timestamp =
            document.get("timestamp").and_then(parse_timestamp).ok_or(MalformedReading::Timestamp)?;
        let Some(Bson::Array(names)) = document.get("device_names") else {
            return Err(MalformedReading::MissingArray("device_names"));
        };
        let Some(Bson::Array(raw_values)) = document.get(metric.values_field()) else {
            return Err(MalformedReading::MissingArray(metric.values_field()));
        };
        if names.len() != raw_values.len() {
            return Err(MalformedReading::LengthMismatch {
                names: names.len(),
                values: raw_values.len(),
            });
        }

        let mut values = Vec::with_capacity(names.len());
        let mut positions = HashMap::with_capacity(names.len());
        for (index, (name, value)) in names.iter().zip(raw_values).enumerate() {
            let Bson::String(name) = name else {
                return Err(MalformedReading::DeviceName(index));
            };
            let Some(value) = as_f64(value) else {
                debug!(%timestamp, %name, ?value, "skipping a non-numeric value");
                continue;
            };
            match positions.entry(name.as_str()) {
                Entry::Occupied(entry) => {
                    let (_, existing): &mut (String, f64) = &mut values[*entry.get()];
                    *existing = value;
                }
                Entry::Vacant(entry) => {
                    entry.insert(values.len());
                    values.push((name.clone(), value));
                }
            }
        }
        Ok(Self { timestamp, values })
    }
}

/// Parse the stored documents, skipping the malformed ones.
pub fn parse_readings<'d>(
    documents: impl IntoIterator<Item = &'d Document>,
    metric: Metric,
) -> Vec<Reading> {
    documents
        .into_iter()
        .filter_map(|document| match Reading::try_from_document(document, metric) {
            Ok(reading) => Some(reading),
            Err(error) => {
                warn!(%metric, id = ?document.get("_id"), "skipping a malformed document: {error}");
                None
            }
        })
        .collect()
}

/// Timestamps are stored either as BSON dates or as wall-clock strings.
#[must_use]
pub fn parse_timestamp(value: &Bson) -> Option<NaiveDateTime> {
    match value {
        Bson::DateTime(timestamp) => Some(timestamp.to_chrono().naive_utc()),
        Bson::String(timestamp) => parse_timestamp_str(timestamp.trim()),
        _ => None,
    }
}

fn parse_timestamp_str(timestamp: &str) -> Option<NaiveDateTime> {
    const FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

    FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(timestamp, format).ok())
        .or_else(|| DateTime::parse_from_rfc3339(timestamp).ok().map(|it| it.naive_utc()))
        .or_else(|| {
            NaiveDate::parse_from_str(timestamp, "%Y-%m-%d")
                .ok()
                .map(|date| date.and_time(NaiveTime::MIN))
        })
}

#[expect(clippy::cast_precision_loss)]
const fn as_f64(value: &Bson) -> Option<f64> {
    match value {
        Bson::Double(value) => Some(*value),
        Bson::Int32(value) => Some(*value as f64),
        Bson::Int64(value) => Some(*value as f64),
        _ => None,
    }
}
