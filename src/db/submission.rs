use bson::{Bson, Document};
use chrono::NaiveDate;
use itertools::Itertools;

/// Fields which are not a part of the checklist answers.
const SERVICE_FIELDS: [&str; 3] = ["_id", "__v", "submissionDate"];

/// Checklist submission with its answers rendered as text.
#[must_use]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Submission {
    pub date: Option<NaiveDate>,

    /// Field name to the displayed value, in the stored order.
    pub fields: Vec<(String, String)>,
}

impl From<&Document> for Submission {
    fn from(document: &Document) -> Self {
        Self {
            date: submission_date(document),
            fields: document
                .iter()
                .filter(|(key, _)| !SERVICE_FIELDS.contains(&key.as_str()))
                .map(|(key, value)| (key.clone(), display_value(value)))
                .collect(),
        }
    }
}

impl Submission {
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.iter().find(|(key, _)| key == name).map(|(_, value)| value.as_str())
    }
}

/// Submission date of a checklist document.
///
/// It is either a BSON date, or an extended-JSON wrapper `{"$date": "2025-03-01T…"}` from older
/// imports. Anything else is ignored.
#[must_use]
pub fn submission_date(document: &Document) -> Option<NaiveDate> {
    match document.get("submissionDate")? {
        Bson::DateTime(date) => Some(date.to_chrono().date_naive()),
        Bson::Document(wrapper) => wrapper
            .get_str("$date")
            .ok()
            .and_then(|date| date.get(..10))
            .and_then(|date| NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()),
        _ => None,
    }
}

#[must_use]
pub fn display_value(value: &Bson) -> String {
    match value {
        Bson::String(value) => value.clone(),
        Bson::Double(value) => value.to_string(),
        Bson::Int32(value) => value.to_string(),
        Bson::Int64(value) => value.to_string(),
        Bson::Boolean(value) => if *value { "Yes" } else { "No" }.to_owned(),
        Bson::Null | Bson::Undefined => String::new(),
        Bson::DateTime(value) => value.to_chrono().format("%Y-%m-%d %H:%M:%S").to_string(),
        Bson::ObjectId(value) => value.to_hex(),
        Bson::Array(values) => values.iter().map(display_value).join(", "),
        value => value.to_string(),
    }
}
