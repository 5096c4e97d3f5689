use chrono::NaiveDate;

use crate::{checklist::ChecklistItem, db::Submission};

const OPERATOR_FIELD: &str = "opName";

/// Submissions of one checklist collection, transposed: a row per field, a column per submission.
#[must_use]
#[derive(Clone, Debug)]
pub struct ModuleSheet {
    pub collection: String,

    /// Display name from the checksheet, or the collection name.
    pub title: String,

    pub items: Vec<ChecklistItem>,

    /// Column headers.
    pub dates: Vec<Option<NaiveDate>>,

    /// Row headers: the operator first, then the fields in order of their first appearance.
    pub fields: Vec<String>,

    /// `values[field][submission]`, empty when the submission misses the field.
    pub values: Vec<Vec<String>>,
}

impl ModuleSheet {
    pub fn build(
        collection: impl Into<String>,
        title: impl Into<String>,
        items: Vec<ChecklistItem>,
        submissions: &[Submission],
    ) -> Self {
        let mut fields: Vec<String> = Vec::new();
        if submissions.iter().any(|submission| submission.field(OPERATOR_FIELD).is_some()) {
            fields.push(OPERATOR_FIELD.to_owned());
        }
        for (name, _) in submissions.iter().flat_map(|submission| &submission.fields) {
            if !fields.contains(name) {
                fields.push(name.clone());
            }
        }
        let values = fields
            .iter()
            .map(|field| {
                submissions
                    .iter()
                    .map(|submission| submission.field(field).unwrap_or_default().to_owned())
                    .collect()
            })
            .collect();
        Self {
            collection: collection.into(),
            title: title.into(),
            items,
            dates: submissions.iter().map(|submission| submission.date).collect(),
            fields,
            values,
        }
    }

    /// Title parts: the machine name and the document number, when the title has one.
    #[must_use]
    pub fn title_parts(&self) -> (&str, Option<&str>) {
        let mut parts = self.title.split('|');
        let machine = parts.next().unwrap_or_default().trim();
        (machine, parts.next().map(str::trim))
    }

    /// Rows needed for both the fields and the checklist items.
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.fields.len().max(self.items.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission(day: u32, fields: &[(&str, &str)]) -> Submission {
        Submission {
            date: NaiveDate::from_ymd_opt(2025, 3, day),
            fields: fields.iter().map(|(key, value)| ((*key).to_owned(), (*value).to_owned())).collect(),
        }
    }

    #[test]
    fn build_ok() {
        let submissions = [
            submission(1, &[("oilLevel", "OK"), ("opName", "Ravi")]),
            submission(2, &[("noise", "None"), ("opName", "Asha"), ("oilLevel", "Low")]),
        ];
        let sheet = ModuleSheet::build(
            "compressords",
            "Air Compressor | VT-01",
            vec![ChecklistItem::parse("Oil level -OK-")],
            &submissions,
        );
        assert_eq!(sheet.fields, ["opName", "oilLevel", "noise"]);
        assert_eq!(sheet.values[0], ["Ravi", "Asha"]);
        assert_eq!(sheet.values[1], ["OK", "Low"]);
        assert_eq!(sheet.values[2], ["", "None"]);
        assert_eq!(sheet.dates, [NaiveDate::from_ymd_opt(2025, 3, 1), NaiveDate::from_ymd_opt(2025, 3, 2)]);
        assert_eq!(sheet.n_rows(), 3);
        assert_eq!(sheet.title_parts(), ("Air Compressor", Some("VT-01")));
    }

    #[test]
    fn without_operator() {
        let sheet = ModuleSheet::build("pumpds", "pumpds", Vec::new(), &[submission(3, &[("flow", "12")])]);
        assert_eq!(sheet.fields, ["flow"]);
        assert_eq!(sheet.title_parts(), ("pumpds", None));
    }
}
