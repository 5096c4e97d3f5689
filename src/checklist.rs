//! Checklist roster, attendance grid and per-collection module sheets.

pub mod attendance;
pub mod module;

use std::{io, path::Path};

use csv::StringRecord;

use crate::prelude::*;

const PAGE_NAME: &str = "page name";
const HEADING: &str = "extracted <h1> text";

/// The checksheet CSV: one row per checklist page.
///
/// The display sheet name and the pipe-delimited checklist items are the two columns right after
/// `page name`, whatever their headers are.
#[must_use]
#[derive(Clone, Debug, Default)]
pub struct Checksheet {
    pub pages: Vec<ChecklistPage>,
}

#[must_use]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChecklistPage {
    /// Checklist collection name.
    pub page_name: String,

    pub sheet_name: Option<String>,
    pub items: Vec<ChecklistItem>,

    /// `machine name|id number`.
    pub heading: Option<String>,
}

impl ChecklistPage {
    /// Split the heading into the machine name and ID number.
    #[must_use]
    pub fn machine_and_id(&self) -> (String, String) {
        let heading = self.heading.as_deref().unwrap_or("N/A|N/A");
        match heading.split_once('|') {
            Some((machine, id)) => (machine.trim().to_owned(), id.trim().to_owned()),
            None => (heading.trim().to_owned(), "N/A".to_owned()),
        }
    }
}

impl Checksheet {
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("loading the checksheet…");
        let file = std::fs::File::open(path)
            .with_context(|| format!("failed to open `{}`", path.display()))?;
        let this = Self::from_reader(file)?;
        info!(n_pages = this.pages.len(), "loaded");
        Ok(this)
    }

    pub fn from_reader(reader: impl io::Read) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
        let headers = reader.headers().context("failed to read the checksheet headers")?.clone();
        let page_name_index = headers
            .iter()
            .position(|header| header.trim() == PAGE_NAME)
            .with_context(|| format!("the checksheet has no `{PAGE_NAME}` column"))?;
        let heading_index = headers.iter().position(|header| header.trim() == HEADING);

        let mut pages = Vec::new();
        for (line, record) in reader.records().enumerate() {
            let record = record.with_context(|| format!("failed to read checksheet record #{line}"))?;
            let Some(page_name) = non_empty(&record, Some(page_name_index)) else {
                debug!(line, "skipping a row without a page name");
                continue;
            };
            pages.push(ChecklistPage {
                page_name,
                sheet_name: non_empty(&record, Some(page_name_index + 1)),
                items: non_empty(&record, Some(page_name_index + 2))
                    .map(|items| items.split('|').map(ChecklistItem::parse).collect())
                    .unwrap_or_default(),
                heading: non_empty(&record, heading_index),
            });
        }
        Ok(Self { pages })
    }

    /// First page with the name.
    #[must_use]
    pub fn get(&self, page_name: &str) -> Option<&ChecklistPage> {
        self.pages.iter().find(|page| page.page_name == page_name)
    }
}

fn non_empty(record: &StringRecord, index: Option<usize>) -> Option<String> {
    let value = record.get(index?)?.trim();
    (!value.is_empty()).then(|| value.to_owned())
}

/// Checklist item, formatted as `check point -acceptance criteria-`.
#[must_use]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChecklistItem {
    /// The item with every `-…-` segment removed.
    pub check_point: String,

    /// The first `-…-` segment.
    pub acceptance_criteria: Option<String>,
}

impl ChecklistItem {
    pub const INSPECTION_METHOD: &'static str = "Visual Inspection & Record";

    pub fn parse(item: &str) -> Self {
        let mut check_point = String::with_capacity(item.len());
        let mut acceptance_criteria = None;
        let mut rest = item;
        while let Some((before, after)) = rest.split_once('-') {
            let Some((segment, tail)) = after.split_once('-') else {
                break;
            };
            check_point.push_str(before);
            acceptance_criteria.get_or_insert_with(|| segment.trim().to_owned());
            rest = tail;
        }
        check_point.push_str(rest);
        Self { check_point: check_point.trim().to_owned(), acceptance_criteria }
    }
}
