//! Spreadsheet emitters.

pub mod attendance;
pub mod dashboard;
pub mod meters;
pub mod module;

use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use chrono::{Datelike, NaiveDate};
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook};

use crate::prelude::*;

#[derive(Copy, Clone, Debug, Eq, PartialEq, derive_more::Display)]
pub enum ReportKind {
    #[display("dashboard")]
    Dashboard,

    #[display("meter profiles")]
    MeterProfiles,

    #[display("attendance")]
    Attendance,

    #[display("modules")]
    Modules,
}

impl ReportKind {
    const fn file_prefix(self) -> &'static str {
        match self {
            Self::Dashboard => "dashboard",
            Self::MeterProfiles => "energy_meter_data",
            Self::Attendance => "PM_MAINTENANCE",
            Self::Modules => "PM_Module",
        }
    }

    /// `<prefix>_<day>_<month>_<year>.xlsx`, without zero padding.
    #[must_use]
    pub fn file_name(self, date: NaiveDate) -> String {
        format!("{}_{}_{}_{}.xlsx", self.file_prefix(), date.day(), date.month(), date.year())
    }

    #[must_use]
    pub fn path(self, output_dir: &Path, date: NaiveDate) -> PathBuf {
        output_dir.join(self.file_name(date))
    }
}

/// Unique, Excel-safe worksheet names.
#[derive(Default)]
pub struct SheetNames(HashSet<String>);

impl SheetNames {
    const MAX_LEN: usize = 31;

    /// Sanitize the name and suffix it with `_<n>` if it has already been taken.
    ///
    /// Excel compares sheet names case-insensitively.
    pub fn assign(&mut self, name: &str) -> String {
        let base = sanitize_sheet_name(name);
        let mut candidate = truncate(&base, Self::MAX_LEN);
        let mut n = 1;
        while self.0.contains(&candidate.to_lowercase()) {
            let suffix = format!("_{n}");
            candidate = truncate(&base, Self::MAX_LEN - suffix.len()) + &suffix;
            n += 1;
        }
        self.0.insert(candidate.to_lowercase());
        candidate
    }
}

fn sanitize_sheet_name(name: &str) -> String {
    const FORBIDDEN: [char; 7] = ['[', ']', ':', '*', '?', '/', '\\'];
    let name: String =
        name.chars().map(|char| if FORBIDDEN.contains(&char) { '_' } else { char }).collect();
    let name = name.trim().trim_matches('\'').trim();
    if name.is_empty() { "Sheet".to_owned() } else { name.to_owned() }
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect::<String>().trim_end().to_owned()
}

#[instrument(skip_all, fields(path = %path.display()))]
pub fn save(mut workbook: Workbook, path: &Path) -> Result {
    info!("saving…");
    workbook.save(path).with_context(|| format!("failed to save `{}`", path.display()))?;
    info!("saved");
    Ok(())
}

fn header_format(background: u32) -> Format {
    Format::new()
        .set_bold()
        .set_background_color(Color::RGB(background))
        .set_border(FormatBorder::Thin)
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
}

fn title_format(font_size: u16) -> Format {
    Format::new()
        .set_bold()
        .set_font_size(font_size)
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
}

/// Excel column widths are in characters.
#[expect(clippy::cast_precision_loss)]
fn width_of(text: &str) -> f64 {
    text.chars().count() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_ok() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 7).unwrap();
        assert_eq!(ReportKind::Attendance.file_name(date), "PM_MAINTENANCE_7_3_2025.xlsx");
        assert_eq!(ReportKind::Modules.file_name(date), "PM_Module_7_3_2025.xlsx");
        assert_eq!(ReportKind::Dashboard.file_name(date), "dashboard_7_3_2025.xlsx");
        assert_eq!(ReportKind::MeterProfiles.file_name(date), "energy_meter_data_7_3_2025.xlsx");
    }

    #[test]
    fn sheet_names_are_unique() {
        let mut names = SheetNames::default();
        assert_eq!(names.assign("Air Compressor"), "Air Compressor");
        assert_eq!(names.assign("air compressor"), "air compressor_1");
        assert_eq!(names.assign("Air Compressor"), "Air Compressor_2");
    }

    #[test]
    fn sheet_names_are_excel_safe() {
        let mut names = SheetNames::default();
        assert_eq!(names.assign("Panel Room-Mech & WH ELDB / Aux [1]"), "Panel Room-Mech & WH ELDB _ Aux");
        assert_eq!(names.assign("Technical Penthouse-L-1 Incomer main panel"), "Technical Penthouse-L-1 Incomer");
        assert_eq!(names.assign("Technical Penthouse-L-1 Incomer main"), "Technical Penthouse-L-1 Incom_1");
        assert_eq!(names.assign("''"), "Sheet");
    }
}
