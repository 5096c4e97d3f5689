use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook};

use crate::{
    checklist::{ChecklistItem, module::ModuleSheet},
    prelude::*,
    report::{title_format, width_of},
};

const TITLE_COLOR: u32 = 0x28_A7_45;
const HEADERS: [&str; 5] = ["Sr.No.", "Check Points", "Acceptance Criteria", "Inspection Methods", "Field"];
const HEADER_ROW: u32 = 4;
const FIRST_SUBMISSION_COLUMN: u16 = 5;

/// A sheet per checklist collection: the checklist items next to the transposed submissions.
///
/// Sheet names must have been assigned beforehand, see [`crate::report::SheetNames`].
pub fn build_workbook(sheets: &[(String, ModuleSheet)], month_label: &str) -> Result<Workbook> {
    let mut workbook = Workbook::new();
    for (sheet_name, sheet) in sheets {
        add_sheet(&mut workbook, sheet_name, sheet, month_label)
            .with_context(|| format!("failed to write the sheet of `{}`", sheet.collection))?;
    }
    Ok(workbook)
}

fn add_sheet(workbook: &mut Workbook, sheet_name: &str, module: &ModuleSheet, month_label: &str) -> Result {
    let last_column = FIRST_SUBMISSION_COLUMN + u16::try_from(module.dates.len())?.max(1) - 1;
    let banner_format = title_format(20).set_background_color(Color::RGB(TITLE_COLOR)).set_font_color(Color::White);
    let subtitle_format = title_format(14).set_background_color(Color::RGB(TITLE_COLOR)).set_font_color(Color::White);
    let label_format = Format::new().set_bold().set_font_size(12).set_align(FormatAlign::Left);
    let key_format = Format::new()
        .set_border(FormatBorder::Medium)
        .set_text_wrap()
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter);
    let key_header_format = key_format.clone().set_bold().set_font_size(15);
    let cell_format = Format::new()
        .set_border(FormatBorder::Thin)
        .set_text_wrap()
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter);
    let date_header_format = cell_format.clone().set_bold().set_font_size(15);

    let sheet = workbook.add_worksheet();
    sheet.set_name(sheet_name)?;

    sheet.merge_range(0, 0, 0, last_column, "Daily Checksheet Report", &banner_format)?;
    sheet.merge_range(1, 0, 1, last_column, &format!("Report for {month_label}"), &subtitle_format)?;
    let (machine, number) = module.title_parts();
    sheet.merge_range(2, 0, 2, 1, machine, &label_format)?;
    if let Some(number) = number {
        sheet.merge_range(3, 0, 3, 1, number, &label_format)?;
    }

    sheet.set_row_height(HEADER_ROW, 40)?;
    for (column, header) in (0_u16..).zip(HEADERS) {
        sheet.write_string_with_format(HEADER_ROW, column, header, &key_header_format)?;
    }
    for (column, date) in (FIRST_SUBMISSION_COLUMN..).zip(&module.dates) {
        let header = date.map(|date| date.format("%Y-%m-%d").to_string()).unwrap_or_default();
        sheet.write_string_with_format(HEADER_ROW, column, header, &date_header_format)?;
    }

    for (row, index) in (HEADER_ROW + 1..).zip(0..module.n_rows()) {
        sheet.set_row_height(row, 30)?;
        if let Some(item) = module.items.get(index) {
            sheet.write_number_with_format(row, 0, u32::try_from(index + 1)?, &key_format)?;
            sheet.write_string_with_format(row, 1, &item.check_point, &key_format)?;
            let criteria = item.acceptance_criteria.as_deref().unwrap_or_default();
            sheet.write_string_with_format(row, 2, criteria, &key_format)?;
            sheet.write_string_with_format(row, 3, ChecklistItem::INSPECTION_METHOD, &key_format)?;
        } else {
            for column in 0..4 {
                sheet.write_blank(row, column, &key_format)?;
            }
        }
        match module.fields.get(index) {
            Some(field) => sheet.write_string_with_format(row, 4, field, &key_format)?,
            None => sheet.write_blank(row, 4, &key_format)?,
        };
        if let Some(values) = module.values.get(index) {
            for (column, value) in (FIRST_SUBMISSION_COLUMN..).zip(values) {
                sheet.write_string_with_format(row, column, value, &cell_format)?;
            }
        }
    }

    for (column, width) in [(0, 5.0), (1, 30.0), (2, 30.0), (3, 24.0), (4, 24.0)] {
        sheet.set_column_width(column, width)?;
    }
    for (offset, column) in (FIRST_SUBMISSION_COLUMN..).enumerate().take(module.dates.len()) {
        let longest = module
            .values
            .iter()
            .filter_map(|values| values.get(offset))
            .map(|value| width_of(value))
            .fold(10.0, f64::max);
        sheet.set_column_width(column, (longest + 20.0).min(50.0))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::db::Submission;

    #[test]
    fn build_workbook_ok() -> Result {
        let submissions = [Submission {
            date: NaiveDate::from_ymd_opt(2025, 3, 4),
            fields: vec![("opName".to_owned(), "Ravi".to_owned()), ("oilLevel".to_owned(), "OK".to_owned())],
        }];
        let module = ModuleSheet::build(
            "compressords",
            "Air Compressor|VT-01",
            vec![ChecklistItem::parse("Oil level -Between marks-")],
            &submissions,
        );
        let empty = ModuleSheet::build("pumpds", "pumpds", Vec::new(), &[]);
        let sheets = [("Air Compressor|VT-01".to_owned(), module), ("pumpds".to_owned(), empty)];
        let buffer = build_workbook(&sheets, "March 2025")?.save_to_buffer()?;
        assert!(!buffer.is_empty());
        Ok(())
    }
}
