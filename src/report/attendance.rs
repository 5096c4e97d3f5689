use rust_xlsxwriter::{
    Chart,
    ChartFormat,
    ChartSolidFill,
    ChartType,
    Color,
    Format,
    FormatAlign,
    FormatBorder,
    Workbook,
};

use crate::{
    checklist::attendance::AttendanceGrid,
    prelude::*,
    report::{header_format, title_format},
};

const SHEET_NAME: &str = "PM Maintenance";
const HEADER_COLOR: u32 = 0x00_64_00;
const BORDER_COLOR: u32 = 0x90_EE_90;
const HEADERS: [&str; 5] = ["Sl No.", "Machine / Station Name", "ID. NO.", "Category", "Frequency"];

/// Header row, below the two-row title.
const HEADER_ROW: u32 = 2;

const FIRST_DAY_COLUMN: u16 = 5;

/// The attendance grid with the assigned-versus-actual chart below it.
pub fn build_workbook(grid: &AttendanceGrid) -> Result<Workbook> {
    let n_columns = FIRST_DAY_COLUMN + u16::try_from(grid.days.len())?;
    let key_border = Format::new()
        .set_border_left(FormatBorder::Medium)
        .set_border_right(FormatBorder::Medium)
        .set_border_left_color(Color::RGB(BORDER_COLOR))
        .set_border_right_color(Color::RGB(BORDER_COLOR))
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter);
    let day_border = Format::new()
        .set_border_left(FormatBorder::Thin)
        .set_border_right(FormatBorder::Thin)
        .set_border_left_color(Color::RGB(BORDER_COLOR))
        .set_border_right_color(Color::RGB(BORDER_COLOR))
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter);
    let header_format = header_format(HEADER_COLOR).set_font_color(Color::White);

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    let title = match grid.days.first() {
        Some(first_day) => format!(
            "DAILY PREDICTIVE AND PREVENTIVE REPORT - {}",
            first_day.format("%B %Y").to_string().to_uppercase(),
        ),
        None => "DAILY PREDICTIVE AND PREVENTIVE REPORT".to_owned(),
    };
    sheet.merge_range(0, 0, 1, n_columns.max(FIRST_DAY_COLUMN + 1) - 1, &title, &title_format(16))?;
    sheet.set_row_height(0, 30)?;

    for (column, header) in (0_u16..).zip(HEADERS) {
        sheet.write_string_with_format(HEADER_ROW, column, header, &header_format)?;
    }
    for (column, day) in (FIRST_DAY_COLUMN..).zip(&grid.days) {
        sheet.write_string_with_format(HEADER_ROW, column, day.format("%d-%b-%Y").to_string(), &header_format)?;
        sheet.set_column_width(column, 12)?;
    }
    sheet.set_row_height(HEADER_ROW, 25)?;
    for (column, width) in [(0, 10), (1, 50), (2, 30), (3, 10), (4, 10)] {
        sheet.set_column_width(column, width)?;
    }

    let machine_format = key_border.clone().set_align(FormatAlign::Left);
    for (row, attendance) in (HEADER_ROW + 1..).zip(&grid.rows) {
        sheet.set_row_height(row, 20)?;
        sheet.write_number_with_format(row, 0, u32::try_from(attendance.serial_number)?, &key_border)?;
        sheet.write_string_with_format(row, 1, &attendance.machine, &machine_format)?;
        sheet.write_string_with_format(row, 2, &attendance.id_number, &key_border)?;
        sheet.write_string_with_format(row, 3, &attendance.category, &key_border)?;
        sheet.write_string_with_format(row, 4, &attendance.frequency, &key_border)?;
        for (column, present) in (FIRST_DAY_COLUMN..).zip(&attendance.present) {
            if *present {
                sheet.write_string_with_format(row, column, "P", &day_border)?;
            } else {
                sheet.write_blank(row, column, &day_border)?;
            }
        }
    }

    if grid.days.is_empty() {
        return Ok(workbook);
    }

    // Chart source: the assigned and actual counts under the grid.
    let assigned_row = HEADER_ROW + u32::try_from(grid.rows.len())? + 2;
    let actual_row = assigned_row + 1;
    sheet.write_string_with_format(assigned_row, 1, "Assigned", &header_format)?;
    sheet.write_string_with_format(actual_row, 1, "Actual", &header_format)?;
    for (column, count) in (FIRST_DAY_COLUMN..).zip(grid.daily_counts()) {
        sheet.write_number(assigned_row, column, u32::try_from(count.assigned)?)?;
        sheet.write_number(actual_row, column, u32::try_from(count.actual)?)?;
    }

    let last_column = n_columns - 1;
    let mut chart = Chart::new(ChartType::Column);
    chart
        .add_series()
        .set_name("Assigned")
        .set_categories((SHEET_NAME, HEADER_ROW, FIRST_DAY_COLUMN, HEADER_ROW, last_column))
        .set_values((SHEET_NAME, assigned_row, FIRST_DAY_COLUMN, assigned_row, last_column))
        .set_format(ChartFormat::new().set_solid_fill(ChartSolidFill::new().set_color(Color::Green)));
    chart
        .add_series()
        .set_name("Actual")
        .set_categories((SHEET_NAME, HEADER_ROW, FIRST_DAY_COLUMN, HEADER_ROW, last_column))
        .set_values((SHEET_NAME, actual_row, FIRST_DAY_COLUMN, actual_row, last_column))
        .set_format(ChartFormat::new().set_solid_fill(ChartSolidFill::new().set_color(Color::Gray)));
    chart.title().set_name("Daily Maintenance Report");
    chart.x_axis().set_name("Date");
    chart.y_axis().set_name("Count");
    chart.set_width(1400).set_height(300);
    sheet.insert_chart(actual_row + 2, 0, &chart)?;

    Ok(workbook)
}
