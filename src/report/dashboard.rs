use std::collections::HashMap;

use rust_xlsxwriter::{Color, Format, FormatBorder, Workbook};

use crate::{
    core::{catalog::MeterCatalog, dashboard::Dashboard},
    prelude::*,
    report::header_format,
};

const SHEET_NAME: &str = "Dashboard";
const HEADER_COLOR: u32 = 0x4F_81_BD;

/// One row per meter and category total, one column per day.
pub fn build_workbook(dashboard: &Dashboard, catalog: &MeterCatalog) -> Result<Workbook> {
    let colors: HashMap<&str, u32> = catalog
        .categories
        .iter()
        .filter_map(|category| category.rgb().map(|rgb| (category.name.as_str(), rgb)))
        .collect();
    let header_format = header_format(HEADER_COLOR).set_font_color(Color::White);

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;
    sheet.set_freeze_panes(1, 1)?;
    sheet.set_column_width(0, 45)?;

    sheet.write_string_with_format(0, 0, "Meter Name", &header_format)?;
    for (column, bucket) in (1_u16..).zip(&dashboard.buckets) {
        sheet.write_string_with_format(0, column, bucket.format("%Y-%m-%d").to_string(), &header_format)?;
        sheet.set_column_width(column, 12)?;
    }

    for (row, dashboard_row) in (1_u32..).zip(&dashboard.rows) {
        let mut format = Format::new().set_border(FormatBorder::Thin);
        if let Some(rgb) = colors.get(dashboard_row.category.as_str()) {
            format = format.set_background_color(Color::RGB(*rgb));
        }
        if dashboard_row.is_total {
            format = format.set_bold();
        }
        sheet.write_string_with_format(row, 0, &dashboard_row.label, &format)?;
        let number_format = format.clone().set_num_format("0.00");
        for (column, value) in (1_u16..).zip(&dashboard_row.values) {
            sheet.write_number_with_format(row, column, *value, &number_format)?;
        }
    }
    Ok(workbook)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::core::dashboard::DashboardRow;

    #[test]
    fn build_workbook_ok() -> Result {
        let catalog = MeterCatalog::from_toml(
            r#"
            [[category]]
            name = "Water"
            color = "F1948A"
            meters = ["Tank"]
            "#,
        )?;
        let dashboard = Dashboard {
            buckets: vec![NaiveDate::from_ymd_opt(2025, 3, 1).unwrap().and_hms_opt(0, 0, 0).unwrap()],
            rows: vec![
                DashboardRow { label: "Tank".to_owned(), category: "Water".to_owned(), is_total: false, values: vec![1.5] },
                DashboardRow { label: "Total Water".to_owned(), category: "Water".to_owned(), is_total: true, values: vec![1.5] },
            ],
        };
        let buffer = build_workbook(&dashboard, &catalog)?.save_to_buffer()?;
        assert!(!buffer.is_empty());
        Ok(())
    }
}
