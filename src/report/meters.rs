use rust_xlsxwriter::{Chart, ChartType, Format, FormatBorder, Workbook};

use crate::{
    core::profile::MeterProfile,
    db::Metric,
    prelude::*,
    report::{SheetNames, header_format, title_format, width_of},
};

const HEADER_COLOR: u32 = 0xDD_EB_F7;

/// Data table starts at the third row.
const FIRST_ROW: u32 = 2;

/// Daily totals go to column Q.
const DAILY_TOTALS_COLUMN: u16 = 16;

/// A sheet per meter: the half-hourly table, a consumption chart, and the daily totals.
pub fn build_workbook(profiles: &[MeterProfile]) -> Result<Workbook> {
    let mut workbook = Workbook::new();
    let mut sheet_names = SheetNames::default();
    for profile in profiles {
        let sheet_name = sheet_names.assign(&profile.meter);
        add_sheet(&mut workbook, &sheet_name, profile)
            .with_context(|| format!("failed to write the sheet of `{}`", profile.meter))?;
    }
    Ok(workbook)
}

fn add_sheet(workbook: &mut Workbook, sheet_name: &str, profile: &MeterProfile) -> Result {
    let title_format = title_format(14);
    let header_format = header_format(HEADER_COLOR);
    let cell_format = Format::new().set_border(FormatBorder::Thin);

    let sheet = workbook.add_worksheet();
    sheet.set_name(sheet_name)?;
    sheet.merge_range(0, 0, 0, 4, &profile.meter, &title_format)?;

    sheet.write_string_with_format(FIRST_ROW, 0, "Timestamp", &header_format)?;
    sheet.set_column_width(0, 22)?;
    for (column, (metric, _)) in (1_u16..).zip(&profile.columns) {
        sheet.write_string_with_format(FIRST_ROW, column, metric.label(), &header_format)?;
        sheet.set_column_width(column, width_of(metric.label()).max(10.0) + 2.0)?;
    }

    for (row, (index, bucket)) in (FIRST_ROW + 1..).zip(profile.buckets.iter().enumerate()) {
        sheet.write_string(row, 0, bucket.format("%Y-%m-%d %H:%M:%S").to_string())?;
        for (column, (_, values)) in (1_u16..).zip(&profile.columns) {
            let value = values.get(index).copied().filter(|value| value.is_finite()).unwrap_or(0.0);
            sheet.write_number_with_format(row, column, value, &cell_format)?;
        }
    }

    let Some(kwh_column) = (1_u16..)
        .zip(&profile.columns)
        .find_map(|(column, (metric, _))| (*metric == Metric::Kwh).then_some(column))
    else {
        return Ok(());
    };
    if profile.buckets.is_empty() {
        return Ok(());
    }
    let last_row = FIRST_ROW + u32::try_from(profile.buckets.len())?;

    let series_name = format!("{} - kWh Usage", profile.meter);
    let mut chart = Chart::new(ChartType::Column);
    chart
        .add_series()
        .set_name(series_name.as_str())
        .set_categories((sheet_name, FIRST_ROW + 1, 0, last_row, 0))
        .set_values((sheet_name, FIRST_ROW + 1, kwh_column, last_row, kwh_column));
    chart.title().set_name("30-Minute kWh Usage");
    chart.x_axis().set_name("Time");
    chart.y_axis().set_name("kWh");
    chart.set_width(600).set_height(500);
    let chart_column = u16::try_from(profile.columns.len())? + 2;
    sheet.insert_chart(FIRST_ROW + 1, chart_column, &chart)?;

    sheet.set_column_width(DAILY_TOTALS_COLUMN, 20)?;
    sheet.set_column_width(DAILY_TOTALS_COLUMN + 1, 20)?;
    sheet.write_string_with_format(FIRST_ROW, DAILY_TOTALS_COLUMN, "Daily Total Consumption", &title_format)?;
    sheet.write_string_with_format(FIRST_ROW + 1, DAILY_TOTALS_COLUMN, "Date", &header_format)?;
    sheet.write_string_with_format(FIRST_ROW + 1, DAILY_TOTALS_COLUMN + 1, "Total kWh", &header_format)?;
    for (row, (date, total)) in (FIRST_ROW + 2..).zip(profile.daily_kwh()) {
        sheet.write_string(row, DAILY_TOTALS_COLUMN, date.format("%Y-%m-%d").to_string())?;
        sheet.write_number(row, DAILY_TOTALS_COLUMN + 1, total)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn build_workbook_ok() -> Result {
        let at = |hour, minute| NaiveDate::from_ymd_opt(2025, 3, 1).unwrap().and_hms_opt(hour, minute, 0).unwrap();
        let profile = |meter: &str| MeterProfile {
            meter: meter.to_owned(),
            buckets: vec![at(0, 0), at(0, 30)],
            columns: Metric::ALL.into_iter().map(|metric| (metric, vec![1.0, f64::NAN])).collect(),
        };
        let profiles = [
            profile("Panel Room- LDB-Mech,Pump Room, security, WRC AHU"),
            profile("Panel Room- LDB-Mech,Pump Room, security"),
        ];
        let buffer = build_workbook(&profiles)?.save_to_buffer()?;
        assert!(!buffer.is_empty());
        Ok(())
    }
}
