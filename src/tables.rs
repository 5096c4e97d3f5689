use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};

use crate::{checklist::attendance::DailyCount, core::dashboard::Dashboard};

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .apply_modifier(modifiers::UTF8_ROUND_CORNERS)
        .enforce_styling();
    table
}

/// Window totals of every category.
pub fn build_category_totals_table(dashboard: &Dashboard) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Category", "Meters", "Total"]);
    for total in dashboard.totals() {
        let n_meters =
            dashboard.rows.iter().filter(|row| !row.is_total && row.category == total.category).count();
        let sum = total.sum();
        table.add_row(vec![
            Cell::new(&total.category),
            Cell::new(n_meters).set_alignment(CellAlignment::Right).add_attribute(Attribute::Dim),
            Cell::new(format!("{sum:.2}"))
                .set_alignment(CellAlignment::Right)
                .fg(if sum > 0.0 { Color::Reset } else { Color::DarkYellow }),
        ]);
    }
    table
}

/// Daily assigned against actual checklists.
pub fn build_attendance_table(counts: &[DailyCount]) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Date", "Assigned", "Actual"]);
    for count in counts {
        table.add_row(vec![
            Cell::new(count.date.format("%b %d")).add_attribute(Attribute::Dim),
            Cell::new(count.assigned).set_alignment(CellAlignment::Right),
            Cell::new(count.actual).set_alignment(CellAlignment::Right).fg(
                if count.actual >= count.assigned {
                    Color::Green
                } else if count.actual == 0 {
                    Color::Red
                } else {
                    Color::DarkYellow
                },
            ),
        ]);
    }
    table
}
