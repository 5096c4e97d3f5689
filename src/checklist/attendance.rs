use std::collections::HashSet;

use bon::Builder;
use chrono::NaiveDate;

use crate::{checklist::ChecklistPage, ops::Interval};

/// Row of the attendance grid: one checklist page.
#[must_use]
#[derive(Clone, Debug, Builder)]
pub struct AttendanceRow {
    pub serial_number: usize,

    #[builder(into)]
    pub machine: String,

    #[builder(into)]
    pub id_number: String,

    #[builder(into, default = String::from("C"))]
    pub category: String,

    #[builder(into, default = String::from("Daily"))]
    pub frequency: String,

    /// One flag per day of the grid.
    pub present: Vec<bool>,
}

#[must_use]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub assigned: usize,
    pub actual: usize,
}

/// Which checklist was submitted on which day of the month.
#[must_use]
#[derive(Clone, Debug)]
pub struct AttendanceGrid {
    pub days: Vec<NaiveDate>,
    pub rows: Vec<AttendanceRow>,
}

impl AttendanceGrid {
    pub fn new(month: Interval) -> Self {
        Self { days: month.days().collect(), rows: Vec::new() }
    }

    /// Append the page, marking the days with at least one submission.
    ///
    /// Submissions outside the grid's days are ignored.
    pub fn push(&mut self, page: &ChecklistPage, submission_dates: &[NaiveDate]) {
        let submitted: HashSet<NaiveDate> = submission_dates.iter().copied().collect();
        let (machine, id_number) = page.machine_and_id();
        self.rows.push(
            AttendanceRow::builder()
                .serial_number(self.rows.len() + 1)
                .machine(machine)
                .id_number(id_number)
                .present(self.days.iter().map(|day| submitted.contains(day)).collect())
                .build(),
        );
    }

    /// Assigned checklists (the roster size) against the submitted ones, per day.
    pub fn daily_counts(&self) -> Vec<DailyCount> {
        self.days
            .iter()
            .enumerate()
            .map(|(index, date)| DailyCount {
                date: *date,
                assigned: self.rows.len(),
                actual: self.rows.iter().filter(|row| row.present[index]).count(),
            })
            .collect()
    }
}
