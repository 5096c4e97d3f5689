//! Report jobs: fetch, transform, and write a workbook.

use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use bon::Builder;
use chrono::NaiveDate;

use crate::{
    checklist::{Checksheet, attendance::AttendanceGrid, module::ModuleSheet},
    core::{catalog::MeterCatalog, dashboard::Dashboard, profile::build_profiles, series::MeterSeries},
    db::{Db, Metric},
    ops::Interval,
    prelude::*,
    report::{self, ReportKind, SheetNames},
    tables::{build_attendance_table, build_category_totals_table},
};

/// Everything the jobs of a single run share.
#[derive(Builder)]
pub struct Jobs<'a> {
    db: &'a Db,
    window: Interval,
    output_dir: &'a Path,

    /// Stamped into the file names.
    today: NaiveDate,
}

impl Jobs<'_> {
    /// Energy dashboard and the meter profile workbook.
    #[instrument(skip_all)]
    pub async fn energy(&self, catalog: &MeterCatalog) -> Result<Vec<PathBuf>> {
        let mut metrics = Vec::with_capacity(Metric::ALL.len());
        for metric in Metric::ALL {
            let readings = self.db.find_readings(metric, self.window).await?;
            metrics.push((metric, MeterSeries::from_readings(&readings)));
        }
        let Some((_, counters)) = metrics.iter().find(|(metric, _)| *metric == Metric::Kwh) else {
            bail!("kWh readings are missing");
        };

        let dashboard = Dashboard::build(catalog, counters, self.window)?;
        println!("{}", build_category_totals_table(&dashboard));
        let dashboard_path = ReportKind::Dashboard.path(self.output_dir, self.today);
        report::save(report::dashboard::build_workbook(&dashboard, catalog)?, &dashboard_path)?;

        let profiles = build_profiles(catalog, &metrics, self.window)?;
        let profiles_path = ReportKind::MeterProfiles.path(self.output_dir, self.today);
        report::save(report::meters::build_workbook(&profiles)?, &profiles_path)?;

        Ok(vec![dashboard_path, profiles_path])
    }

    /// Daily checklist attendance over the month in which the window starts.
    #[instrument(skip_all)]
    pub async fn attendance(&self, checksheet: &Checksheet) -> Result<PathBuf> {
        let month = Interval::month_of(self.window.start.date())?;
        let collections: HashSet<String> = self.db.checklist_collections().await?.into_iter().collect();

        let mut grid = AttendanceGrid::new(month);
        for page in checksheet.pages.iter().filter(|page| collections.contains(&page.page_name)) {
            let submission_dates = self.db.find_submission_dates(&page.page_name).await?;
            debug!(page_name = %page.page_name, n_submissions = submission_dates.len(), "processed");
            grid.push(page, &submission_dates);
        }
        info!(n_rows = grid.rows.len(), "built the attendance grid");
        println!("{}", build_attendance_table(&grid.daily_counts()));

        let path = ReportKind::Attendance.path(self.output_dir, self.today);
        report::save(report::attendance::build_workbook(&grid)?, &path)?;
        Ok(path)
    }

    /// A sheet per `…ds` checklist collection with submissions in the window.
    ///
    /// Returns `None` when no collection has any.
    #[instrument(skip_all)]
    pub async fn modules(&self, checksheet: &Checksheet) -> Result<Option<PathBuf>> {
        let mut collections: Vec<String> = self
            .db
            .checklist_collections()
            .await?
            .into_iter()
            .filter(|collection| collection.ends_with("ds"))
            .collect();
        collections.sort();

        let mut sheet_names = SheetNames::default();
        let mut sheets = Vec::new();
        for collection in collections {
            let page = checksheet.get(&collection);
            let title = page.and_then(|page| page.sheet_name.clone()).unwrap_or_else(|| collection.clone());
            let sheet_name = sheet_names.assign(&title);
            let submissions = self.db.find_submissions(&collection, self.window).await?;
            if submissions.is_empty() {
                info!(%collection, "skipping: no submissions");
                continue;
            }
            let items = page.map(|page| page.items.clone()).unwrap_or_default();
            info!(%collection, %sheet_name, n_submissions = submissions.len(), "exporting…");
            sheets.push((sheet_name, ModuleSheet::build(collection, title, items, &submissions)));
        }
        if sheets.is_empty() {
            warn!("no checklist submissions in the window");
            return Ok(None);
        }

        let month_label = self.window.start.format("%B %Y").to_string();
        let path = ReportKind::Modules.path(self.output_dir, self.today);
        report::save(report::module::build_workbook(&sheets, &month_label)?, &path)?;
        Ok(Some(path))
    }

    /// Attendance, modules, and energy, in this order.
    ///
    /// A failed job is logged and does not stop the others. Returns the produced workbooks.
    #[instrument(skip_all, fields(window = ?self.window))]
    pub async fn run_all(&self, catalog_path: &Path, checksheet_path: &Path) -> Vec<PathBuf> {
        let mut produced = Vec::new();

        match Checksheet::load(checksheet_path) {
            Ok(checksheet) => {
                match self.attendance(&checksheet).await {
                    Ok(path) => produced.push(path),
                    Err(error) => error!("attendance report failed: {error:#}"),
                }
                match self.modules(&checksheet).await {
                    Ok(path) => produced.extend(path),
                    Err(error) => error!("module report failed: {error:#}"),
                }
            }
            Err(error) => error!("checklist reports skipped: {error:#}"),
        }

        match MeterCatalog::load(catalog_path) {
            Ok(catalog) => match self.energy(&catalog).await {
                Ok(paths) => produced.extend(paths),
                Err(error) => error!("energy reports failed: {error:#}"),
            },
            Err(error) => error!("energy reports skipped: {error:#}"),
        }

        info!(n_produced = produced.len(), "finished");
        produced
    }
}
