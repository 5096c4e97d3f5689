use std::path::PathBuf;

use chrono::Local;
use clap::Parser;

use crate::{
    checklist::Checksheet,
    cli::{db::DbArgs, report::ReportArgs},
    prelude::*,
};

#[derive(Parser)]
pub struct AttendanceArgs {
    #[clap(flatten)]
    db: DbArgs,

    #[clap(flatten)]
    report: ReportArgs,

    #[clap(long, env = "CHECKSHEET", default_value = "daily_checksheet.csv")]
    checksheet: PathBuf,
}

impl AttendanceArgs {
    pub async fn run(self) -> Result {
        let checksheet = Checksheet::load(&self.checksheet)?;
        let db = self.db.connect().await?;
        let today = Local::now().date_naive();
        let result = match self.report.jobs(&db, today) {
            Ok(jobs) => jobs.attendance(&checksheet).await,
            Err(error) => Err(error),
        };
        db.shutdown().await;
        info!(path = %result?.display(), "written");
        Ok(())
    }
}
