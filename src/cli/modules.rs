use std::path::PathBuf;

use chrono::Local;
use clap::Parser;

use crate::{
    checklist::Checksheet,
    cli::{db::DbArgs, report::ReportArgs},
    prelude::*,
};

#[derive(Parser)]
pub struct ModulesArgs {
    #[clap(flatten)]
    db: DbArgs,

    #[clap(flatten)]
    report: ReportArgs,

    #[clap(long, env = "CHECKSHEET", default_value = "daily_checksheet.csv")]
    checksheet: PathBuf,
}

impl ModulesArgs {
    pub async fn run(self) -> Result {
        let checksheet = Checksheet::load(&self.checksheet)?;
        let db = self.db.connect().await?;
        let today = Local::now().date_naive();
        let result = match self.report.jobs(&db, today) {
            Ok(jobs) => jobs.modules(&checksheet).await,
            Err(error) => Err(error),
        };
        db.shutdown().await;
        if let Some(path) = result? {
            info!(path = %path.display(), "written");
        }
        Ok(())
    }
}
