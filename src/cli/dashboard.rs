use std::path::PathBuf;

use chrono::Local;
use clap::Parser;

use crate::{
    cli::{db::DbArgs, report::ReportArgs},
    core::catalog::MeterCatalog,
    prelude::*,
};

#[derive(Parser)]
pub struct DashboardArgs {
    #[clap(flatten)]
    db: DbArgs,

    #[clap(flatten)]
    report: ReportArgs,

    #[clap(long, env = "METER_CATALOG", default_value = "meters.toml")]
    meter_catalog: PathBuf,
}

impl DashboardArgs {
    pub async fn run(self) -> Result {
        let catalog = MeterCatalog::load(&self.meter_catalog)?;
        let db = self.db.connect().await?;
        let today = Local::now().date_naive();
        let result = match self.report.jobs(&db, today) {
            Ok(jobs) => jobs.energy(&catalog).await,
            Err(error) => Err(error),
        };
        db.shutdown().await;
        for path in result? {
            info!(path = %path.display(), "written");
        }
        Ok(())
    }
}
