use std::path::PathBuf;

use chrono::Local;
use clap::Parser;

use crate::{
    cli::{db::DbArgs, report::ReportArgs, smtp::SmtpArgs},
    prelude::*,
};

#[derive(Parser)]
pub struct RunArgs {
    #[clap(flatten)]
    db: DbArgs,

    #[clap(flatten)]
    report: ReportArgs,

    #[clap(flatten)]
    smtp: SmtpArgs,

    #[clap(long, env = "METER_CATALOG", default_value = "meters.toml")]
    meter_catalog: PathBuf,

    #[clap(long, env = "CHECKSHEET", default_value = "daily_checksheet.csv")]
    checksheet: PathBuf,
}

impl RunArgs {
    /// Produce the reports with a single store connection, then send whatever has been produced.
    #[instrument(skip_all)]
    pub async fn run(&self) -> Result {
        let mailer = self.smtp.mailer()?;
        let db = self.db.connect().await?;
        let today = Local::now().date_naive();
        let produced = match self.report.jobs(&db, today) {
            Ok(jobs) => Ok(jobs.run_all(&self.meter_catalog, &self.checksheet).await),
            Err(error) => Err(error),
        };
        db.shutdown().await;

        let produced = produced?;
        if produced.is_empty() {
            warn!("no reports have been produced, nothing to send");
            return Ok(());
        }
        mailer.deliver(today, &produced).await.inspect_err(|error| {
            error!(n_kept = produced.len(), "the reports are kept: {error:#}");
        })
    }
}
