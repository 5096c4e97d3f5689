use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Parser;

use crate::{cli::window::WindowArgs, db::Db, jobs::Jobs, prelude::*};

#[derive(Parser)]
pub struct ReportArgs {
    #[clap(flatten)]
    window: WindowArgs,

    /// Directory to write the workbooks into.
    #[clap(long, env = "OUTPUT_DIR", default_value = ".")]
    output_dir: PathBuf,
}

impl ReportArgs {
    pub fn jobs<'a>(&'a self, db: &'a Db, today: NaiveDate) -> Result<Jobs<'a>> {
        Ok(Jobs::builder()
            .db(db)
            .window(self.window.resolve(today)?)
            .output_dir(&self.output_dir)
            .today(today)
            .build())
    }
}
