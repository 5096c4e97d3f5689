mod attendance;
mod dashboard;
mod db;
mod modules;
mod report;
mod run;
mod schedule;
mod smtp;
mod window;

use clap::{Parser, Subcommand};

use crate::{
    cli::{
        attendance::AttendanceArgs,
        dashboard::DashboardArgs,
        modules::ModulesArgs,
        run::RunArgs,
        schedule::ScheduleArgs,
    },
    prelude::*,
};

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
#[must_use]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Main command: produce every report and email them.
    #[clap(name = "run")]
    Run(Box<RunArgs>),

    /// Perform `run` every day at the specified time.
    #[clap(name = "schedule")]
    Schedule(Box<ScheduleArgs>),

    /// Write the energy dashboard and the meter profiles.
    #[clap(name = "dashboard")]
    Dashboard(Box<DashboardArgs>),

    /// Write the checklist attendance grid.
    #[clap(name = "attendance")]
    Attendance(Box<AttendanceArgs>),

    /// Write the per-collection checklist sheets.
    #[clap(name = "modules")]
    Modules(Box<ModulesArgs>),
}

impl Command {
    pub async fn run(self) -> Result {
        match self {
            Self::Run(args) => args.run().await,
            Self::Schedule(args) => args.run().await,
            Self::Dashboard(args) => args.run().await,
            Self::Attendance(args) => args.run().await,
            Self::Modules(args) => args.run().await,
        }
    }
}
