use std::{io, pin::Pin};

use chrono::{Local, NaiveDateTime, NaiveTime, TimeDelta};
use clap::Parser;
use tokio::{signal, time::sleep};

use crate::{cli::run::RunArgs, prelude::*};

#[derive(Parser)]
pub struct ScheduleArgs {
    /// Local time of day, `HH:MM`.
    #[clap(long = "at", env = "SCHEDULE_AT", value_parser = parse_time_of_day)]
    at: NaiveTime,

    #[clap(flatten)]
    run: RunArgs,
}

impl ScheduleArgs {
    /// Run every day until interrupted. Runs never overlap and are not retried.
    pub async fn run(self) -> Result {
        info!(at = %self.at, "scheduled");
        let interrupt = signal::ctrl_c();
        tokio::pin!(interrupt);
        loop {
            let now = Local::now().naive_local();
            let next = next_run(now, self.at);
            info!(%next, "sleeping…");
            if unless_interrupted(interrupt.as_mut(), sleep((next - now).to_std()?)).await?.is_none() {
                info!("interrupted");
                return Ok(());
            }
            match unless_interrupted(interrupt.as_mut(), self.run.run()).await? {
                Some(Ok(())) => {}
                Some(Err(error)) => error!(%next, "the run has failed: {error:#}"),
                None => {
                    warn!(%next, "interrupted during the run, the written reports may be left unsent");
                    return Ok(());
                }
            }
        }
    }
}

/// Drive the future to completion, or return `None` if the interrupt comes first.
async fn unless_interrupted<I, F>(interrupt: Pin<&mut I>, future: F) -> Result<Option<F::Output>>
where
    I: Future<Output = io::Result<()>>,
    F: Future,
{
    tokio::select! {
        result = interrupt => {
            result?;
            Ok(None)
        }
        output = future => Ok(Some(output)),
    }
}

/// The next occurrence of the time of day, strictly after now.
fn next_run(now: NaiveDateTime, at: NaiveTime) -> NaiveDateTime {
    let today = now.date().and_time(at);
    if today > now { today } else { today + TimeDelta::days(1) }
}

fn parse_time_of_day(value: &str) -> Result<NaiveTime, chrono::ParseError> {
    NaiveTime::parse_from_str(value, "%H:%M")
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn next_run_ok() -> Result {
        let at = parse_time_of_day("13:12")?;
        let date = NaiveDate::from_ymd_opt(2025, 3, 31).unwrap();

        let morning = date.and_hms_opt(9, 0, 0).unwrap();
        assert_eq!(next_run(morning, at), date.and_time(at));

        let exactly = date.and_time(at);
        assert_eq!(next_run(exactly, at), NaiveDate::from_ymd_opt(2025, 4, 1).unwrap().and_time(at));

        let evening = date.and_hms_opt(22, 0, 0).unwrap();
        assert_eq!(next_run(evening, at).date(), NaiveDate::from_ymd_opt(2025, 4, 1).unwrap());
        Ok(())
    }

    #[tokio::test]
    async fn interrupt_cancels_the_pending_run() -> Result {
        let interrupt = std::future::ready(Ok(()));
        tokio::pin!(interrupt);
        assert!(unless_interrupted(interrupt.as_mut(), std::future::pending::<Result>()).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn run_completes_without_interrupt() -> Result {
        let interrupt = std::future::pending::<io::Result<()>>();
        tokio::pin!(interrupt);
        let output = unless_interrupted(interrupt.as_mut(), async { 42 }).await?;
        assert_eq!(output, Some(42));
        Ok(())
    }

    #[tokio::test]
    async fn failed_interrupt_handler_is_an_error() {
        let interrupt = std::future::ready(Err(io::Error::other("no signal handler")));
        tokio::pin!(interrupt);
        assert!(unless_interrupted(interrupt.as_mut(), std::future::pending::<()>()).await.is_err());
    }

    #[test]
    fn parse_time_of_day_rejects_garbage() {
        assert!(parse_time_of_day("25:00").is_err());
        assert!(parse_time_of_day("noon").is_err());
    }
}
