use std::path::PathBuf;

use chrono::NaiveDate;
use lettre::{
    AsyncSmtpTransport,
    AsyncTransport,
    Message,
    Tokio1Executor,
    message::{Attachment, Mailbox, MultiPart, SinglePart, header::ContentType},
    transport::smtp::authentication::Credentials,
};

use crate::prelude::*;

const XLSX_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Sends the produced workbooks to the fixed recipient.
pub struct Mailer<T = AsyncSmtpTransport<Tokio1Executor>> {
    transport: T,
    from: Mailbox,
    to: Mailbox,
}

impl Mailer {
    pub fn new(host: &str, port: u16, credentials: Credentials, from: &str, to: &str) -> Result<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
            .with_context(|| format!("failed to create the SMTP relay `{host}`"))?
            .port(port)
            .credentials(credentials)
            .build();
        Self::with_transport(transport, from, to)
    }
}

impl<T> Mailer<T>
where
    T: AsyncTransport + Sync,
    T::Error: std::error::Error + Send + Sync + 'static,
{
    pub fn with_transport(transport: T, from: &str, to: &str) -> Result<Self> {
        Ok(Self {
            transport,
            from: from.parse().with_context(|| format!("invalid sender address `{from}`"))?,
            to: to.parse().with_context(|| format!("invalid recipient address `{to}`"))?,
        })
    }

    /// Send the reports in a single email and delete the files.
    ///
    /// The files are kept when sending fails, so that they can be delivered by hand.
    #[instrument(skip_all, fields(%date, n_attachments = paths.len()))]
    pub async fn deliver(&self, date: NaiveDate, paths: &[PathBuf]) -> Result {
        let mut attachments = Vec::with_capacity(paths.len());
        for path in paths {
            let file_name = path
                .file_name()
                .with_context(|| format!("`{}` has no file name", path.display()))?
                .to_string_lossy()
                .into_owned();
            let body = tokio::fs::read(path)
                .await
                .with_context(|| format!("failed to read `{}`", path.display()))?;
            attachments.push((file_name, body));
        }

        let message = compose(self.from.clone(), self.to.clone(), date, attachments)?;
        info!("sending…");
        self.transport.send(message).await.context("failed to send the reports")?;
        info!("sent");

        for path in paths {
            if let Err(error) = tokio::fs::remove_file(path).await {
                warn!(path = %path.display(), "failed to delete the sent report: {error:#}");
            }
        }
        info!("deleted the sent reports");
        Ok(())
    }
}

fn compose(
    from: Mailbox,
    to: Mailbox,
    date: NaiveDate,
    attachments: Vec<(String, Vec<u8>)>,
) -> Result<Message> {
    let date = date.format("%Y-%m-%d");
    let content_type = ContentType::parse(XLSX_CONTENT_TYPE)?;
    let body = format!("Please find attached energy meter reports and pm reports for {date}.");
    let multipart = attachments.into_iter().fold(
        MultiPart::mixed().singlepart(SinglePart::plain(body)),
        |multipart, (file_name, content)| {
            multipart.singlepart(Attachment::new(file_name).body(content, content_type.clone()))
        },
    );
    Message::builder()
        .from(from)
        .to(to)
        .subject(format!("Energy Meter & Maintenance Reports - {date}"))
        .multipart(multipart)
        .context("failed to build the email")
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use lettre::transport::stub::AsyncStubTransport;

    use super::*;

    const FROM: &str = "reports@example.com";
    const TO: &str = "plant@example.com";

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 7).unwrap()
    }

    fn write_reports(output_dir: &Path) -> Result<Vec<PathBuf>> {
        ["dashboard_7_3_2025.xlsx", "PM_MAINTENANCE_7_3_2025.xlsx"]
            .into_iter()
            .map(|file_name| -> Result<PathBuf> {
                let path = output_dir.join(file_name);
                std::fs::write(&path, [0x50, 0x4B, 0x03, 0x04])?;
                Ok(path)
            })
            .collect()
    }

    #[tokio::test]
    async fn sent_reports_are_deleted() -> Result {
        let output_dir = tempfile::tempdir()?;
        let paths = write_reports(output_dir.path())?;
        let mailer = Mailer::with_transport(AsyncStubTransport::new_ok(), FROM, TO)?;
        mailer.deliver(date(), &paths).await?;
        assert!(paths.iter().all(|path| !path.exists()));
        Ok(())
    }

    #[tokio::test]
    async fn reports_are_kept_when_sending_fails() -> Result {
        let output_dir = tempfile::tempdir()?;
        let paths = write_reports(output_dir.path())?;
        let mailer = Mailer::with_transport(AsyncStubTransport::new_error(), FROM, TO)?;
        assert!(mailer.deliver(date(), &paths).await.is_err());
        assert!(paths.iter().all(|path| path.exists()));
        Ok(())
    }

    #[test]
    fn invalid_address_is_rejected() {
        assert!(Mailer::with_transport(AsyncStubTransport::new_ok(), "not an address", TO).is_err());
    }

    #[test]
    fn compose_ok() -> Result {
        let message = compose(
            FROM.parse()?,
            TO.parse()?,
            date(),
            vec![
                ("dashboard_7_3_2025.xlsx".to_owned(), vec![0x50, 0x4B, 0x03, 0x04]),
                ("PM_Module_7_3_2025.xlsx".to_owned(), vec![0x50, 0x4B]),
            ],
        )?;
        let formatted = String::from_utf8(message.formatted())?;
        assert!(formatted.contains("Subject: Energy Meter & Maintenance Reports - 2025-03-07"));
        assert!(formatted.contains("dashboard_7_3_2025.xlsx"));
        assert!(formatted.contains("PM_Module_7_3_2025.xlsx"));
        assert!(formatted.contains(XLSX_CONTENT_TYPE));
        Ok(())
    }
}
