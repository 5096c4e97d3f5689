use clap::Parser;
use lettre::transport::smtp::authentication::Credentials;

use crate::{mail::Mailer, prelude::*};

#[derive(Parser)]
pub struct SmtpArgs {
    #[clap(long = "smtp-host", env = "SMTP_HOST")]
    host: String,

    #[clap(long = "smtp-port", env = "SMTP_PORT", default_value = "587")]
    port: u16,

    #[clap(long = "smtp-username", env = "SMTP_USERNAME")]
    username: String,

    #[clap(long = "smtp-password", env = "SMTP_PASSWORD", hide_env_values = true)]
    password: String,

    #[clap(long = "mail-from", env = "MAIL_FROM")]
    from: String,

    #[clap(long = "mail-to", env = "MAIL_TO")]
    to: String,
}

impl SmtpArgs {
    pub fn mailer(&self) -> Result<Mailer> {
        let credentials = Credentials::new(self.username.clone(), self.password.clone());
        Mailer::new(&self.host, self.port, credentials, &self.from, &self.to)
    }
}
