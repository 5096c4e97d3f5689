use clap::Parser;

use crate::{db::Db, prelude::*};

#[derive(Parser)]
pub struct DbArgs {
    #[clap(long = "mongodb-uri", env = "MONGODB_URI")]
    uri: String,

    /// Database with the `kwh`, `pf`, `va`, and `current` collections.
    #[clap(long, env = "METER_DATABASE", default_value = "edms")]
    meter_database: String,

    /// Database with a collection per checklist.
    #[clap(long, env = "CHECKLIST_DATABASE", default_value = "scheq")]
    checklist_database: String,
}

impl DbArgs {
    pub async fn connect(&self) -> Result<Db> {
        Db::connect(&self.uri, &self.meter_database, &self.checklist_database).await
    }
}
