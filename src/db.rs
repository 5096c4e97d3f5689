pub mod reading;
pub mod submission;

use bson::{Document, doc};
use chrono::NaiveDate;
use futures_util::TryStreamExt;
use mongodb::{Client, Database, error::ErrorKind};

pub use self::{
    reading::{Metric, Reading, parse_readings},
    submission::{Submission, submission_date},
};
use crate::{ops::Interval, prelude::*};

/// Failure at the document store boundary.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("the document store is unreachable")]
    Connection(#[source] mongodb::error::Error),

    #[error("failed to query `{collection}`")]
    Query {
        collection: String,

        #[source]
        source: mongodb::error::Error,
    },
}

impl StoreError {
    fn new(collection: &str, error: mongodb::error::Error) -> Self {
        match error.kind.as_ref() {
            ErrorKind::Io(_)
            | ErrorKind::ServerSelection { .. }
            | ErrorKind::DnsResolve { .. }
            | ErrorKind::ConnectionPoolCleared { .. } => Self::Connection(error),
            _ => Self::Query { collection: collection.to_owned(), source: error },
        }
    }
}

/// Meter and checklist databases behind a single client.
#[must_use]
#[derive(Clone)]
pub struct Db {
    client: Client,
    meters: Database,
    checklists: Database,
}

impl Db {
    /// Connect and ping the server, so that an unreachable store fails the run early.
    #[instrument(skip_all, fields(%meter_database, %checklist_database))]
    pub async fn connect(uri: &str, meter_database: &str, checklist_database: &str) -> Result<Self> {
        info!("connecting…");
        let this = Self::new(uri, meter_database, checklist_database).await?;
        this.meters
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|error| StoreError::new(meter_database, error))?;
        info!("connected");
        Ok(this)
    }

    /// The client connects lazily, on the first operation.
    async fn new(uri: &str, meter_database: &str, checklist_database: &str) -> Result<Self> {
        let client = Client::with_uri_str(uri).await.context("invalid MongoDB URI")?;
        Ok(Self {
            meters: client.database(meter_database),
            checklists: client.database(checklist_database),
            client,
        })
    }

    /// Readings of the metric in the window, ordered by timestamp.
    ///
    /// Malformed documents are skipped, an empty or inverted window does not touch the store.
    #[instrument(skip_all, fields(%metric, ?interval))]
    pub async fn find_readings(
        &self,
        metric: Metric,
        interval: Interval,
    ) -> Result<Vec<Reading>, StoreError> {
        if interval.is_empty() {
            return Ok(Vec::new());
        }
        info!("querying readings…");
        let collection_name = metric.collection_name();
        let documents: Vec<Document> = self
            .meters
            .collection::<Document>(collection_name)
            .find(timestamp_filter(interval))
            .sort(doc! { "timestamp": 1 })
            .await
            .map_err(|error| StoreError::new(collection_name, error))?
            .try_collect()
            .await
            .map_err(|error| StoreError::new(collection_name, error))?;
        let mut readings = parse_readings(&documents, metric);
        readings.retain(|reading| interval.contains(reading.timestamp));
        info!(n_documents = documents.len(), n_readings = readings.len(), "fetched");
        Ok(readings)
    }

    #[instrument(skip_all)]
    pub async fn checklist_collections(&self) -> Result<Vec<String>, StoreError> {
        self.checklists
            .list_collection_names()
            .await
            .map_err(|error| StoreError::new(self.checklists.name(), error))
    }

    /// Submission dates of every document in the checklist collection.
    #[instrument(skip_all, fields(%collection))]
    pub async fn find_submission_dates(&self, collection: &str) -> Result<Vec<NaiveDate>, StoreError> {
        let documents: Vec<Document> = self
            .checklists
            .collection::<Document>(collection)
            .find(doc! {})
            .projection(doc! { "submissionDate": 1 })
            .await
            .map_err(|error| StoreError::new(collection, error))?
            .try_collect()
            .await
            .map_err(|error| StoreError::new(collection, error))?;
        debug!(n_documents = documents.len(), "fetched");
        Ok(documents.iter().filter_map(submission_date).collect())
    }

    /// Submissions dated within the window, oldest first.
    #[instrument(skip_all, fields(%collection, ?interval))]
    pub async fn find_submissions(
        &self,
        collection: &str,
        interval: Interval,
    ) -> Result<Vec<Submission>, StoreError> {
        if interval.is_empty() {
            return Ok(Vec::new());
        }
        let documents: Vec<Document> = self
            .checklists
            .collection::<Document>(collection)
            .find(doc! {
                "submissionDate": {
                    "$gte": bson::DateTime::from_chrono(interval.start.and_utc()),
                    "$lt": bson::DateTime::from_chrono(interval.end.and_utc()),
                },
            })
            .sort(doc! { "submissionDate": 1 })
            .await
            .map_err(|error| StoreError::new(collection, error))?
            .try_collect()
            .await
            .map_err(|error| StoreError::new(collection, error))?;
        debug!(n_documents = documents.len(), "fetched");
        Ok(documents.iter().map(Submission::from).collect())
    }

    #[instrument(skip_all)]
    pub async fn shutdown(self) {
        info!("shutting down…");
        self.client.shutdown().await;
    }
}

/// Timestamps are either strings or BSON dates, so the range is matched for both types.
///
/// Strings compare byte by byte and come with different date-time separators, so the string
/// range covers whole days: from the window's first date up to the day after its last one.
/// The readings are trimmed to the window after parsing.
fn timestamp_filter(interval: Interval) -> Document {
    const FORMAT: &str = "%Y-%m-%d";
    let end_date = interval.end.date().succ_opt().unwrap_or(NaiveDate::MAX);
    doc! {
        "$or": [
            {
                "timestamp": {
                    "$gte": interval.start.date().format(FORMAT).to_string(),
                    "$lt": end_date.format(FORMAT).to_string(),
                },
            },
            {
                "timestamp": {
                    "$gte": bson::DateTime::from_chrono(interval.start.and_utc()),
                    "$lt": bson::DateTime::from_chrono(interval.end.and_utc()),
                },
            },
        ],
    }
}
