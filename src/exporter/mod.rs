//! Collection export
//!
//! Reads a whole collection through a batched cursor and materializes it as
//! a single [`Table`]:
//!
//! 1. Documents are accumulated into a buffer bounded at the batch size
//! 2. Each full buffer (and a final partial one) becomes a table fragment
//! 3. Fragments are concatenated in cursor order
//! 4. The identifier column is dropped and sentinel strings become missing
//!
//! Any failure along the way is returned as a single
//! [`ExportError`](crate::error::ExportError) tagged with the stage it came
//! from; nothing partial is returned and nothing is retried.
//!
//! # Example
//!
//! ```no_run
//! use mongoframe::{CollectionExporter, Config};
//!
//! # async fn run() -> mongoframe::Result<()> {
//! let config = Config::default();
//! let exporter = CollectionExporter::connect(&config).await?;
//! let table = exporter.export("orders", None).await?;
//! println!("{} rows", table.num_rows());
//! # Ok(())
//! # }
//! ```

mod progress;
mod source;

#[cfg(test)]
mod tests;

use std::time::Instant;

use mongodb::bson::Document;
use tracing::{debug, info, warn};

use crate::config::{Config, ExportConfig};
use crate::connection::ConnectionManager;
use crate::error::{ExportError, ExportErrorKind, MongoframeError, Result};
use crate::frame::Table;

pub use progress::ProgressTracker;
pub use source::{CursorDocumentStream, DocumentCursor, DocumentSource};

/// Documents fetched per round trip unless configured otherwise
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Field generated by the database for every document
pub const DEFAULT_ID_FIELD: &str = "_id";

/// Placeholder used in source data for missing information
pub const DEFAULT_SENTINEL: &str = "na";

/// A failure tagged with the export stage it happened in
type Staged<T> = std::result::Result<T, (ExportErrorKind, MongoframeError)>;

/// Statistics about a finished export
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportStats {
    /// Row count of each fragment, in the order they were built
    pub fragment_rows: Vec<usize>,
    /// Whether the identifier column was present and removed
    pub id_dropped: bool,
    /// Cells replaced with the missing-value marker
    pub sentinels_replaced: usize,
    /// Time taken for the export
    pub elapsed_ms: u64,
}

impl ExportStats {
    /// Total rows across all fragments
    pub fn total_rows(&self) -> usize {
        self.fragment_rows.iter().sum()
    }
}

/// Exports whole collections as tables
///
/// Holds the document source and the database used when an export does not
/// name one. Each call to [`export`](Self::export) owns its own cursor and
/// buffer, so one exporter can serve concurrent exports.
pub struct CollectionExporter<S> {
    source: S,
    default_database: String,
    batch_size: usize,
    id_field: String,
    sentinels: Vec<String>,
    show_progress: bool,
}

impl CollectionExporter<ConnectionManager> {
    /// Connect to MongoDB using `config` and build an exporter bound to
    /// `config.connection.database`.
    ///
    /// # Returns
    /// * `Result<Self>` - Connected exporter, or an `ExportError` of kind
    ///   `Connection` wrapping the initialization failure
    pub async fn connect(config: &Config) -> Result<Self> {
        let database = config.connection.database.clone();
        let mut manager =
            ConnectionManager::new(config.connection.uri.clone(), config.connection.clone());

        if let Err(e) = manager.connect().await {
            return Err(ExportError::new(ExportErrorKind::Connection, database, e).into());
        }

        Ok(Self::new(manager, database).with_export_config(&config.export))
    }
}

impl<S: DocumentSource> CollectionExporter<S> {
    /// Create an exporter over `source`
    ///
    /// # Arguments
    /// * `source` - Where documents are read from
    /// * `default_database` - Database used when an export names none
    pub fn new(source: S, default_database: impl Into<String>) -> Self {
        Self {
            source,
            default_database: default_database.into(),
            batch_size: DEFAULT_BATCH_SIZE,
            id_field: DEFAULT_ID_FIELD.to_string(),
            sentinels: vec![DEFAULT_SENTINEL.to_string()],
            show_progress: false,
        }
    }

    /// Set the batch size. Zero is treated as one.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Set an extra identifier column dropped from results. `_id` is
    /// always dropped.
    pub fn with_id_field(mut self, id_field: impl Into<String>) -> Self {
        self.id_field = id_field.into();
        self
    }

    /// Set the exact string values replaced with the missing-value marker
    pub fn with_sentinels<I, T>(mut self, sentinels: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.sentinels = sentinels.into_iter().map(Into::into).collect();
        self
    }

    /// Show a spinner while fetching
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Apply the `[export]` configuration section
    pub fn with_export_config(self, config: &ExportConfig) -> Self {
        self.with_batch_size(config.batch_size)
            .with_id_field(config.id_field.clone())
            .with_sentinels(config.sentinels.iter().cloned())
            .with_progress(config.progress)
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn default_database(&self) -> &str {
        &self.default_database
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Export a collection from the default database
    pub async fn export_default(&self, collection: &str) -> Result<Table> {
        self.export(collection, None).await
    }

    /// Export every document of a collection as a table
    ///
    /// # Arguments
    /// * `collection` - Collection name
    /// * `database` - Database name, or `None` for the default database
    ///
    /// # Returns
    /// * `Result<Table>` - The post-processed table or an `ExportError`
    pub async fn export(&self, collection: &str, database: Option<&str>) -> Result<Table> {
        self.export_with_stats(collection, database)
            .await
            .map(|(table, _)| table)
    }

    /// Like [`export`](Self::export), also returning statistics
    pub async fn export_with_stats(
        &self,
        collection: &str,
        database: Option<&str>,
    ) -> Result<(Table, ExportStats)> {
        let database = database.unwrap_or(&self.default_database);
        let target = format!("{database}.{collection}");

        match self.run(database, collection, &target).await {
            Ok(done) => Ok(done),
            Err((kind, cause)) => {
                warn!("Export of {} failed at {} stage", target, kind);
                Err(ExportError::new(kind, target, cause).into())
            }
        }
    }

    /// Export with statistics, then close the source
    ///
    /// The source is closed whether or not the export succeeded. An export
    /// failure is reported ahead of a failure to close.
    pub async fn export_and_close(
        mut self,
        collection: &str,
        database: Option<&str>,
    ) -> Result<(Table, ExportStats)> {
        let exported = self.export_with_stats(collection, database).await;
        let closed = self.source.close().await;
        let done = exported?;
        closed?;
        Ok(done)
    }

    async fn run(
        &self,
        database: &str,
        collection: &str,
        target: &str,
    ) -> Staged<(Table, ExportStats)> {
        let start_time = Instant::now();
        info!(
            "Fetching {} from MongoDB in batches of {}",
            target, self.batch_size
        );

        let cursor_batch = u32::try_from(self.batch_size).unwrap_or(u32::MAX);
        let mut cursor = self
            .source
            .open_cursor(database, collection, cursor_batch)
            .await
            .map_err(classify_read_failure)?;

        let tracker = ProgressTracker::new(self.show_progress);
        let fetched = self.collect_fragments(cursor.as_mut(), &tracker).await;
        tracker.finish();
        let fragments = fetched?;

        let mut stats = ExportStats {
            fragment_rows: fragments.iter().map(Table::num_rows).collect(),
            ..ExportStats::default()
        };

        if fragments.is_empty() {
            info!("Collection {} is empty", target);
            stats.elapsed_ms = start_time.elapsed().as_millis() as u64;
            return Ok((Table::empty(), stats));
        }

        let mut table = Table::concat(fragments);
        info!(
            "Fetched {} rows from {} in {} fragments",
            table.num_rows(),
            target,
            stats.fragment_rows.len()
        );

        stats.id_dropped = table.drop_column(DEFAULT_ID_FIELD);
        if self.id_field != DEFAULT_ID_FIELD {
            stats.id_dropped |= table.drop_column(&self.id_field);
        }
        stats.sentinels_replaced = table.replace_sentinels(&self.sentinels);
        debug!(
            "Dropped id column: {}, replaced {} sentinel cells",
            stats.id_dropped, stats.sentinels_replaced
        );

        stats.elapsed_ms = start_time.elapsed().as_millis() as u64;
        Ok((table, stats))
    }

    /// Drain the cursor into fragments of at most `batch_size` rows
    async fn collect_fragments(
        &self,
        cursor: &mut dyn DocumentCursor,
        tracker: &ProgressTracker,
    ) -> Staged<Vec<Table>> {
        let mut buffer: Vec<Document> = Vec::with_capacity(self.batch_size);
        let mut fragments = Vec::new();
        let mut fetched = 0u64;

        while let Some(doc) = cursor.next_document().await.map_err(classify_read_failure)? {
            buffer.push(doc);

            if buffer.len() == self.batch_size {
                fragments.push(self.flush(&mut buffer, fragments.len())?);
                fetched += self.batch_size as u64;
                tracker.update(fetched);
            }
        }

        if !buffer.is_empty() {
            fetched += buffer.len() as u64;
            fragments.push(self.flush(&mut buffer, fragments.len())?);
            tracker.update(fetched);
        }

        Ok(fragments)
    }

    /// Turn the buffer into a fragment and clear it
    fn flush(&self, buffer: &mut Vec<Document>, index: usize) -> Staged<Table> {
        let fragment = Table::from_documents(buffer)
            .map_err(|e| (ExportErrorKind::Construction, e))?;
        debug!(
            "Built fragment #{} with {} rows",
            index + 1,
            fragment.num_rows()
        );
        buffer.clear();
        Ok(fragment)
    }
}

/// Decide whether a read failure is a connection or a query problem
fn classify_read_failure(err: MongoframeError) -> (ExportErrorKind, MongoframeError) {
    use mongodb::error::ErrorKind;

    let kind = match &err {
        MongoframeError::Connection(_) => ExportErrorKind::Connection,
        MongoframeError::MongoDb(e) if matches!(*e.kind, ErrorKind::ServerSelection { .. }) => {
            ExportErrorKind::Connection
        }
        _ => ExportErrorKind::Query,
    };
    (kind, err)
}
