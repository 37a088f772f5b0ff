//! Document sources for export operations
//!
//! The exporter reads through the [`DocumentSource`] and [`DocumentCursor`]
//! traits so that the batching logic does not depend on a live server.
//! [`CursorDocumentStream`] adapts a MongoDB driver cursor.

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::Cursor;
use mongodb::bson::Document;
use tracing::debug;

use crate::error::Result;

/// Something that can open an unfiltered cursor over a collection
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Open a cursor over every document in `database.collection`.
    ///
    /// # Arguments
    /// * `database` - Database name
    /// * `collection` - Collection name
    /// * `batch_size` - Documents fetched per server round trip
    ///
    /// # Returns
    /// * `Result<Box<dyn DocumentCursor>>` - Open cursor or error
    async fn open_cursor(
        &self,
        database: &str,
        collection: &str,
        batch_size: u32,
    ) -> Result<Box<dyn DocumentCursor>>;

    /// Release whatever the source holds open. Nothing by default.
    async fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Forward-only iterator over documents
#[async_trait]
pub trait DocumentCursor: Send {
    /// Fetch the next document, or `None` once the cursor is exhausted.
    async fn next_document(&mut self) -> Result<Option<Document>>;
}

/// Driver cursor adapter
pub struct CursorDocumentStream {
    cursor: Option<Cursor<Document>>,
    fetched: u64,
}

impl CursorDocumentStream {
    pub fn new(cursor: Cursor<Document>) -> Self {
        Self {
            cursor: Some(cursor),
            fetched: 0,
        }
    }
}

#[async_trait]
impl DocumentCursor for CursorDocumentStream {
    async fn next_document(&mut self) -> Result<Option<Document>> {
        let Some(cursor) = self.cursor.as_mut() else {
            return Ok(None);
        };

        match cursor.try_next().await {
            Ok(Some(doc)) => {
                self.fetched += 1;
                Ok(Some(doc))
            }
            Ok(None) => {
                debug!("Cursor exhausted after {} documents", self.fetched);
                self.cursor = None;
                Ok(None)
            }
            Err(e) => {
                // Release server resources on error
                self.cursor = None;
                Err(e.into())
            }
        }
    }
}
