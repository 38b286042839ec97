//! Feedback repository for table storage operations.

use async_trait::async_trait;
use domain::models::FeedbackRecord;
use tracing::info;

use crate::error::StoreError;
use crate::table::TableClient;

/// Destination for redacted feedback rows.
#[async_trait]
pub trait FeedbackStore: Send + Sync {
    /// Writes a single row. Rows are never updated after insert.
    async fn insert(&self, record: &FeedbackRecord) -> Result<(), StoreError>;
}

/// Feedback rows stored in an Azure table.
#[derive(Debug, Clone)]
pub struct FeedbackRepository {
    client: TableClient,
    table: String,
}

impl FeedbackRepository {
    pub fn new(client: TableClient, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
        }
    }

    /// Creates the feedback table if it does not exist yet.
    pub async fn ensure_table(&self) -> Result<(), StoreError> {
        let created = self.client.create_table_if_not_exists(&self.table).await?;
        if created {
            info!(table = %self.table, "Created feedback table");
        }
        Ok(())
    }
}

#[async_trait]
impl FeedbackStore for FeedbackRepository {
    async fn insert(&self, record: &FeedbackRecord) -> Result<(), StoreError> {
        self.client.insert_entity(&self.table, record).await
    }
}
