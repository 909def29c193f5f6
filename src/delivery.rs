//! Delivery sink for newly observed records.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::PostRecord;

/// Downstream consumer of new post records.
///
/// Records arrive one at a time, oldest first, and are awaited
/// sequentially. A failure aborts the remainder of that target's batch
/// for the current cycle; undelivered records are not retried.
#[async_trait]
pub trait DeliverySink: Send + Sync {
    /// Accept one record.
    async fn deliver(&self, record: &PostRecord) -> Result<()>;
}

/// Sink that prints each record to stdout through a template.
pub struct ConsoleSink {
    template: String,
}

impl ConsoleSink {
    /// Create a sink with the given record template; see
    /// [`PostRecord::format`] for the supported placeholders.
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }
}

#[async_trait]
impl DeliverySink for ConsoleSink {
    async fn deliver(&self, record: &PostRecord) -> Result<()> {
        println!("{}", record.format(&self.template));
        Ok(())
    }
}
