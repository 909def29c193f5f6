//! Post record data structure.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Author of a profile page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Author {
    /// Display name shown on the page
    pub display_name: String,

    /// Screen name the page belongs to
    pub handle: String,
}

/// A post observed on a profile page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PostRecord {
    /// Numeric post identifier
    pub id: u64,

    /// Post text with anchors reduced to their bare URL, remaining tags
    /// stripped, and character references unescaped
    pub text: String,

    /// Client the post was published from
    pub source_client: String,

    /// Page author, shared by every record from the same page
    pub author: Author,

    /// When the poller observed the post. The markup carries only vague
    /// relative timestamps, so records are stamped with local fetch time.
    pub observed_at: DateTime<Utc>,
}

impl PostRecord {
    /// Format the record for display using a template.
    ///
    /// Supported placeholders:
    /// - `{id}`, `{text}`, `{source_client}`
    /// - `{display_name}`, `{handle}`, `{observed_at}`
    pub fn format(&self, template: &str) -> String {
        template
            .replace("{id}", &self.id.to_string())
            .replace("{text}", &self.text)
            .replace("{source_client}", &self.source_client)
            .replace("{display_name}", &self.author.display_name)
            .replace("{handle}", &self.author.handle)
            .replace("{observed_at}", &self.observed_at.to_rfc3339())
    }
}
