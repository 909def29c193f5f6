//! Page retrieval for watch targets.

use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::session::PageSession;

/// Fetches profile-page bodies through the host session.
pub struct PageFetcher {
    session: Arc<dyn PageSession>,
}

impl PageFetcher {
    /// Wrap the session the host manages.
    pub fn new(session: Arc<dyn PageSession>) -> Self {
        Self { session }
    }

    /// Fetch the page body for one target.
    ///
    /// Failures surface as fetch errors with the target attached; retrying
    /// is left to the next polling cycle.
    pub async fn fetch(&self, target: &str) -> Result<String> {
        self.session
            .fetch_page(&format!("/{target}"))
            .await
            .map_err(|e| AppError::fetch(target, e))
    }
}
