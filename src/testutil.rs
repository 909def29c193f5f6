//! Shared test fixtures: canned page markup and scripted collaborators.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::delivery::DeliverySink;
use crate::error::{AppError, Result};
use crate::models::PostRecord;
use crate::session::PageSession;

/// One post row in the legacy profile-page markup, as the live pages
/// render it (fixture mirrors a real page fragment).
pub fn status_block(id: u64, content_html: &str, source_html: &str) -> String {
    format!(
        r#"<li class="hentry status" id="status_{id}">
  <span class="status-body">
    <span class="entry-content">{content_html}</span>
    <span class="meta entry-meta">
      <span class="published">about 1 hour ago</span>
      <span>from {source_html}</span>
    </span>
  </span>
</li>"#
    )
}

/// A minimal profile page wrapping the given post rows. Rows are expected
/// newest first, matching the live pages.
pub fn profile_page(display_name: &str, handle: &str, blocks: &[String]) -> String {
    format!(
        r#"<html>
<head>
  <meta content="{handle}" name="page-user-screen_name" />
  <title>{display_name}</title>
</head>
<body>
  <div id="profile">
    <span class="label">Name</span>
    <span class="fn">{display_name}</span>
  </div>
  <ul id="timeline">
{}
  </ul>
</body>
</html>"#,
        blocks.join("\n")
    )
}

/// Scripted page session serving canned bodies by path.
#[derive(Default)]
pub struct FakeSession {
    pages: Mutex<HashMap<String, String>>,
    auth_calls: AtomicUsize,
}

impl FakeSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` for `path`. Paths without a page fail to fetch.
    pub fn set_page(&self, path: &str, body: impl Into<String>) {
        self.pages
            .lock()
            .unwrap()
            .insert(path.to_string(), body.into());
    }

    /// How many times `authenticate` has been called.
    pub fn auth_calls(&self) -> usize {
        self.auth_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageSession for FakeSession {
    async fn authenticate(&self) -> Result<()> {
        self.auth_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn fetch_page(&self, path: &str) -> Result<String> {
        self.pages
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| AppError::config(format!("no page scripted for {path}")))
    }
}

/// Session whose page fetches never complete.
pub struct StalledSession;

#[async_trait]
impl PageSession for StalledSession {
    async fn authenticate(&self) -> Result<()> {
        Ok(())
    }

    async fn fetch_page(&self, _path: &str) -> Result<String> {
        std::future::pending().await
    }
}

/// Sink that records everything it is handed.
#[derive(Default)]
pub struct VecSink {
    delivered: Mutex<Vec<PostRecord>>,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delivered(&self) -> Vec<PostRecord> {
        self.delivered.lock().unwrap().clone()
    }

    pub fn delivered_ids(&self) -> Vec<u64> {
        self.delivered.lock().unwrap().iter().map(|r| r.id).collect()
    }
}

#[async_trait]
impl DeliverySink for VecSink {
    async fn deliver(&self, record: &PostRecord) -> Result<()> {
        self.delivered.lock().unwrap().push(record.clone());
        Ok(())
    }
}

/// Sink that fails a window of delivery attempts, accepting the rest.
pub struct FlakySink {
    // 1-based attempt numbers; attempts inside the window fail
    fail_from: usize,
    fail_to: usize,
    attempts: Mutex<usize>,
    pub inner: VecSink,
}

impl FlakySink {
    /// Fail the first `times` deliveries, then accept.
    pub fn failing(times: usize) -> Self {
        Self::failing_window(1, times)
    }

    /// Accept the first `accepted` deliveries, then fail every later one.
    pub fn failing_after(accepted: usize) -> Self {
        Self::failing_window(accepted + 1, usize::MAX)
    }

    fn failing_window(fail_from: usize, fail_to: usize) -> Self {
        Self {
            fail_from,
            fail_to,
            attempts: Mutex::new(0),
            inner: VecSink::new(),
        }
    }
}

#[async_trait]
impl DeliverySink for FlakySink {
    async fn deliver(&self, record: &PostRecord) -> Result<()> {
        // The counter guard must not live across the await below; the
        // boxed delivery future has to stay Send.
        {
            let mut attempts = self.attempts.lock().unwrap();
            *attempts += 1;
            if (self.fail_from..=self.fail_to).contains(&*attempts) {
                return Err(AppError::config("sink unavailable"));
            }
        }
        self.inner.deliver(record).await
    }
}
