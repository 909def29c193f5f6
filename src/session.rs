// src/session.rs

//! Authenticated page retrieval.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use crate::config::HttpConfig;
use crate::error::Result;

/// Host-managed transport the watcher fetches pages through.
///
/// The watcher re-authenticates every time it starts and fetches profile
/// pages by site-relative path. Implementations own cookies, tokens, and
/// whatever else the site requires between calls.
#[async_trait]
pub trait PageSession: Send + Sync {
    /// Establish or refresh the session.
    async fn authenticate(&self) -> Result<()>;

    /// Fetch a page body by site-relative path (e.g. `/alice`).
    async fn fetch_page(&self, path: &str) -> Result<String>;
}

/// Cookie-based HTTP session.
pub struct HttpSession {
    client: Client,
    base_url: Url,
    login_path: String,
    credentials: Option<(String, String)>,
}

impl HttpSession {
    /// Create a session from HTTP settings.
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .cookie_store(true)
            .build()?;
        let base_url = Url::parse(&config.base_url)?;
        let credentials = match (&config.username, &config.password) {
            (Some(username), Some(password)) => Some((username.clone(), password.clone())),
            _ => None,
        };

        Ok(Self {
            client,
            base_url,
            login_path: config.login_path.clone(),
            credentials,
        })
    }

    fn page_url(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }
}

#[async_trait]
impl PageSession for HttpSession {
    async fn authenticate(&self) -> Result<()> {
        // Public pages need no login; the cookie jar is left as-is.
        let Some((username, password)) = &self.credentials else {
            return Ok(());
        };

        let url = self.page_url(&self.login_path)?;
        let mut form = HashMap::new();
        form.insert("username", username.as_str());
        form.insert("password", password.as_str());

        log::debug!("authenticating against {url}");
        self.client
            .post(url)
            .form(&form)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn fetch_page(&self, path: &str) -> Result<String> {
        let url = self.page_url(path)?;
        let body = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(body)
    }
}
