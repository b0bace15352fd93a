// src/core/net.rs
// Blocking HTTPS client for the timetable host.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use reqwest::StatusCode;
use reqwest::blocking::Client;
use thiserror::Error;

use crate::config::consts::{BASE_URL, CLASS_ID_WIDTH, HTTP_TIMEOUT_SECS, TIMETABLE_TTL_SECS, USER_AGENT};
use super::cache::TtlCache;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("page not found: {url}")]
    NotFound { url: String },
    #[error("upstream answered {status} for {url}")]
    Upstream { status: u16, url: String },
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl FetchError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, FetchError::NotFound { .. })
    }
}

/// `{BASE_URL}/{week}/c{class:05}.htm`
pub fn timetable_url(week: u32, class_id: u32) -> String {
    format!("{BASE_URL}/{week}/c{class_id:0width$}.htm", width = CLASS_ID_WIDTH)
}

/// Anything that can hand over a raw timetable page.
pub trait TimetableSource: Send + Sync {
    fn fetch_page(&self, week: u32, class_id: u32) -> Result<String, FetchError>;

    /// Cheap existence check. Sources without a better way just fetch.
    fn page_exists(&self, week: u32, class_id: u32) -> bool {
        self.fetch_page(week, class_id).is_ok()
    }
}

pub struct HttpSource {
    client: Client,
    cache: Mutex<TtlCache<String>>,
    use_cache: bool,
}

impl HttpSource {
    pub fn new() -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            cache: Mutex::new(TtlCache::new(Duration::from_secs(TIMETABLE_TTL_SECS))),
            use_cache: true,
        })
    }

    /// Skip the page cache (reads and writes).
    pub fn without_cache(mut self) -> Self {
        self.use_cache = false;
        self
    }

    pub fn get(&self, url: &str) -> Result<String, FetchError> {
        if self.use_cache {
            if let Some(body) = self.cache.lock().ok().and_then(|c| c.get(url)) {
                logd!("Net: cache hit {}", url);
                return Ok(body);
            }
        }

        logf!("Net: GET {}", url);
        let resp = self.client.get(url).send()?;
        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound { url: s!(url) });
        }
        if !status.is_success() {
            loge!("Net: {} → {}", url, status);
            return Err(FetchError::Upstream { status: status.as_u16(), url: s!(url) });
        }
        let body = resp.text()?;

        if self.use_cache {
            if let Ok(mut cache) = self.cache.lock() {
                let dropped = cache.purge_at(Instant::now());
                if dropped > 0 {
                    logd!("Net: purged {} expired page(s)", dropped);
                }
                cache.insert(url, body.clone());
            }
        }
        Ok(body)
    }

    /// HEAD probe; any failure counts as absent.
    pub fn exists(&self, url: &str) -> bool {
        match self.client.head(url).send() {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                logd!("Net: HEAD {} failed: {}", url, e);
                false
            }
        }
    }
}

impl TimetableSource for HttpSource {
    fn fetch_page(&self, week: u32, class_id: u32) -> Result<String, FetchError> {
        self.get(&timetable_url(week, class_id))
    }

    fn page_exists(&self, week: u32, class_id: u32) -> bool {
        self.exists(&timetable_url(week, class_id))
    }
}

/// Pages held in memory, keyed by (week, class id). Used for local files.
#[derive(Clone, Debug, Default)]
pub struct StaticSource {
    pages: HashMap<(u32, u32), String>,
}

impl StaticSource {
    pub fn new() -> Self { Self::default() }

    pub fn with_page(mut self, week: u32, class_id: u32, html: impl Into<String>) -> Self {
        self.insert(week, class_id, html);
        self
    }

    pub fn insert(&mut self, week: u32, class_id: u32, html: impl Into<String>) {
        self.pages.insert((week, class_id), html.into());
    }
}

impl TimetableSource for StaticSource {
    fn fetch_page(&self, week: u32, class_id: u32) -> Result<String, FetchError> {
        self.pages
            .get(&(week, class_id))
            .cloned()
            .ok_or_else(|| FetchError::NotFound { url: timetable_url(week, class_id) })
    }
}
