use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::application::{FetchError, FetchedPage, PageFetcher};

/// Serves canned pages keyed by URL. Unknown URLs fail to connect.
#[derive(Clone, Default)]
pub struct FakePageFetcher {
    pages: Arc<Mutex<HashMap<String, Result<FetchedPage, FetchError>>>>,
}

impl FakePageFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_page(&self, url: &str, status: u16, body: impl Into<Vec<u8>>) {
        let page = FetchedPage {
            status,
            body: body.into(),
        };
        self.lock().insert(url.to_string(), Ok(page));
    }

    /// Serve `count` buttons labelled `label` among some unrelated markup.
    pub fn set_buttons(&self, url: &str, label: &str, count: usize) {
        let mut html = String::from("<html><body><button>Sign in</button>");
        for _ in 0..count {
            html.push_str(&format!("<button>{label}</button>"));
        }
        html.push_str("</body></html>");
        self.set_page(url, 200, html);
    }

    pub fn set_error(&self, url: &str, err: FetchError) {
        self.lock().insert(url.to_string(), Err(err));
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Result<FetchedPage, FetchError>>> {
        self.pages.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl PageFetcher for FakePageFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        self.lock()
            .get(url)
            .cloned()
            .unwrap_or_else(|| Err(FetchError::Connect(format!("no page for {url}"))))
    }
}
