use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::OnceCell;

/// Per-resource load deadline.
pub const RESOURCE_TIMEOUT: Duration = Duration::from_millis(5000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Stylesheet,
    IconTheme,
}

#[derive(Debug, Error)]
#[error("unsupported resource type: {0}")]
pub struct UnsupportedResource(pub String);

impl ResourceKind {
    /// Classifies a resource URL by shape, before any IO, so a bad resource
    /// list fails synchronously.
    pub fn classify(url: &str) -> Result<Self, UnsupportedResource> {
        let path = Path::new(url);
        if path.file_name().and_then(|n| n.to_str()) == Some("index.theme") {
            return Ok(Self::IconTheme);
        }
        match path.extension().and_then(|e| e.to_str()) {
            Some("css") => Ok(Self::Stylesheet),
            // a bare directory is an icon theme root
            None => Ok(Self::IconTheme),
            Some(_) => Err(UnsupportedResource(url.to_string())),
        }
    }
}

/// A staged resource, ready to be applied on the GTK thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resource {
    Stylesheet { css: String },
    IconTheme { name: String },
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LoadFailure {
    #[error("resource load timed out after {timeout_ms}ms: {url}")]
    Timeout { url: String, timeout_ms: u64 },
    #[error("resource load failed: {url}: {reason}")]
    Failed { url: String, reason: String },
}

type Outcome = Result<Resource, LoadFailure>;

/// URL-keyed load cache. Concurrent requests for one URL share a single
/// fetch; entries live for the whole process and are never evicted, so a
/// later request observes the first outcome, success or failure.
#[derive(Default)]
pub struct ResourceCache {
    slots: Mutex<HashMap<String, Arc<OnceCell<Outcome>>>>,
}

impl ResourceCache {
    pub async fn get_or_load(&self, url: &str, kind: ResourceKind) -> Outcome {
        self.get_or_load_with(url, fetch(url.to_string(), kind)).await
    }

    pub async fn get_or_load_with<F>(&self, url: &str, load: F) -> Outcome
    where
        F: Future<Output = Outcome>,
    {
        let cell = {
            let mut slots = self.slots.lock();
            slots.entry(url.to_string()).or_default().clone()
        };
        cell.get_or_init(|| load).await.clone()
    }

    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.lock().is_empty()
    }
}

async fn fetch(url: String, kind: ResourceKind) -> Outcome {
    with_deadline(&url, RESOURCE_TIMEOUT, read(url.clone(), kind)).await
}

pub(crate) async fn with_deadline<F>(url: &str, limit: Duration, load: F) -> Outcome
where
    F: Future<Output = Outcome>,
{
    match tokio::time::timeout(limit, load).await {
        Ok(outcome) => outcome,
        // the abandoned load future is dropped here, cancelling its IO
        Err(_) => Err(LoadFailure::Timeout {
            url: url.to_string(),
            timeout_ms: limit.as_millis() as u64,
        }),
    }
}

async fn read(url: String, kind: ResourceKind) -> Outcome {
    let failed = |e: std::io::Error| LoadFailure::Failed {
        url: url.clone(),
        reason: e.to_string(),
    };
    match kind {
        ResourceKind::Stylesheet => {
            let css = tokio::fs::read_to_string(&url).await.map_err(failed)?;
            Ok(Resource::Stylesheet { css })
        }
        ResourceKind::IconTheme => {
            let path = Path::new(&url);
            let dir = if path.file_name().and_then(|n| n.to_str()) == Some("index.theme") {
                path.parent().unwrap_or(path).to_path_buf()
            } else {
                path.to_path_buf()
            };
            tokio::fs::read_to_string(dir.join("index.theme"))
                .await
                .map_err(failed)?;
            let name = dir
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("hicolor")
                .to_string();
            Ok(Resource::IconTheme { name })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_classify() {
        assert_eq!(
            ResourceKind::classify("assets/floating-ball.css").unwrap(),
            ResourceKind::Stylesheet
        );
        assert_eq!(
            ResourceKind::classify("/usr/share/icons/hicolor").unwrap(),
            ResourceKind::IconTheme
        );
        assert_eq!(
            ResourceKind::classify("/usr/share/icons/hicolor/index.theme").unwrap(),
            ResourceKind::IconTheme
        );
        assert!(ResourceKind::classify("widget.js").is_err());
        assert!(ResourceKind::classify("widget.wasm").is_err());
    }

    #[tokio::test]
    async fn test_concurrent_requests_share_one_fetch() {
        let cache = ResourceCache::default();
        let fetches = AtomicUsize::new(0);

        let load = || async {
            fetches.fetch_add(1, Ordering::SeqCst);
            Ok(Resource::Stylesheet { css: ".a {}".to_string() })
        };

        let (first, second) = tokio::join!(
            cache.get_or_load_with("style.css", load()),
            cache.get_or_load_with("style.css", load()),
        );

        assert_eq!(fetches.load(Ordering::SeqCst), 1);
        assert_eq!(first, second);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_failure_outcome_is_cached() {
        let cache = ResourceCache::default();
        let failure = LoadFailure::Failed {
            url: "style.css".to_string(),
            reason: "no such file".to_string(),
        };

        let first = cache
            .get_or_load_with("style.css", async { Err(failure.clone()) })
            .await;
        assert_eq!(first, Err(failure.clone()));

        // the second request must reuse the first outcome, not re-fetch
        let reran = AtomicUsize::new(0);
        let second = cache
            .get_or_load_with("style.css", async {
                reran.fetch_add(1, Ordering::SeqCst);
                Ok(Resource::Stylesheet { css: String::new() })
            })
            .await;
        assert_eq!(reran.load(Ordering::SeqCst), 0);
        assert_eq!(second, Err(failure));
    }

    #[tokio::test]
    async fn test_distinct_urls_fetch_separately() {
        let cache = ResourceCache::default();
        let fetches = AtomicUsize::new(0);

        for url in ["a.css", "b.css"] {
            let _ = cache
                .get_or_load_with(url, async {
                    fetches.fetch_add(1, Ordering::SeqCst);
                    Ok(Resource::Stylesheet { css: String::new() })
                })
                .await;
        }

        assert_eq!(fetches.load(Ordering::SeqCst), 2);
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_converts_a_stalled_load_into_a_timeout() {
        let outcome = with_deadline(
            "slow.css",
            Duration::from_millis(50),
            std::future::pending(),
        )
        .await;
        assert_eq!(
            outcome,
            Err(LoadFailure::Timeout { url: "slow.css".to_string(), timeout_ms: 50 })
        );
    }

    #[tokio::test]
    async fn test_missing_stylesheet_fails_with_the_url() {
        let cache = ResourceCache::default();
        let outcome = cache
            .get_or_load("/nonexistent/floating-ball.css", ResourceKind::Stylesheet)
            .await;
        match outcome {
            Err(LoadFailure::Failed { url, .. }) => {
                assert_eq!(url, "/nonexistent/floating-ball.css");
            }
            other => panic!("expected load failure, got {other:?}"),
        }
    }
}
