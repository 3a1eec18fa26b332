//! Resource staging and one-shot widget initialization.

pub mod registry;
pub mod resources;

use crate::coerce::{self, JsonMap};
use crate::config::{self, ConfigError, LoaderConfig};
use crate::instance::Instance;
use crate::suppression;
use registry::{CreateRequest, ReadyTimeout, Registry};
use resources::{LoadFailure, Resource, ResourceCache, ResourceKind, UnsupportedResource};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::oneshot;

#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("initialization already attempted")]
    AlreadyAttempted,
    #[error(transparent)]
    Unsupported(#[from] UnsupportedResource),
    #[error(transparent)]
    Resource(#[from] LoadFailure),
    #[error(transparent)]
    NotReady(#[from] ReadyTimeout),
    #[error("widget entry point unavailable")]
    EntryPointUnavailable,
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Stages the widget's resources and dispatches creation, at most once per
/// process.
pub struct Loader {
    attempted: AtomicBool,
    cache: ResourceCache,
    registry: Arc<Registry>,
}

impl Loader {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self {
            attempted: AtomicBool::new(false),
            cache: ResourceCache::default(),
            registry,
        }
    }

    pub fn global() -> &'static Loader {
        static GLOBAL: OnceLock<Loader> = OnceLock::new();
        GLOBAL.get_or_init(|| Loader::new(Registry::global()))
    }

    pub fn attempted(&self) -> bool {
        self.attempted.load(Ordering::SeqCst)
    }

    /// Runs the full pipeline: guard, resource staging, readiness wait,
    /// configuration merge, creation dispatch. The first call arms the
    /// guard permanently; every later call fails with
    /// [`LoaderError::AlreadyAttempted`] no matter how the first one ends.
    pub async fn initialize(&self, overrides: &JsonMap) -> Result<Option<Instance>, LoaderError> {
        let result = self.run(overrides).await;
        if let Err(e) = &result {
            log::error!("floating ball initialization failed: {e}");
        }
        result
    }

    async fn run(&self, overrides: &JsonMap) -> Result<Option<Instance>, LoaderError> {
        if self.attempted.swap(true, Ordering::SeqCst) {
            return Err(LoaderError::AlreadyAttempted);
        }

        let blob = coerce::shallow_merge(LoaderConfig::defaults_value(), overrides);
        let cfg = LoaderConfig::from_map(&blob)?;

        // classify up front so an unsupported resource fails synchronously
        let icon_request = request(cfg.load_icons, &cfg.icon_theme_path)?;
        let style_request = request(cfg.load_styles, &cfg.style_path)?;

        let (icons, styles) = tokio::join!(
            self.fetch(icon_request),
            self.fetch(style_request),
        );

        let mut staged = Vec::new();
        if let Some(outcome) = icons {
            staged.push(outcome?);
        }
        if let Some(outcome) = styles {
            staged.push(outcome?);
        }

        let entry = self
            .registry
            .wait_ready(Duration::from_millis(cfg.init_timeout))
            .await?;

        // user configuration wins over loader-level keys, best effort
        let user = config::load_user_overrides().unwrap_or_else(|e| {
            log::warn!("user configuration ignored: {e}");
            JsonMap::new()
        });
        let blob = coerce::shallow_merge(blob, &user);

        let (reply_tx, reply_rx) = oneshot::channel();
        entry
            .send(CreateRequest {
                config: blob,
                resources: staged,
                reply: reply_tx,
            })
            .await
            .map_err(|_| LoaderError::EntryPointUnavailable)?;

        let created = reply_rx
            .await
            .map_err(|_| LoaderError::EntryPointUnavailable)?;
        Ok(created?)
    }

    async fn fetch(
        &self,
        request: Option<(String, ResourceKind)>,
    ) -> Option<Result<Resource, LoadFailure>> {
        match request {
            Some((url, kind)) => Some(self.cache.get_or_load(&url, kind).await),
            None => None,
        }
    }

    /// Startup path: environment overrides, coerced against the loader
    /// defaults. Suppression and `auto_init=false` return before the
    /// one-shot guard is armed, so a later explicit call still works.
    pub async fn auto_initialize(&self) -> Result<Option<Instance>, LoaderError> {
        self.auto_initialize_with(&coerce::env_overrides()).await
    }

    pub async fn auto_initialize_with(
        &self,
        raw: &BTreeMap<String, String>,
    ) -> Result<Option<Instance>, LoaderError> {
        if suppression::is_suppressed() {
            log::info!("floating ball disabled by launch query");
            return Ok(None);
        }

        let merged = coerce::merge_coerced(&LoaderConfig::defaults_value(), raw);
        if auto_init_disabled(&merged) {
            log::info!("auto initialization disabled by configuration");
            return Ok(None);
        }

        self.initialize(&merged).await
    }
}

fn request(
    wanted: bool,
    url: &str,
) -> Result<Option<(String, ResourceKind)>, UnsupportedResource> {
    if !wanted {
        return Ok(None);
    }
    Ok(Some((url.to_string(), ResourceKind::classify(url)?)))
}

fn auto_init_disabled(map: &JsonMap) -> bool {
    // the original surface compared the stringified value against "false"
    match map.get("auto_init") {
        Some(serde_json::Value::Bool(enabled)) => !enabled,
        Some(serde_json::Value::String(s)) => s.eq_ignore_ascii_case("false"),
        _ => false,
    }
}
