use crate::coerce::JsonMap;
use crate::config::ConfigError;
use crate::instance::Instance;
use crate::loader::resources::Resource;
use parking_lot::Mutex;
use std::fmt;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Notify;
use tokio::sync::oneshot;

/// One widget-creation dispatch from the loader to the GTK thread.
pub struct CreateRequest {
    /// Merged loader + environment + user configuration blob.
    pub config: JsonMap,
    /// Staged resources to apply before creation.
    pub resources: Vec<Resource>,
    pub reply: oneshot::Sender<Result<Option<Instance>, ConfigError>>,
}

impl fmt::Debug for CreateRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateRequest")
            .field("resources", &self.resources.len())
            .finish_non_exhaustive()
    }
}

/// The widget core's public creation entry point.
pub type EntryPoint = async_channel::Sender<CreateRequest>;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("widget core was not ready within {timeout_ms}ms")]
pub struct ReadyTimeout {
    pub timeout_ms: u64,
}

/// Rendezvous between the widget core and the loader. The core installs its
/// entry point once it is up; waiters are woken by a one-shot notification
/// instead of polling, with the same timeout-and-fail contract.
#[derive(Default)]
pub struct Registry {
    entry: Mutex<Option<EntryPoint>>,
    ready: Notify,
}

impl Registry {
    pub fn global() -> Arc<Registry> {
        static GLOBAL: OnceLock<Arc<Registry>> = OnceLock::new();
        GLOBAL.get_or_init(|| Arc::new(Registry::default())).clone()
    }

    pub fn install(&self, entry: EntryPoint) {
        *self.entry.lock() = Some(entry);
        self.ready.notify_waiters();
        log::debug!("widget core entry point registered");
    }

    pub fn entry_point(&self) -> Option<EntryPoint> {
        self.entry.lock().clone()
    }

    pub async fn wait_ready(&self, limit: Duration) -> Result<EntryPoint, ReadyTimeout> {
        let ready = async {
            loop {
                let notified = self.ready.notified();
                if let Some(entry) = self.entry_point() {
                    return entry;
                }
                notified.await;
            }
        };
        tokio::time::timeout(limit, ready)
            .await
            .map_err(|_| ReadyTimeout {
                timeout_ms: limit.as_millis() as u64,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> (EntryPoint, async_channel::Receiver<CreateRequest>) {
        async_channel::unbounded()
    }

    #[tokio::test]
    async fn test_wait_after_install_resolves_immediately() {
        let registry = Registry::default();
        let (tx, _rx) = entry();
        registry.install(tx);
        assert!(registry.wait_ready(Duration::from_millis(1)).await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_is_woken_by_a_late_install() {
        let registry = Arc::new(Registry::default());

        let waiter = {
            let registry = registry.clone();
            tokio::spawn(async move { registry.wait_ready(Duration::from_millis(5000)).await })
        };

        tokio::time::sleep(Duration::from_millis(200)).await;
        let (tx, _rx) = entry();
        registry.install(tx);

        assert!(waiter.await.unwrap().is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_times_out_without_a_core() {
        let registry = Registry::default();
        let err = registry
            .wait_ready(Duration::from_millis(750))
            .await
            .unwrap_err();
        assert_eq!(err, ReadyTimeout { timeout_ms: 750 });
    }
}
