use crate::loader::Loader;
use std::thread;
use tokio::runtime::Runtime;

/// Runs loader auto-initialization on a background Tokio runtime while the
/// GTK main loop owns the foreground thread. The returned instance handle is
/// kept alive with the runtime.
pub fn start_background_services() {
    thread::spawn(move || {
        let rt = match Runtime::new() {
            Ok(rt) => rt,
            Err(e) => {
                log::error!("failed to create Tokio runtime: {}", e);
                return;
            }
        };

        rt.block_on(async {
            let _instance = match Loader::global().auto_initialize().await {
                Ok(Some(instance)) => {
                    log::info!("floating ball ready");
                    Some(instance)
                }
                Ok(None) => None,
                Err(e) => {
                    log::error!("floating ball failed to start: {}", e);
                    None
                }
            };

            std::future::pending::<()>().await;
        });
    });
}
