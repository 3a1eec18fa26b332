pub mod app;
pub mod ball;
pub mod icons;
pub mod theme;
pub mod window;

pub use app::HostModel;

use crate::config::Config;
use crate::instance::Instance;
use crate::suppression;

/// Creation entry point. Returns `None` when the launch query suppresses the
/// widget; otherwise builds one independent widget window per call. The
/// controller must be kept alive for as long as the widget should exist.
///
/// Call on the GTK main thread.
pub fn create(config: Config) -> Option<(relm4::Controller<ball::BallModel>, Instance)> {
    if suppression::is_suppressed() {
        log::info!("floating ball suppressed by launch query");
        return None;
    }
    Some(ball::spawn(config))
}
