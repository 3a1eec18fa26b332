use crate::config::{Config, Href};
use crate::events::InstanceCmd;
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Callback attached to a menu item. Invoked instead of default navigation.
pub type ItemAction = Arc<dyn Fn(&ItemContext) + Send + Sync>;

/// Caller-owned handle to one created widget.
///
/// Operations on a destroyed instance are silent no-ops.
pub struct Instance {
    commands: async_channel::Sender<InstanceCmd>,
    config: Arc<Config>,
    destroyed: AtomicBool,
}

impl Instance {
    pub(crate) fn new(commands: async_channel::Sender<InstanceCmd>, config: Arc<Config>) -> Self {
        Self {
            commands,
            config,
            destroyed: AtomicBool::new(false),
        }
    }

    pub fn open(&self) {
        self.send(InstanceCmd::Open);
    }

    pub fn close(&self) {
        self.send(InstanceCmd::Close);
    }

    /// Removes the widget from the screen. Guarded against double-destroy.
    pub fn destroy(&self) {
        if self.destroyed.swap(true, Ordering::SeqCst) {
            return;
        }
        let _ = self.commands.try_send(InstanceCmd::Destroy);
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::SeqCst)
    }

    /// The merged configuration this instance was created with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    fn send(&self, cmd: InstanceCmd) {
        if self.destroyed.load(Ordering::SeqCst) {
            return;
        }
        let _ = self.commands.try_send(cmd);
    }
}

/// Passed to a menu item's action so it can reach its own instance without
/// any ambient registry.
pub struct ItemContext {
    href: Href,
    commands: async_channel::Sender<InstanceCmd>,
}

impl ItemContext {
    pub(crate) fn new(href: Href, commands: async_channel::Sender<InstanceCmd>) -> Self {
        Self { href, commands }
    }

    pub fn href(&self) -> &Href {
        &self.href
    }

    pub fn close_menu(&self) {
        let _ = self.commands.try_send(InstanceCmd::Close);
    }

    /// Hides the whole widget; the instance stays alive.
    pub fn hide(&self) {
        let _ = self.commands.try_send(InstanceCmd::Hide);
    }

    /// Default navigation, for actions that also want to follow the link.
    pub fn navigate(&self) {
        open_href(&self.href);
    }
}

/// Opens a menu item's target with the desktop handler. `#` and empty
/// targets are placeholders and do nothing.
pub fn open_href(href: &Href) {
    if href.is_empty() || href.as_str() == "#" {
        return;
    }
    match Command::new("xdg-open")
        .arg(href.as_str())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
    {
        Ok(_) => log::debug!("opening '{}'", href),
        Err(e) => log::error!("failed to open '{}': {}", href, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_instance() -> (Instance, async_channel::Receiver<InstanceCmd>) {
        let (tx, rx) = async_channel::unbounded();
        (Instance::new(tx, Arc::new(Config::default())), rx)
    }

    #[test]
    fn test_open_close_reach_the_component() {
        let (instance, rx) = test_instance();
        instance.open();
        instance.close();
        assert_eq!(rx.try_recv(), Ok(InstanceCmd::Open));
        assert_eq!(rx.try_recv(), Ok(InstanceCmd::Close));
    }

    #[test]
    fn test_double_destroy_sends_once() {
        let (instance, rx) = test_instance();
        instance.destroy();
        instance.destroy();
        assert_eq!(rx.try_recv(), Ok(InstanceCmd::Destroy));
        assert!(rx.try_recv().is_err());
        assert!(instance.is_destroyed());
    }

    #[test]
    fn test_destroyed_instance_ignores_commands() {
        let (instance, rx) = test_instance();
        instance.destroy();
        let _ = rx.try_recv();
        instance.open();
        instance.close();
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_item_context_commands() {
        let (tx, rx) = async_channel::unbounded();
        let context = ItemContext::new(Href::new("#"), tx);
        context.close_menu();
        context.hide();
        assert_eq!(rx.try_recv(), Ok(InstanceCmd::Close));
        assert_eq!(rx.try_recv(), Ok(InstanceCmd::Hide));
    }
}
