use std::process::{Command, Stdio};
use std::sync::Arc;

/// A side effect run once at widget creation.
pub trait Plugin: Send + Sync {
    fn name(&self) -> &str;
    fn apply(&self) -> anyhow::Result<()>;
}

pub type PluginHandle = Arc<dyn Plugin>;

/// Runs every plugin in configured order. Each plugin has its own error
/// boundary: a failure is logged and the remaining plugins still run.
pub fn apply_all(plugins: &[PluginHandle]) {
    for plugin in plugins {
        match plugin.apply() {
            Ok(()) => log::debug!("plugin '{}' applied", plugin.name()),
            Err(e) => log::error!("plugin '{}' failed: {e:#}", plugin.name()),
        }
    }
}

/// Spawns a detached command once at creation time.
pub struct CommandPlugin {
    name: String,
    command: String,
}

impl CommandPlugin {
    pub fn new(name: impl Into<String>, command: impl Into<String>) -> PluginHandle {
        Arc::new(Self {
            name: name.into(),
            command: command.into(),
        })
    }
}

impl Plugin for CommandPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self) -> anyhow::Result<()> {
        let words = shell_words::split(&self.command)?;
        let (program, args) = words
            .split_first()
            .ok_or_else(|| anyhow::anyhow!("empty command"))?;
        Command::new(program)
            .args(args)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        Ok(())
    }
}

/// Installs an extra stylesheet alongside the widget's own.
pub struct StylesheetPlugin {
    css: String,
}

impl StylesheetPlugin {
    pub fn new(css: impl Into<String>) -> PluginHandle {
        Arc::new(Self { css: css.into() })
    }
}

impl Plugin for StylesheetPlugin {
    fn name(&self) -> &str {
        "stylesheet"
    }

    fn apply(&self) -> anyhow::Result<()> {
        crate::gui::theme::apply_css(&self.css);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    struct Recording {
        label: &'static str,
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    impl Plugin for Recording {
        fn name(&self) -> &str {
            self.label
        }

        fn apply(&self) -> anyhow::Result<()> {
            self.log.lock().push(self.label);
            Ok(())
        }
    }

    struct Failing;

    impl Plugin for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn apply(&self) -> anyhow::Result<()> {
            anyhow::bail!("boom")
        }
    }

    #[test]
    fn test_plugins_run_in_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let plugins: Vec<PluginHandle> = vec![
            Arc::new(Recording { label: "first", log: log.clone() }),
            Arc::new(Recording { label: "second", log: log.clone() }),
        ];
        apply_all(&plugins);
        assert_eq!(*log.lock(), vec!["first", "second"]);
    }

    #[test]
    fn test_failing_plugin_does_not_block_the_rest() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let plugins: Vec<PluginHandle> = vec![
            Arc::new(Recording { label: "before", log: log.clone() }),
            Arc::new(Failing),
            Arc::new(Recording { label: "after", log: log.clone() }),
        ];
        apply_all(&plugins);
        assert_eq!(*log.lock(), vec!["before", "after"]);
    }

    #[test]
    fn test_command_plugin_rejects_empty_command() {
        let plugin = CommandPlugin::new("noop", "");
        assert!(plugin.apply().is_err());
    }
}
