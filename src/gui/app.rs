use crate::config::{Config, ConfigError};
use crate::gui::{self, icons, theme};
use crate::instance::Instance;
use crate::loader::registry::{CreateRequest, Registry};
use crate::loader::resources::Resource;
use gtk::prelude::*;
use gtk4 as gtk;
use relm4::prelude::*;
use std::sync::Arc;

/// Widget core host. Registers the creation entry point on startup and owns
/// every spawned ball window.
pub struct HostModel {
    balls: Vec<relm4::Controller<gui::ball::BallModel>>,
}

#[derive(Debug)]
pub enum HostMsg {
    Create(CreateRequest),
}

#[relm4::component(pub)]
impl SimpleComponent for HostModel {
    type Init = Arc<Registry>;
    type Input = HostMsg;
    type Output = ();

    view! {
        #[root]
        gtk::ApplicationWindow {
            set_title: Some("Floating ball host"),
            set_decorated: false,
            set_visible: false,
        }
    }

    fn init(
        registry: Self::Init,
        root: Self::Root,
        sender: ComponentSender<Self>,
    ) -> ComponentParts<Self> {
        theme::apply_css(theme::BASE_CSS);

        // announcing the entry point is what ends the loader's readiness wait
        let (entry_tx, entry_rx) = async_channel::unbounded();
        registry.install(entry_tx);

        let bridge = sender.clone();
        relm4::spawn(async move {
            while let Ok(request) = entry_rx.recv().await {
                bridge.input(HostMsg::Create(request));
            }
        });

        let model = HostModel { balls: Vec::new() };
        let widgets = view_output!();
        root.set_visible(false);

        ComponentParts { model, widgets }
    }

    fn update(&mut self, msg: HostMsg, _sender: ComponentSender<Self>) {
        match msg {
            HostMsg::Create(CreateRequest { config, resources, reply }) => {
                for resource in &resources {
                    apply_resource(resource);
                }
                let outcome = self.create(&config);
                if reply.send(outcome).is_err() {
                    log::warn!("widget created but the loader went away");
                }
            }
        }
    }
}

impl HostModel {
    fn create(&mut self, overrides: &crate::coerce::JsonMap) -> Result<Option<Instance>, ConfigError> {
        let config = Config::default().merged_with(overrides)?;
        Ok(gui::create(config).map(|(controller, instance)| {
            self.balls.push(controller);
            instance
        }))
    }
}

fn apply_resource(resource: &Resource) {
    match resource {
        Resource::Stylesheet { css } => theme::apply_css(css),
        Resource::IconTheme { name } => icons::set_theme(name.clone()),
    }
}
