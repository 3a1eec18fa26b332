use super::model::{self, ClickTarget, MenuState, Point};
use super::view::{self, BallAssets};
use crate::config::Config;
use crate::events::InstanceCmd;
use crate::gui::window;
use crate::instance::{Instance, ItemContext, open_href};
use crate::plugins;
use gtk::prelude::*;
use gtk4 as gtk;
use relm4::prelude::*;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;
use std::time::Instant;

/// Builds one independent widget window and hands back its caller-owned
/// handle. Call on the GTK main thread.
pub fn spawn(config: Config) -> (relm4::Controller<BallModel>, Instance) {
    let config = Arc::new(config);
    let (commands_tx, commands_rx) = async_channel::unbounded();
    let controller = BallModel::builder()
        .launch((config.clone(), commands_tx.clone(), commands_rx))
        .detach();
    (controller, Instance::new(commands_tx, config))
}

pub struct BallModel {
    config: Arc<Config>,
    state: Rc<RefCell<MenuState>>,
    /// Start of the current transition; every sample is relative to it.
    epoch: Rc<Cell<Instant>>,
    commands: async_channel::Sender<InstanceCmd>,
    root: gtk::Window,
    drawing_area: gtk::DrawingArea,
    destroyed: bool,
}

#[derive(Debug)]
pub enum BallMsg {
    Pressed(f64, f64),
    Command(InstanceCmd),
}

#[relm4::component(pub)]
impl SimpleComponent for BallModel {
    type Init = (
        Arc<Config>,
        async_channel::Sender<InstanceCmd>,
        async_channel::Receiver<InstanceCmd>,
    );
    type Input = BallMsg;
    type Output = ();

    view! {
        #[root]
        #[name = "window"]
        gtk::Window {
            set_title: Some("Floating ball"),
            set_decorated: false,
            add_css_class: "floating-ball-window",

            #[name = "drawing_area"]
            gtk::DrawingArea {
                set_hexpand: true,
                set_vexpand: true,
                add_css_class: "floating-ball-surface",

                add_controller = gtk::GestureClick {
                    connect_released[sender] => move |_, _, x, y| {
                        sender.input(BallMsg::Pressed(x, y));
                    }
                },
            }
        }
    }

    fn init(
        init: Self::Init,
        root: Self::Root,
        sender: ComponentSender<Self>,
    ) -> ComponentParts<Self> {
        let (config, commands, commands_rx) = init;

        window::init_layer_shell(&root, config.position);
        let extent = model::surface_extent(config.radius);
        root.set_default_size(extent, extent);

        let state = Rc::new(RefCell::new(MenuState::from_config(&config)));
        let epoch = Rc::new(Cell::new(Instant::now()));
        let assets = Rc::new(BallAssets::load(&config));

        let model = BallModel {
            config: config.clone(),
            state: state.clone(),
            epoch: epoch.clone(),
            commands,
            root: root.clone(),
            drawing_area: gtk::DrawingArea::default(),
            destroyed: false,
        };

        let widgets = view_output!();

        let mut model = model;
        model.drawing_area = widgets.drawing_area.clone();

        let position = config.position;
        widgets.drawing_area.set_draw_func(move |_, cr, width, height| {
            let center = model::rest_center(position, f64::from(width), f64::from(height));
            if let Err(e) = view::draw(cr, &state.borrow(), &assets, center, elapsed_ms(&epoch)) {
                log::error!("drawing error: {}", e);
            }
        });

        let bridge = sender.clone();
        relm4::spawn(async move {
            while let Ok(cmd) = commands_rx.recv().await {
                bridge.input(BallMsg::Command(cmd));
            }
        });

        // plugins run once, in order, after the surface is built
        plugins::apply_all(&model.config.plugins);

        root.set_visible(true);

        ComponentParts { model, widgets }
    }

    fn update(&mut self, msg: BallMsg, _sender: ComponentSender<Self>) {
        if self.destroyed {
            return;
        }
        match msg {
            BallMsg::Pressed(x, y) => self.handle_press(Point::new(x, y)),
            BallMsg::Command(InstanceCmd::Open) => self.set_open(true),
            BallMsg::Command(InstanceCmd::Close) => self.set_open(false),
            BallMsg::Command(InstanceCmd::Hide) => self.root.set_visible(false),
            BallMsg::Command(InstanceCmd::Destroy) => {
                self.destroyed = true;
                self.root.close();
            }
        }
    }
}

impl BallModel {
    fn elapsed(&self) -> u64 {
        elapsed_ms(&self.epoch)
    }

    fn set_open(&mut self, open: bool) {
        let elapsed = self.elapsed();
        {
            let mut state = self.state.borrow_mut();
            if state.is_open() == open {
                return;
            }
            state.set_open(open, elapsed);
        }
        self.epoch.set(Instant::now());
        self.animate();
    }

    fn toggle(&mut self) {
        let open = !self.state.borrow().is_open();
        self.set_open(open);
    }

    fn handle_press(&mut self, press: Point) {
        let center = model::rest_center(
            self.config.position,
            f64::from(self.drawing_area.width()),
            f64::from(self.drawing_area.height()),
        );
        let target = self.state.borrow().hit_test(press, center, self.elapsed());
        match target {
            ClickTarget::MainButton => self.toggle(),
            ClickTarget::Item(index) => self.activate(index),
            ClickTarget::Outside => {
                if self.state.borrow().is_open() {
                    self.set_open(false);
                }
            }
        }
    }

    /// Items with an action intercept default navigation; the rest follow
    /// their href.
    fn activate(&mut self, index: usize) {
        let Some(item) = self.config.menu_items.get(index) else {
            return;
        };
        match &item.action {
            Some(action) => {
                let context = ItemContext::new(item.href.clone(), self.commands.clone());
                action(&context);
            }
            None => open_href(&item.href),
        }
    }

    /// Redraws on the frame clock until the current transition settles.
    fn animate(&self) {
        let state = self.state.clone();
        let epoch = self.epoch.clone();
        self.drawing_area.add_tick_callback(move |area, _clock| {
            area.queue_draw();
            if state.borrow().settled(elapsed_ms(&epoch)) {
                glib::ControlFlow::Break
            } else {
                glib::ControlFlow::Continue
            }
        });
    }
}

fn elapsed_ms(epoch: &Cell<Instant>) -> u64 {
    epoch.get().elapsed().as_millis() as u64
}
