pub mod component;
pub mod model;
pub mod view;

pub use component::{BallModel, spawn};
pub use model::{ButtonFace, ClickTarget, MenuState, Point};

pub const BALL_RADIUS: f64 = 28.0;
pub const ITEM_RADIUS: f64 = 20.0; // badge circle size
pub const EDGE_INSET: f64 = 24.0; // gap between ball and screen corner
pub const SURFACE_PADDING: f64 = 12.0;
pub const ICON_SIZE: i32 = 64;
pub const ICON_ROTATION_DEGREES: f64 = 45.0;
pub const STAGGER_STEP_MS: u64 = 50; // per-item show/hide delay
