pub mod coerce;
pub mod config;
pub mod events;
pub mod gui;
pub mod instance;
pub mod loader;
pub mod plugins;
pub mod runtime;
pub mod suppression;

pub use config::{Config, LoaderConfig};
pub use instance::{Instance, ItemContext};
pub use loader::Loader;
pub use plugins::{CommandPlugin, Plugin, StylesheetPlugin};
