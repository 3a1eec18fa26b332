use crate::coerce::JsonMap;
use crate::instance::ItemAction;
use crate::plugins::PluginHandle;
use derive_more::{AsRef, Deref, Display, From, Into};
use directories::ProjectDirs;
use palette::Srgba;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_with::DeserializeFromStr;
use std::path::PathBuf;
use std::str::FromStr;
use strum::{Display as StrumDisplay, EnumIter, EnumString};
use thiserror::Error;

/// Screen corner the ball is anchored to. The radial fan always opens into
/// the quadrant away from the anchored edges.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    DeserializeFromStr,
    EnumString,
    EnumIter,
    StrumDisplay,
)]
#[strum(ascii_case_insensitive)]
pub enum Position {
    #[default]
    #[strum(serialize = "bottom-right", serialize = "br")]
    BottomRight,
    #[strum(serialize = "bottom-left", serialize = "bl")]
    BottomLeft,
    #[strum(serialize = "top-right", serialize = "tr")]
    TopRight,
    #[strum(serialize = "top-left", serialize = "tl")]
    TopLeft,
}

impl Position {
    pub fn anchors_right(&self) -> bool {
        matches!(self, Self::BottomRight | Self::TopRight)
    }

    pub fn anchors_bottom(&self) -> bool {
        matches!(self, Self::BottomRight | Self::BottomLeft)
    }
}

/// Scaling mode for an image-backed main button, CSS `background-size`
/// style.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, DeserializeFromStr, EnumString, StrumDisplay,
)]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
pub enum ImageSize {
    #[default]
    Cover,
    Contain,
    Auto,
}

/// Named easing curves accepted by the animation configuration.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, DeserializeFromStr, EnumString, StrumDisplay,
)]
#[strum(ascii_case_insensitive)]
pub enum Easing {
    #[strum(serialize = "linear")]
    Linear,
    #[default]
    #[strum(serialize = "ease")]
    Ease,
    #[strum(serialize = "ease-in")]
    EaseIn,
    #[strum(serialize = "ease-out")]
    EaseOut,
    #[strum(serialize = "ease-in-out")]
    EaseInOut,
}

impl Easing {
    /// Maps linear time `t` in [0, 1] onto the curve.
    pub fn at(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::Ease => t * t * (3.0 - 2.0 * t),
            Self::EaseIn => t * t,
            Self::EaseOut => t * (2.0 - t),
            Self::EaseInOut => t * t * t * (t * (6.0 * t - 15.0) + 10.0),
        }
    }
}

#[derive(Debug, Error)]
#[error("unrecognized color `{0}`, expected hex like `#165DFF`")]
pub struct ColorParseError(String);

/// An sRGB color parsed from a hex string.
#[derive(Debug, Clone, Copy, PartialEq, DeserializeFromStr)]
pub struct Color(pub Srgba<f64>);

impl Color {
    pub fn rgb8(r: u8, g: u8, b: u8) -> Self {
        Self(Srgba::new(
            f64::from(r) / 255.0,
            f64::from(g) / 255.0,
            f64::from(b) / 255.0,
            1.0,
        ))
    }

    pub fn components(&self) -> (f64, f64, f64, f64) {
        self.0.into_components()
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parsed: palette::Srgb<u8> = s
            .trim_start_matches('#')
            .parse()
            .map_err(|_| ColorParseError(s.to_string()))?;
        let rgb = parsed.into_format::<f64>();
        Ok(Self(Srgba::new(rgb.red, rgb.green, rgb.blue, 1.0)))
    }
}

#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct IconName(String);

impl IconName {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }
}

/// A menu item's link target: a URL, a path, or the `#` placeholder.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct Href(String);

impl Href {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }
}

fn accent() -> Color {
    Color::rgb8(0x16, 0x5D, 0xFF)
}

fn white() -> Color {
    Color::rgb8(0xFF, 0xFF, 0xFF)
}

/// Main toggle button appearance. A configured `background_image` renders an
/// image-backed ball and leaves the icon slot empty; otherwise the ball is a
/// solid color with the icon glyph.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MainButtonConfig {
    pub icon: IconName,
    pub background_color: Color,
    pub text_color: Color,
    pub background_image: Option<PathBuf>,
    pub image_size: ImageSize,
}

impl Default for MainButtonConfig {
    fn default() -> Self {
        Self {
            icon: IconName::new("list-add"),
            background_color: accent(),
            text_color: white(),
            background_image: None,
            image_size: ImageSize::Cover,
        }
    }
}

/// One radial menu entry. Items keep insertion order; order decides both
/// stacking and the per-item animation stagger.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct MenuItemConfig {
    pub icon: IconName,
    pub text: String,
    pub href: Href,
    pub background_color: Color,
    pub text_color: Color,
    /// Invoked instead of default navigation. Not part of the serialized
    /// surface; attach programmatically.
    #[serde(skip)]
    pub action: Option<ItemAction>,
}

impl Default for MenuItemConfig {
    fn default() -> Self {
        Self {
            icon: IconName::new(""),
            text: String::new(),
            href: Href::new("#"),
            background_color: accent(),
            text_color: white(),
            action: None,
        }
    }
}

impl std::fmt::Debug for MenuItemConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MenuItemConfig")
            .field("icon", &self.icon)
            .field("text", &self.text)
            .field("href", &self.href)
            .field("background_color", &self.background_color)
            .field("text_color", &self.text_color)
            .field("action", &self.action.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Transition duration in milliseconds.
    pub duration: u64,
    pub easing: Easing,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            duration: 300,
            easing: Easing::Ease,
        }
    }
}

/// Widget configuration.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub position: Position,
    /// Angle between adjacent menu items, in degrees.
    pub spacing: f64,
    /// Distance from the ball to each open menu item, in pixels.
    pub radius: f64,
    pub main_button: MainButtonConfig,
    pub menu_items: Vec<MenuItemConfig>,
    pub animation: AnimationConfig,
    /// Applied once, in order, after the widget surface is built.
    #[serde(skip)]
    pub plugins: Vec<PluginHandle>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("position", &self.position)
            .field("spacing", &self.spacing)
            .field("radius", &self.radius)
            .field("main_button", &self.main_button)
            .field("menu_items", &self.menu_items)
            .field("animation", &self.animation)
            .field("plugins", &self.plugins.len())
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            position: Position::default(),
            spacing: 30.0,
            radius: 90.0,
            main_button: MainButtonConfig::default(),
            menu_items: default_menu_items(),
            animation: AnimationConfig::default(),
            plugins: Vec::new(),
        }
    }
}

fn default_menu_items() -> Vec<MenuItemConfig> {
    vec![
        MenuItemConfig {
            icon: IconName::new("go-top"),
            text: "Back to top".to_string(),
            action: Some(std::sync::Arc::new(|ctx: &crate::instance::ItemContext| {
                ctx.close_menu();
            })),
            ..MenuItemConfig::default()
        },
        MenuItemConfig {
            icon: IconName::new("go-home"),
            text: "Home".to_string(),
            href: Href::new("/"),
            ..MenuItemConfig::default()
        },
        MenuItemConfig {
            icon: IconName::new("window-close"),
            text: "Hide".to_string(),
            action: Some(std::sync::Arc::new(|ctx: &crate::instance::ItemContext| {
                ctx.hide();
            })),
            ..MenuItemConfig::default()
        },
    ]
}

impl Config {
    /// Shallow merge: every top-level key present in `overrides` fully
    /// replaces the default, including nested records such as `main_button`.
    /// Loader-level and unknown keys are ignored.
    pub fn merged_with(mut self, overrides: &JsonMap) -> Result<Self, ConfigError> {
        for (key, value) in overrides {
            match key.as_str() {
                "position" => self.position = field("position", value)?,
                "spacing" => self.spacing = field("spacing", value)?,
                "radius" => self.radius = field("radius", value)?,
                "main_button" => self.main_button = field("main_button", value)?,
                "menu_items" => self.menu_items = field("menu_items", value)?,
                "animation" => self.animation = field("animation", value)?,
                _ => {}
            }
        }
        Ok(self)
    }
}

fn field<T: serde::de::DeserializeOwned>(
    key: &'static str,
    value: &Value,
) -> Result<T, ConfigError> {
    serde_json::from_value(value.clone()).map_err(|source| ConfigError::InvalidValue { key, source })
}

/// Loader-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    pub load_icons: bool,
    pub load_styles: bool,
    pub load_core: bool,
    pub auto_init: bool,
    pub style_path: String,
    pub icon_theme_path: String,
    /// How long to wait for the widget core entry point, in milliseconds.
    pub init_timeout: u64,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            load_icons: true,
            load_styles: true,
            load_core: true,
            auto_init: true,
            style_path: "assets/floating-ball.css".to_string(),
            icon_theme_path: "/usr/share/icons/hicolor".to_string(),
            init_timeout: 5000,
        }
    }
}

impl LoaderConfig {
    pub fn defaults_value() -> JsonMap {
        match serde_json::to_value(Self::default()) {
            Ok(Value::Object(map)) => map,
            _ => JsonMap::new(),
        }
    }

    pub fn from_map(map: &JsonMap) -> Result<Self, ConfigError> {
        serde_json::from_value(Value::Object(map.clone()))
            .map_err(|source| ConfigError::InvalidValue { key: "loader", source })
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to determine config directory")]
    ConfigDirNotFound,
    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("invalid value for `{key}`: {source}")]
    InvalidValue {
        key: &'static str,
        source: serde_json::Error,
    },
}

pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    let proj_dirs = ProjectDirs::from("org", "floatingball", "floating-ball")
        .ok_or(ConfigError::ConfigDirNotFound)?;
    Ok(proj_dirs.config_dir().join("config.toml"))
}

/// Writes a starter configuration file if none exists; returns its path.
pub fn write_default_config() -> std::io::Result<PathBuf> {
    let path =
        config_file_path().map_err(|e| std::io::Error::new(std::io::ErrorKind::NotFound, e))?;
    if let Some(parent) = path.parent() {
        fs_err::create_dir_all(parent)?;
    }
    if !path.exists() {
        fs_err::write(&path, DEFAULT_CONFIG)?;
    }
    Ok(path)
}

const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

/// User configuration file as a raw value map, merged over the loader's
/// configuration right before widget creation.
pub fn load_user_overrides() -> Result<JsonMap, ConfigError> {
    let config_path = config_file_path()?;

    let s = config::Config::builder()
        .add_source(config::File::from(config_path).required(false))
        .build()?;

    let value: Value = s.try_deserialize()?;
    Ok(value.as_object().cloned().unwrap_or_default())
}
