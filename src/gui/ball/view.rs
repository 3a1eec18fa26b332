use super::model::{ButtonFace, MenuState, Point};
use super::{BALL_RADIUS, ICON_SIZE, ITEM_RADIUS};
use crate::config::{Color, Config, IconName, ImageSize, MenuItemConfig};
use crate::gui::icons;
use cairo::Context;
use gdk4::prelude::*;
use gdk_pixbuf::Pixbuf;
use std::f64::consts::PI;

/// Pixbufs and colors resolved once at creation time.
pub struct BallAssets {
    pub face: FaceAsset,
    pub badges: Vec<ItemBadge>,
}

pub enum FaceAsset {
    /// Image-backed ball; the icon slot stays empty.
    Image { pixbuf: Option<Pixbuf>, size: ImageSize },
    Solid { color: Color, icon: Option<Pixbuf> },
}

pub struct ItemBadge {
    pub pixbuf: Option<Pixbuf>,
    pub background: Color,
    pub foreground: Color,
    pub label: String,
}

impl BallAssets {
    pub fn load(config: &Config) -> Self {
        let face = match ButtonFace::resolve(&config.main_button) {
            ButtonFace::Image { path, size } => {
                let pixbuf = Pixbuf::from_file(&path)
                    .map_err(|e| log::warn!("background image '{}' unusable: {}", path.display(), e))
                    .ok();
                FaceAsset::Image { pixbuf, size }
            }
            ButtonFace::Solid { color, icon } => FaceAsset::Solid {
                color,
                icon: load_icon(&icon),
            },
        };
        let badges = config.menu_items.iter().map(ItemBadge::new).collect();
        Self { face, badges }
    }
}

impl ItemBadge {
    fn new(item: &MenuItemConfig) -> Self {
        Self {
            pixbuf: load_icon(&item.icon),
            background: item.background_color,
            foreground: item.text_color,
            label: item.text.clone(),
        }
    }
}

fn load_icon(icon: &IconName) -> Option<Pixbuf> {
    icons::find_icon_path(icon)
        .and_then(|path| Pixbuf::from_file_at_scale(&path, ICON_SIZE, ICON_SIZE, true).ok())
}

/// Paints the whole surface: badges first so the closed fan tucks under the
/// ball, then the ball on top.
pub fn draw(
    cr: &Context,
    state: &MenuState,
    assets: &BallAssets,
    center: Point,
    elapsed_ms: u64,
) -> Result<(), cairo::Error> {
    for (index, badge) in assets.badges.iter().enumerate() {
        let alpha = state.item_alpha(index, elapsed_ms);
        if alpha <= f64::EPSILON {
            continue;
        }
        let at = center.translate(state.item_position(index, elapsed_ms));
        BadgeRenderer::new(badge, at, alpha).draw(cr)?;
    }
    draw_ball(cr, &assets.face, center, state.icon_angle(elapsed_ms))
}

struct BadgeRenderer<'a> {
    badge: &'a ItemBadge,
    at: Point,
    alpha: f64,
}

impl<'a> BadgeRenderer<'a> {
    fn new(badge: &'a ItemBadge, at: Point, alpha: f64) -> Self {
        Self { badge, at, alpha }
    }

    fn draw(&self, cr: &Context) -> Result<(), cairo::Error> {
        self.draw_circle(cr)?;
        self.draw_content(cr)
    }

    fn draw_circle(&self, cr: &Context) -> Result<(), cairo::Error> {
        let (r, g, b, a) = self.badge.background.components();
        cr.set_source_rgba(r, g, b, a * self.alpha);
        cr.arc(self.at.x, self.at.y, ITEM_RADIUS, 0.0, 2.0 * PI);
        cr.fill()
    }

    fn draw_content(&self, cr: &Context) -> Result<(), cairo::Error> {
        if let Some(pixbuf) = &self.badge.pixbuf {
            self.draw_icon(cr, pixbuf)
        } else if !self.badge.label.is_empty() {
            self.draw_text(cr, &self.badge.label)
        } else {
            Ok(())
        }
    }

    fn draw_icon(&self, cr: &Context, pixbuf: &Pixbuf) -> Result<(), cairo::Error> {
        // fit icon into the badge
        let icon_scale = (ITEM_RADIUS * 2.0 * 0.75) / f64::from(ICON_SIZE);
        let (iw, ih) = (
            f64::from(pixbuf.width()) * icon_scale,
            f64::from(pixbuf.height()) * icon_scale,
        );
        let (ix, iy) = (self.at.x - iw / 2.0, self.at.y - ih / 2.0);

        cr.save()?;
        cr.translate(ix, iy);
        cr.scale(icon_scale, icon_scale);
        if self.alpha < 1.0 {
            cr.push_group();
            cr.set_source_pixbuf(pixbuf, 0.0, 0.0);
            cr.paint()?;
            cr.pop_group_to_source()?;
            cr.paint_with_alpha(self.alpha)?;
        } else {
            cr.set_source_pixbuf(pixbuf, 0.0, 0.0);
            cr.paint()?;
        }
        cr.restore()
    }

    fn draw_text(&self, cr: &Context, text: &str) -> Result<(), cairo::Error> {
        let (r, g, b, a) = self.badge.foreground.components();
        cr.set_source_rgba(r, g, b, a * self.alpha);
        cr.select_font_face("Sans", cairo::FontSlant::Normal, cairo::FontWeight::Bold);
        cr.set_font_size(11.0);
        if let Ok(ext) = cr.text_extents(text) {
            cr.move_to(
                self.at.x - ext.width() / 2.0,
                self.at.y + ext.height() / 2.0,
            );
            cr.show_text(text)?;
        }
        Ok(())
    }
}

fn draw_ball(
    cr: &Context,
    face: &FaceAsset,
    center: Point,
    icon_angle_deg: f64,
) -> Result<(), cairo::Error> {
    match face {
        FaceAsset::Solid { color, icon } => {
            let (r, g, b, a) = color.components();
            cr.set_source_rgba(r, g, b, a);
            cr.arc(center.x, center.y, BALL_RADIUS, 0.0, 2.0 * PI);
            cr.fill()?;

            if let Some(pixbuf) = icon {
                let icon_scale = (BALL_RADIUS * 2.0 * 0.6) / f64::from(ICON_SIZE);
                let (iw, ih) = (f64::from(pixbuf.width()), f64::from(pixbuf.height()));
                cr.save()?;
                cr.translate(center.x, center.y);
                cr.rotate(icon_angle_deg.to_radians());
                cr.scale(icon_scale, icon_scale);
                cr.set_source_pixbuf(pixbuf, -iw / 2.0, -ih / 2.0);
                cr.paint()?;
                cr.restore()?;
            }
            Ok(())
        }
        FaceAsset::Image { pixbuf: Some(pixbuf), size } => {
            cr.save()?;
            cr.arc(center.x, center.y, BALL_RADIUS, 0.0, 2.0 * PI);
            cr.clip();

            let (iw, ih) = (f64::from(pixbuf.width()), f64::from(pixbuf.height()));
            let diameter = BALL_RADIUS * 2.0;
            let scale = match size {
                ImageSize::Cover => (diameter / iw).max(diameter / ih),
                ImageSize::Contain => (diameter / iw).min(diameter / ih),
                ImageSize::Auto => 1.0,
            };
            cr.translate(center.x, center.y);
            cr.scale(scale, scale);
            cr.set_source_pixbuf(pixbuf, -iw / 2.0, -ih / 2.0);
            cr.paint()?;
            cr.restore()
        }
        FaceAsset::Image { pixbuf: None, .. } => {
            // unusable image: neutral disc so the widget stays visible
            cr.set_source_rgba(0.5, 0.5, 0.5, 0.8);
            cr.arc(center.x, center.y, BALL_RADIUS, 0.0, 2.0 * PI);
            cr.fill()
        }
    }
}
