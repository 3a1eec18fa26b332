use super::{BALL_RADIUS, EDGE_INSET, ICON_ROTATION_DEGREES, ITEM_RADIUS, STAGGER_STEP_MS, SURFACE_PADDING};
use crate::config::{Config, Easing, ImageSize, MainButtonConfig, Position};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn translate(self, offset: Point) -> Self {
        Self::new(self.x + offset.x, self.y + offset.y)
    }
}

/// Polar offset of item `index` on the open fan, sign-corrected so the fan
/// always opens away from the anchored corner.
pub fn item_offset(index: usize, spacing_deg: f64, radius: f64, position: Position) -> Point {
    let angle = (index as f64 * spacing_deg).to_radians();
    let mut x = angle.cos() * radius;
    let mut y = angle.sin() * radius;
    if position.anchors_right() {
        x = -x;
    }
    if position.anchors_bottom() {
        y = -y;
    }
    Point::new(x, y)
}

/// Resting center of the ball inside a surface of the given size.
pub fn rest_center(position: Position, width: f64, height: f64) -> Point {
    let inset = EDGE_INSET + BALL_RADIUS;
    let x = if position.anchors_right() { width - inset } else { inset };
    let y = if position.anchors_bottom() { height - inset } else { inset };
    Point::new(x, y)
}

/// Square surface size that fits the ball plus the fully open fan.
pub fn surface_extent(radius: f64) -> i32 {
    (EDGE_INSET + BALL_RADIUS * 2.0 + radius + ITEM_RADIUS * 2.0 + SURFACE_PADDING).ceil() as i32
}

/// Stagger delay for item `index` out of `count`: opening fans out from the
/// first item, closing retracts the last-opened item first.
pub fn stagger_delay(index: usize, count: usize, opening: bool) -> u64 {
    let step = if opening { index } else { count - index - 1 };
    step as u64 * STAGGER_STEP_MS
}

/// A single eased scalar transition with a start delay.
#[derive(Debug, Clone, Copy)]
pub struct Tween {
    pub from: f64,
    pub to: f64,
    pub delay_ms: u64,
    pub duration_ms: u64,
    pub easing: Easing,
}

impl Tween {
    fn fixed(value: f64) -> Self {
        Self {
            from: value,
            to: value,
            delay_ms: 0,
            duration_ms: 0,
            easing: Easing::Linear,
        }
    }

    pub fn progress(&self, elapsed_ms: u64) -> f64 {
        if elapsed_ms < self.delay_ms {
            return 0.0;
        }
        if self.duration_ms == 0 {
            return 1.0;
        }
        let t = (elapsed_ms - self.delay_ms) as f64 / self.duration_ms as f64;
        self.easing.at(t.min(1.0))
    }

    pub fn sample(&self, elapsed_ms: u64) -> f64 {
        self.from + (self.to - self.from) * self.progress(elapsed_ms)
    }

    pub fn done(&self, elapsed_ms: u64) -> bool {
        elapsed_ms >= self.delay_ms + self.duration_ms
    }
}

/// One item's motion during the current transition: position plus fade,
/// sharing a delay and duration.
#[derive(Debug, Clone)]
pub struct ItemMotion {
    x: Tween,
    y: Tween,
    alpha: Tween,
}

impl ItemMotion {
    fn new(
        from: Point,
        to: Point,
        alpha_from: f64,
        alpha_to: f64,
        delay_ms: u64,
        duration_ms: u64,
        easing: Easing,
    ) -> Self {
        let tween = |from, to| Tween { from, to, delay_ms, duration_ms, easing };
        Self {
            x: tween(from.x, to.x),
            y: tween(from.y, to.y),
            alpha: tween(alpha_from, alpha_to),
        }
    }

    pub fn sample(&self, elapsed_ms: u64) -> Point {
        Point::new(self.x.sample(elapsed_ms), self.y.sample(elapsed_ms))
    }

    pub fn alpha(&self, elapsed_ms: u64) -> f64 {
        self.alpha.sample(elapsed_ms).clamp(0.0, 1.0)
    }

    pub fn done(&self, elapsed_ms: u64) -> bool {
        self.x.done(elapsed_ms)
    }
}

/// What a press inside the surface landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    MainButton,
    Item(usize),
    Outside,
}

/// Open/closed state machine plus the in-flight transition.
///
/// All sampling is keyed by milliseconds elapsed since the most recent
/// transition started; `set_open` begins a new epoch, so the caller resets
/// its clock alongside it.
pub struct MenuState {
    open: bool,
    targets: Vec<Point>,
    motions: Vec<ItemMotion>,
    icon: Tween,
    duration_ms: u64,
    easing: Easing,
}

impl MenuState {
    pub fn from_config(config: &Config) -> Self {
        let targets = (0..config.menu_items.len())
            .map(|i| item_offset(i, config.spacing, config.radius, config.position))
            .collect();
        Self {
            open: false,
            targets,
            motions: Vec::new(),
            icon: Tween::fixed(0.0),
            duration_ms: config.animation.duration,
            easing: config.animation.easing,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn item_count(&self) -> usize {
        self.targets.len()
    }

    /// Flips the flag immediately and retargets every item from wherever it
    /// currently is, so rapid toggling interrupts cleanly mid-flight.
    /// Starts a new timing epoch.
    pub fn set_open(&mut self, open: bool, elapsed_ms: u64) {
        if self.open == open {
            return;
        }
        let count = self.targets.len();
        let current: Vec<(Point, f64)> = (0..count)
            .map(|i| (self.item_position(i, elapsed_ms), self.item_alpha(i, elapsed_ms)))
            .collect();
        let icon_now = self.icon_angle(elapsed_ms);

        self.open = open;
        self.motions = current
            .into_iter()
            .enumerate()
            .map(|(i, (at, alpha))| {
                let (to, alpha_to) = if open {
                    (self.targets[i], 1.0)
                } else {
                    (Point::default(), 0.0)
                };
                ItemMotion::new(
                    at,
                    to,
                    alpha,
                    alpha_to,
                    stagger_delay(i, count, open),
                    self.duration_ms,
                    self.easing,
                )
            })
            .collect();
        self.icon = Tween {
            from: icon_now,
            to: if open { ICON_ROTATION_DEGREES } else { 0.0 },
            delay_ms: 0,
            duration_ms: self.duration_ms,
            easing: self.easing,
        };
    }

    pub fn toggle(&mut self, elapsed_ms: u64) -> bool {
        let next = !self.open;
        self.set_open(next, elapsed_ms);
        next
    }

    pub fn item_position(&self, index: usize, elapsed_ms: u64) -> Point {
        self.motions
            .get(index)
            .map(|m| m.sample(elapsed_ms))
            .unwrap_or_default()
    }

    pub fn item_alpha(&self, index: usize, elapsed_ms: u64) -> f64 {
        self.motions
            .get(index)
            .map(|m| m.alpha(elapsed_ms))
            .unwrap_or(0.0)
    }

    /// Main icon rotation in degrees.
    pub fn icon_angle(&self, elapsed_ms: u64) -> f64 {
        self.icon.sample(elapsed_ms)
    }

    pub fn settled(&self, elapsed_ms: u64) -> bool {
        self.icon.done(elapsed_ms) && self.motions.iter().all(|m| m.done(elapsed_ms))
    }

    /// Routes a press: the ball wins, then any open item, else outside.
    /// Items are only clickable while the menu is open.
    pub fn hit_test(&self, press: Point, center: Point, elapsed_ms: u64) -> ClickTarget {
        if press.distance(center) <= BALL_RADIUS {
            return ClickTarget::MainButton;
        }
        if self.open {
            for index in 0..self.targets.len() {
                let at = center.translate(self.item_position(index, elapsed_ms));
                if press.distance(at) <= ITEM_RADIUS {
                    return ClickTarget::Item(index);
                }
            }
        }
        ClickTarget::Outside
    }
}

/// The two ball faces are mutually exclusive: a configured background image
/// wins and leaves the icon slot empty.
#[derive(Debug, Clone, PartialEq)]
pub enum ButtonFace {
    Image { path: PathBuf, size: ImageSize },
    Solid { color: crate::config::Color, icon: crate::config::IconName },
}

impl ButtonFace {
    pub fn resolve(button: &MainButtonConfig) -> Self {
        match &button.background_image {
            Some(path) => Self::Image {
                path: path.clone(),
                size: button.image_size,
            },
            None => Self::Solid {
                color: button.background_color,
                icon: button.icon.clone(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IconName;
    use strum::IntoEnumIterator;

    const EPS: f64 = 1e-6;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < EPS, "{a} != {b}");
    }

    fn test_config(items: usize) -> Config {
        let mut config = Config::default();
        config.menu_items = (0..items)
            .map(|i| crate::config::MenuItemConfig {
                icon: IconName::new(format!("icon-{i}")),
                ..Default::default()
            })
            .collect();
        config
    }

    fn settle_time(count: usize) -> u64 {
        300 + (count as u64) * STAGGER_STEP_MS + 1
    }

    #[test]
    fn test_offset_worked_example() {
        // bottom-right, spacing 30deg, radius 90, index 2 => angle 60deg
        let offset = item_offset(2, 30.0, 90.0, Position::BottomRight);
        assert_close(offset.x, -45.0);
        assert_close(offset.y, -77.94228634059948);
    }

    #[test]
    fn test_offset_magnitude_equals_radius() {
        for position in Position::iter() {
            for index in 0..6 {
                let offset = item_offset(index, 30.0, 90.0, position);
                assert_close(offset.x.hypot(offset.y), 90.0);
            }
        }
    }

    #[test]
    fn test_offset_quadrant_per_corner() {
        for index in 0..4 {
            // spacing 30 keeps every angle within the first quadrant
            let br = item_offset(index, 30.0, 90.0, Position::BottomRight);
            assert!(br.x <= EPS && br.y <= EPS);
            let bl = item_offset(index, 30.0, 90.0, Position::BottomLeft);
            assert!(bl.x >= -EPS && bl.y <= EPS);
            let tr = item_offset(index, 30.0, 90.0, Position::TopRight);
            assert!(tr.x <= EPS && tr.y >= -EPS);
            let tl = item_offset(index, 30.0, 90.0, Position::TopLeft);
            assert!(tl.x >= -EPS && tl.y >= -EPS);
        }
    }

    #[test]
    fn test_rest_center_hugs_the_anchored_corner() {
        let inset = EDGE_INSET + BALL_RADIUS;
        let center = rest_center(Position::BottomRight, 200.0, 200.0);
        assert_eq!(center, Point::new(200.0 - inset, 200.0 - inset));
        let center = rest_center(Position::TopLeft, 200.0, 200.0);
        assert_eq!(center, Point::new(inset, inset));
        let center = rest_center(Position::TopRight, 200.0, 200.0);
        assert_eq!(center, Point::new(200.0 - inset, inset));
        let center = rest_center(Position::BottomLeft, 200.0, 200.0);
        assert_eq!(center, Point::new(inset, 200.0 - inset));
    }

    #[test]
    fn test_open_fan_stays_inside_the_surface() {
        let extent = f64::from(surface_extent(90.0));
        for position in Position::iter() {
            let center = rest_center(position, extent, extent);
            for index in 0..4 {
                let at = center.translate(item_offset(index, 30.0, 90.0, position));
                assert!(at.x - ITEM_RADIUS >= 0.0 && at.x + ITEM_RADIUS <= extent);
                assert!(at.y - ITEM_RADIUS >= 0.0 && at.y + ITEM_RADIUS <= extent);
            }
        }
    }

    #[test]
    fn test_stagger_forward_on_open_reversed_on_close() {
        let opening: Vec<u64> = (0..3).map(|i| stagger_delay(i, 3, true)).collect();
        assert_eq!(opening, vec![0, 50, 100]);
        let closing: Vec<u64> = (0..3).map(|i| stagger_delay(i, 3, false)).collect();
        assert_eq!(closing, vec![100, 50, 0]);
    }

    #[test]
    fn test_tween_respects_delay_and_duration() {
        let tween = Tween {
            from: 0.0,
            to: 10.0,
            delay_ms: 50,
            duration_ms: 100,
            easing: Easing::Linear,
        };
        assert_close(tween.sample(0), 0.0);
        assert_close(tween.sample(50), 0.0);
        assert_close(tween.sample(100), 5.0);
        assert_close(tween.sample(150), 10.0);
        assert_close(tween.sample(1000), 10.0);
        assert!(!tween.done(149));
        assert!(tween.done(150));
    }

    #[test]
    fn test_open_reaches_targets_then_close_returns_to_origin() {
        let config = test_config(3);
        let mut state = MenuState::from_config(&config);
        assert!(!state.is_open());
        assert!(state.settled(0));

        assert!(state.toggle(0));
        assert!(state.is_open());
        let done = settle_time(3);
        for index in 0..3 {
            let expected = item_offset(index, 30.0, 90.0, Position::BottomRight);
            let at = state.item_position(index, done);
            assert_close(at.x, expected.x);
            assert_close(at.y, expected.y);
            assert_close(state.item_alpha(index, done), 1.0);
        }
        assert_close(state.icon_angle(done), ICON_ROTATION_DEGREES);
        assert!(state.settled(done));

        // round trip: everything back at the origin, icon unrotated
        state.set_open(false, done);
        assert!(!state.is_open());
        let done = settle_time(3);
        for index in 0..3 {
            let at = state.item_position(index, done);
            assert_close(at.x, 0.0);
            assert_close(at.y, 0.0);
            assert_close(state.item_alpha(index, done), 0.0);
        }
        assert_close(state.icon_angle(done), 0.0);
        assert!(state.settled(done));
    }

    #[test]
    fn test_close_staggers_in_reverse_order() {
        let config = test_config(3);
        let mut state = MenuState::from_config(&config);
        state.set_open(true, 0);
        state.set_open(false, settle_time(3));

        // shortly into the close, the last item has moved but the first
        // (delay 100ms) has not
        let last = state.item_position(2, 60);
        let first = state.item_position(0, 60);
        let target_first = item_offset(0, 30.0, 90.0, Position::BottomRight);
        let target_last = item_offset(2, 30.0, 90.0, Position::BottomRight);
        assert!(last.distance(target_last) > EPS);
        assert!(first.distance(target_first) < EPS);
    }

    #[test]
    fn test_interrupted_transition_retargets_from_current_position() {
        let config = test_config(3);
        let mut state = MenuState::from_config(&config);
        state.set_open(true, 0);

        let mid = state.item_position(0, 150);
        assert!(mid.distance(Point::default()) > EPS);

        // flag flips immediately, motion continues from where it was
        state.set_open(false, 150);
        assert!(!state.is_open());
        let restart = state.item_position(0, 0);
        assert_close(restart.x, mid.x);
        assert_close(restart.y, mid.y);
    }

    #[test]
    fn test_set_open_is_idempotent_per_state() {
        let config = test_config(2);
        let mut state = MenuState::from_config(&config);
        state.set_open(true, 0);
        let at = state.item_position(1, 40);
        state.set_open(true, 40);
        // no retarget happened: the motion is unchanged
        let again = state.item_position(1, 40);
        assert_close(at.x, again.x);
        assert_close(at.y, again.y);
    }

    #[test]
    fn test_hit_test_routes_presses() {
        let config = test_config(3);
        let mut state = MenuState::from_config(&config);
        let center = Point::new(150.0, 150.0);

        assert_eq!(state.hit_test(center, center, 0), ClickTarget::MainButton);

        let item_at = center.translate(item_offset(1, 30.0, 90.0, Position::BottomRight));
        // closed menu: items are not clickable
        assert_eq!(state.hit_test(item_at, center, 0), ClickTarget::Outside);

        state.set_open(true, 0);
        let done = settle_time(3);
        assert_eq!(state.hit_test(item_at, center, done), ClickTarget::Item(1));
        assert_eq!(
            state.hit_test(Point::new(5.0, 5.0), center, done),
            ClickTarget::Outside
        );
    }

    #[test]
    fn test_empty_menu_is_always_settled() {
        let config = test_config(0);
        let mut state = MenuState::from_config(&config);
        state.set_open(true, 0);
        assert!(state.is_open());
        assert!(state.settled(0));
        assert_eq!(state.item_count(), 0);
    }

    #[test]
    fn test_button_face_is_mutually_exclusive() {
        let solid = ButtonFace::resolve(&MainButtonConfig::default());
        assert!(matches!(solid, ButtonFace::Solid { .. }));

        let mut with_image = MainButtonConfig::default();
        with_image.background_image = Some(PathBuf::from("/tmp/ball.png"));
        with_image.image_size = ImageSize::Contain;
        match ButtonFace::resolve(&with_image) {
            ButtonFace::Image { path, size } => {
                assert_eq!(path, PathBuf::from("/tmp/ball.png"));
                assert_eq!(size, ImageSize::Contain);
            }
            ButtonFace::Solid { .. } => panic!("image face must win over the solid face"),
        }
    }
}
