use crate::config::Position;
use gtk4 as gtk;
use gtk4_layer_shell::{Edge, Layer, LayerShell};

/// Puts the window on the overlay layer, anchored to the two edges of its
/// configured corner so the surface hugs it at any monitor size.
pub fn init_layer_shell(window: &gtk::Window, position: Position) {
    window.init_layer_shell();
    window.set_layer(Layer::Overlay);
    window.set_namespace(Some("floating-ball"));
    for edge in corner_edges(position) {
        window.set_anchor(edge, true);
    }
}

fn corner_edges(position: Position) -> [Edge; 2] {
    let horizontal = if position.anchors_right() { Edge::Right } else { Edge::Left };
    let vertical = if position.anchors_bottom() { Edge::Bottom } else { Edge::Top };
    [horizontal, vertical]
}
