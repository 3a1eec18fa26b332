use gtk::gdk;
use gtk::prelude::*;
use gtk4 as gtk;

/// Baseline classes keeping the overlay transparent even when the staged
/// stylesheet is skipped via `load_styles = false`.
pub const BASE_CSS: &str = "
.floating-ball-window, .floating-ball-surface {
    background: none;
    background-color: transparent;
}
";

/// Installs a stylesheet for the whole display. Every call adds a provider;
/// later providers win on conflicts.
pub fn apply_css(css: &str) {
    let provider = gtk::CssProvider::new();
    provider.load_from_data(css);

    if let Some(display) = gdk::Display::default() {
        gtk::style_context_add_provider_for_display(
            &display,
            &provider,
            gtk::STYLE_PROVIDER_PRIORITY_APPLICATION,
        );
    } else {
        log::warn!("no display available, stylesheet not installed");
    }
}
