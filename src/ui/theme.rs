use egui::{Color32, FontFamily, FontId, Rounding, Stroke, Style, TextStyle, Visuals};

pub const ACCENT: Color32 = Color32::from_rgb(19, 152, 244);
pub const DANGER: Color32 = Color32::from_rgb(0xef, 0x44, 0x44);

/// Font family for filled Phosphor icons
pub fn phosphor_fill_family() -> FontFamily {
    FontFamily::Name("phosphor-fill".into())
}

pub fn setup_fonts(ctx: &egui::Context) {
    let mut fonts = egui::FontDefinitions::default();

    // Phosphor Regular icons as fallback in the Proportional family
    egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);

    // Phosphor Fill as its own family for the tab bar
    fonts.font_data.insert(
        "phosphor-fill".into(),
        egui_phosphor::Variant::Fill.font_data(),
    );
    fonts.families.insert(
        phosphor_fill_family(),
        vec!["phosphor-fill".into()],
    );

    ctx.set_fonts(fonts);
}

pub fn setup_theme(ctx: &egui::Context) {
    let mut style = Style::default();

    // Dark visuals, gray-950 background
    let mut visuals = Visuals::dark();

    let bg = Color32::from_rgb(3, 7, 18);
    visuals.panel_fill = bg;
    visuals.window_fill = Color32::from_rgb(17, 24, 39);
    visuals.faint_bg_color = Color32::from_rgb(17, 24, 39);
    visuals.extreme_bg_color = bg;

    visuals.widgets.noninteractive.bg_fill = Color32::from_rgb(31, 41, 55);
    visuals.widgets.noninteractive.fg_stroke = Stroke::new(1.0, Color32::from_rgb(156, 163, 175));

    visuals.widgets.inactive.bg_fill = Color32::from_rgb(55, 65, 81);
    visuals.widgets.inactive.fg_stroke = Stroke::new(1.0, Color32::from_rgb(229, 231, 235));

    visuals.widgets.hovered.bg_fill = Color32::from_rgb(75, 85, 99);
    visuals.widgets.hovered.fg_stroke = Stroke::new(1.0, Color32::WHITE);

    visuals.widgets.active.bg_fill = ACCENT;
    visuals.widgets.active.fg_stroke = Stroke::new(1.0, Color32::WHITE);

    visuals.selection.bg_fill = ACCENT;
    visuals.selection.stroke = Stroke::new(1.0, Color32::WHITE);
    visuals.hyperlink_color = ACCENT;

    visuals.widgets.noninteractive.rounding = Rounding::same(6.0);
    visuals.widgets.inactive.rounding = Rounding::same(6.0);
    visuals.widgets.hovered.rounding = Rounding::same(6.0);
    visuals.widgets.active.rounding = Rounding::same(6.0);
    visuals.window_rounding = Rounding::same(8.0);

    style.visuals = visuals;

    style.text_styles = [
        (TextStyle::Small, FontId::new(12.0, FontFamily::Proportional)),
        (TextStyle::Body, FontId::new(15.0, FontFamily::Proportional)),
        (TextStyle::Button, FontId::new(15.0, FontFamily::Proportional)),
        (TextStyle::Heading, FontId::new(20.0, FontFamily::Proportional)),
        (TextStyle::Monospace, FontId::new(14.0, FontFamily::Monospace)),
    ]
    .into();

    style.spacing.item_spacing = egui::vec2(10.0, 8.0);
    style.spacing.button_padding = egui::vec2(14.0, 8.0);
    style.spacing.window_margin = egui::Margin::same(16.0);

    ctx.set_style(style);
}

/// Returns (line_color, label_color) for the hour grid
pub fn grid_colors() -> (Color32, Color32) {
    (
        Color32::from_rgb(31, 41, 55),     // gray-800
        Color32::from_rgb(156, 163, 175),  // gray-400
    )
}

/// Returns (fill, text, secondary_text) for event blocks
pub fn event_colors() -> (Color32, Color32, Color32) {
    (
        Color32::from_rgb(37, 99, 235),    // blue-600
        Color32::WHITE,
        Color32::from_rgb(229, 231, 235),  // gray-200
    )
}

/// Returns (content_bg, border, text, muted_text) for the light modal card
pub fn dialog_colors() -> (Color32, Color32, Color32, Color32) {
    (
        Color32::WHITE,
        Color32::from_rgb(229, 231, 235),  // gray-200
        Color32::from_rgb(17, 24, 39),     // gray-900
        Color32::from_rgb(107, 114, 128),  // gray-500
    )
}

/// Returns (selected, unselected) for tab bar icons and labels
pub fn tab_colors() -> (Color32, Color32) {
    (ACCENT, Color32::from_rgb(107, 114, 128))
}
