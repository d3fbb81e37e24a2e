//! Text styling: the per-canvas style panel and the edit context.

use crate::canvas::CanvasId;
use crate::element::{ElementId, SerializableColor, TextStyle};
use serde::{Deserialize, Serialize};

/// Smallest font size a style change may set.
const MIN_FONT_SIZE: f64 = 1.0;

/// A single edit issued from the style panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StyleChange {
    FontFamily(String),
    FontSize(f64),
    TextColor(SerializableColor),
    /// Highlight behind the glyphs; keeps the current opacity.
    TextBackground(SerializableColor),
    ElementBackground(SerializableColor),
    /// Opacity of the text background, 0..=100.
    BackgroundOpacity(u8),
    ToggleBold,
}

impl TextStyle {
    /// Apply one style change in place.
    pub fn apply(&mut self, change: &StyleChange) {
        match change {
            StyleChange::FontFamily(family) => self.font_family = family.clone(),
            StyleChange::FontSize(size) => self.font_size = size.max(MIN_FONT_SIZE),
            StyleChange::TextColor(color) => self.color = *color,
            StyleChange::TextBackground(color) => {
                let percent = if self.background.a == 0 {
                    100
                } else {
                    self.background.opacity_percent()
                };
                self.background = color.with_opacity_percent(percent);
            }
            StyleChange::ElementBackground(color) => self.element_background = *color,
            StyleChange::BackgroundOpacity(percent) => {
                self.background = self.background.with_opacity_percent(*percent);
            }
            StyleChange::ToggleBold => self.bold = !self.bold,
        }
    }
}

/// The controls a canvas shows for its active text element.
///
/// Colours are kept the way a colour input holds them: `#rrggbb`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StylePanel {
    pub visible: bool,
    pub font_family: String,
    pub font_size: f64,
    pub text_color: String,
    pub text_background: String,
    pub element_background: String,
    pub opacity: u8,
}

impl Default for StylePanel {
    fn default() -> Self {
        Self::from_style(&TextStyle::default(), false)
    }
}

impl StylePanel {
    fn from_style(style: &TextStyle, visible: bool) -> Self {
        Self {
            visible,
            font_family: style.font_family.clone(),
            font_size: style.font_size,
            text_color: style.color.to_hex(),
            text_background: style.background.to_hex(),
            element_background: style.element_background.to_hex(),
            opacity: style.background.opacity_percent(),
        }
    }

    /// Show the panel mirroring `style`.
    pub fn populate_from(&mut self, style: &TextStyle) {
        *self = Self::from_style(style, true);
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }
}

/// An element bound to the style panel, addressed by its canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActiveText {
    pub canvas: CanvasId,
    pub element: ElementId,
}

/// Workspace-wide editing focus.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditContext {
    pub active_canvas: Option<CanvasId>,
    pub active_text: Option<ActiveText>,
}

impl EditContext {
    /// Whether `element` is the active text element.
    pub fn is_active_text(&self, element: ElementId) -> bool {
        self.active_text.is_some_and(|active| active.element == element)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panel_mirrors_style() {
        let mut panel = StylePanel::default();
        assert!(!panel.visible);

        let style = TextStyle::title();
        panel.populate_from(&style);
        assert!(panel.visible);
        assert_eq!(panel.font_size, 22.0);
        assert_eq!(panel.text_color, "#ffffff");
        assert_eq!(panel.text_background, "#000000");
        assert_eq!(panel.opacity, 50);
        // Unset element background shows as white in a colour input.
        assert_eq!(panel.element_background, "#ffffff");

        panel.hide();
        assert!(!panel.visible);
    }

    #[test]
    fn test_background_keeps_opacity() {
        let mut style = TextStyle::title();
        style.apply(&StyleChange::TextBackground(SerializableColor::new(255, 0, 0, 255)));
        assert_eq!(style.background, SerializableColor::new(255, 0, 0, 128));

        // From transparent, a new background colour becomes fully opaque.
        let mut plain = TextStyle::default();
        plain.apply(&StyleChange::TextBackground(SerializableColor::new(0, 0, 255, 255)));
        assert_eq!(plain.background.a, 255);
    }

    #[test]
    fn test_opacity_and_bold() {
        let mut style = TextStyle::default();
        style.apply(&StyleChange::TextBackground(SerializableColor::black()));
        style.apply(&StyleChange::BackgroundOpacity(25));
        assert_eq!(style.background.opacity_percent(), 25);

        style.apply(&StyleChange::ToggleBold);
        assert!(style.bold);
        style.apply(&StyleChange::ToggleBold);
        assert!(!style.bold);
    }

    #[test]
    fn test_font_changes() {
        let mut style = TextStyle::default();
        style.apply(&StyleChange::FontFamily("Georgia".into()));
        style.apply(&StyleChange::FontSize(0.0));
        assert_eq!(style.font_family, "Georgia");
        assert_eq!(style.font_size, MIN_FONT_SIZE);
    }
}
