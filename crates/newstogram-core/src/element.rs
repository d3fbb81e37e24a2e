//! Element model: one placed item on a canvas.

use crate::geometry::{rotated_bounds, rotated_contains};
use crate::widget::HandleRole;
use kurbo::{Point, Rect, Size, Vec2};
use peniko::Color;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for elements.
pub type ElementId = Uuid;

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    pub fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// `#rrggbb`, ignoring alpha. Fully transparent colors read as white,
    /// which is what a color input shows for an unset background.
    pub fn to_hex(&self) -> String {
        if self.a == 0 {
            return "#ffffff".to_string();
        }
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Parse `#rrggbb` or `#rgb`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.trim().strip_prefix('#')?;
        if !digits.is_ascii() {
            return None;
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        match digits.len() {
            6 => Some(Self::new(
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
                255,
            )),
            3 => {
                let expand = |s: &str| channel(s).map(|v| v * 17);
                Some(Self::new(
                    expand(&digits[0..1])?,
                    expand(&digits[1..2])?,
                    expand(&digits[2..3])?,
                    255,
                ))
            }
            _ => None,
        }
    }

    /// Opacity as a 0..=100 percentage.
    pub fn opacity_percent(&self) -> u8 {
        ((self.a as f64 / 255.0) * 100.0).round() as u8
    }

    /// Same color with alpha set from a 0..=100 percentage.
    pub fn with_opacity_percent(self, percent: u8) -> Self {
        let alpha = (percent.min(100) as f64 / 100.0 * 255.0).round() as u8;
        Self { a: alpha, ..self }
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Style of a text-bearing element, as exposed to the style panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub font_family: String,
    pub font_size: f64,
    pub color: SerializableColor,
    /// Highlight behind the glyphs.
    pub background: SerializableColor,
    /// Fill of the element box itself.
    pub element_background: SerializableColor,
    pub bold: bool,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_family: "Arial".to_string(),
            font_size: 16.0,
            color: SerializableColor::black(),
            background: SerializableColor::transparent(),
            element_background: SerializableColor::transparent(),
            bold: false,
        }
    }
}

impl TextStyle {
    /// White-on-translucent-black headline style used for titles.
    pub fn title() -> Self {
        Self {
            font_size: 22.0,
            color: SerializableColor::white(),
            background: SerializableColor::new(0, 0, 0, 128),
            bold: true,
            ..Self::default()
        }
    }
}

/// Image payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageContent {
    /// URL or `data:` URL the host can draw.
    pub source: String,
    /// Intrinsic pixel size, when known.
    pub natural_size: Option<Size>,
    /// Decorative overlay asset (e.g. the gradient band); never gets a
    /// remove-background handle.
    #[serde(default)]
    pub overlay: bool,
}

/// What an element displays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ElementContent {
    Image(ImageContent),
    /// An editable paragraph.
    Text { text: String, style: TextStyle },
    /// Host-provided markup with editable text inside, e.g. a title block.
    /// `caption` marks the auto-inserted title band pinned to the bottom.
    Html {
        markup: String,
        caption: bool,
        style: TextStyle,
    },
}

/// Coarse classification of [`ElementContent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentKind {
    Image,
    EditableText,
    GenericHtml,
}

impl ElementContent {
    /// Plain editable text.
    pub fn text(text: impl Into<String>) -> Self {
        ElementContent::Text {
            text: text.into(),
            style: TextStyle::default(),
        }
    }

    /// An image from a URL or data URL.
    pub fn image(source: impl Into<String>, natural_size: Option<Size>) -> Self {
        ElementContent::Image(ImageContent {
            source: source.into(),
            natural_size,
            overlay: false,
        })
    }

    pub fn kind(&self) -> ContentKind {
        match self {
            ElementContent::Image(_) => ContentKind::Image,
            ElementContent::Text { .. } => ContentKind::EditableText,
            ElementContent::Html { .. } => ContentKind::GenericHtml,
        }
    }

    /// Whether the content can be bound to a style panel.
    pub fn is_text_bearing(&self) -> bool {
        !matches!(self, ElementContent::Image(_))
    }

    /// Auto-inserted title band.
    pub fn is_caption(&self) -> bool {
        matches!(self, ElementContent::Html { caption: true, .. })
    }

    pub fn text_style(&self) -> Option<&TextStyle> {
        match self {
            ElementContent::Image(_) => None,
            ElementContent::Text { style, .. } | ElementContent::Html { style, .. } => Some(style),
        }
    }

    pub fn text_style_mut(&mut self) -> Option<&mut TextStyle> {
        match self {
            ElementContent::Image(_) => None,
            ElementContent::Text { style, .. } | ElementContent::Html { style, .. } => Some(style),
        }
    }

    /// Handle roles this content gets, in creation order.
    pub fn handle_roles(&self) -> Vec<HandleRole> {
        let mut roles = vec![
            HandleRole::Delete,
            HandleRole::Move,
            HandleRole::Resize,
            HandleRole::Rotate,
        ];
        if let ElementContent::Image(image) = self {
            if !image.overlay {
                roles.push(HandleRole::RemoveBackground);
            }
        }
        roles
    }
}

/// A placed, transformable item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Element {
    pub(crate) id: ElementId,
    /// Top-left corner in canvas-local pixels (the unrotated layout box).
    pub position: Point,
    /// Unrotated layout size.
    pub size: Size,
    /// Rotation in degrees about the centre. Accumulates past ±360.
    pub rotation: f64,
    pub content: ElementContent,
    pub(crate) selected: bool,
}

impl Element {
    pub fn new(content: ElementContent, position: Point, size: Size) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            size,
            rotation: 0.0,
            content,
            selected: false,
        }
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn kind(&self) -> ContentKind {
        self.content.kind()
    }

    /// Layout box in canvas-local coordinates.
    pub fn layout_rect(&self) -> Rect {
        Rect::from_origin_size(self.position, self.size)
    }

    /// Half extents of the unrotated box.
    pub fn half_extents(&self) -> Vec2 {
        Vec2::new(self.size.width / 2.0, self.size.height / 2.0)
    }

    /// Layout box in viewport coordinates, given the canvas surface origin.
    pub fn viewport_layout_rect(&self, canvas_origin: Point) -> Rect {
        self.layout_rect() + canvas_origin.to_vec2()
    }

    /// Rendered centre in viewport coordinates. Rotation is about the
    /// centre, so it is the same for the rotated and unrotated box.
    pub fn viewport_center(&self, canvas_origin: Point) -> Point {
        self.viewport_layout_rect(canvas_origin).center()
    }

    /// Rendered (post-rotation) axis-aligned bounds in viewport coordinates.
    pub fn viewport_bounds(&self, canvas_origin: Point) -> Rect {
        rotated_bounds(self.viewport_layout_rect(canvas_origin), self.rotation)
    }

    /// Rotation-aware containment test in viewport coordinates.
    pub fn contains(&self, point: Point, canvas_origin: Point) -> bool {
        rotated_contains(self.viewport_layout_rect(canvas_origin), self.rotation, point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_roles_by_kind() {
        let text = ElementContent::text("hello");
        assert_eq!(text.handle_roles().len(), 4);
        assert!(!text.handle_roles().contains(&HandleRole::RemoveBackground));

        let photo = ElementContent::image("https://example.com/a.jpg", None);
        assert_eq!(photo.handle_roles().len(), 5);
        assert!(photo.handle_roles().contains(&HandleRole::RemoveBackground));

        let overlay = ElementContent::Image(ImageContent {
            source: "gradient.png".into(),
            natural_size: None,
            overlay: true,
        });
        assert_eq!(overlay.handle_roles().len(), 4);
    }

    #[test]
    fn test_kinds() {
        assert_eq!(ElementContent::text("a").kind(), ContentKind::EditableText);
        assert_eq!(ElementContent::image("a", None).kind(), ContentKind::Image);
        let html = ElementContent::Html {
            markup: "<h3>a</h3>".into(),
            caption: true,
            style: TextStyle::title(),
        };
        assert_eq!(html.kind(), ContentKind::GenericHtml);
        assert!(html.is_caption());
        assert!(html.is_text_bearing());
        assert!(!ElementContent::image("a", None).is_text_bearing());
    }

    #[test]
    fn test_viewport_center_ignores_rotation() {
        let mut element = Element::new(
            ElementContent::text("a"),
            Point::new(10.0, 20.0),
            Size::new(100.0, 50.0),
        );
        let origin = Point::new(200.0, 100.0);
        assert_eq!(element.viewport_center(origin), Point::new(260.0, 145.0));
        element.rotation = 37.0;
        let center = element.viewport_center(origin);
        assert!((center.x - 260.0).abs() < 1e-9);
        assert!((center.y - 145.0).abs() < 1e-9);
        let bounds = element.viewport_bounds(origin);
        assert!((bounds.center().x - 260.0).abs() < 1e-6);
        assert!(bounds.width() > 100.0);
    }

    #[test]
    fn test_hex_round_trip() {
        let c = SerializableColor::from_hex("#1a2B3c").unwrap();
        assert_eq!(c, SerializableColor::new(0x1a, 0x2b, 0x3c, 255));
        assert_eq!(c.to_hex(), "#1a2b3c");
        assert_eq!(SerializableColor::from_hex("#fff"), Some(SerializableColor::white()));
        assert_eq!(SerializableColor::from_hex("nope"), None);
        assert_eq!(SerializableColor::transparent().to_hex(), "#ffffff");
    }

    #[test]
    fn test_opacity_percent() {
        let c = SerializableColor::black().with_opacity_percent(50);
        assert_eq!(c.a, 128);
        assert_eq!(c.opacity_percent(), 50);
        assert_eq!(SerializableColor::black().with_opacity_percent(250).a, 255);
    }

    #[test]
    fn test_peniko_conversion() {
        let color: Color = SerializableColor::new(10, 20, 30, 255).into();
        let back: SerializableColor = color.into();
        assert_eq!(back, SerializableColor::new(10, 20, 30, 255));
    }
}
