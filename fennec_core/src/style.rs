// Copyright 2026 the Fennec Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node style and property parsing.
//!
//! A [`Style`] is split by the kind of work a change causes:
//!
//! - [`LayoutStyle`]: lengths, box model, flex parameters, alignment,
//!   position, gap, text alignment, and the font query. Any difference marks
//!   the node [`LAYOUT`](crate::dirty::LAYOUT)-dirty.
//! - [`PaintStyle`]: background, text color, decoration, and overflow. Any
//!   difference marks the node [`PAINT`](crate::dirty::PAINT)-dirty.
//!
//! [`Style::from_props`] never fails. Absent or wrong-typed properties take
//! their defaults, malformed hex colors become opaque black, and malformed
//! percentages become [`Length::Auto`].

use alloc::collections::BTreeMap;
use alloc::string::String;

use kurbo::Insets;

use crate::description::PropValue;
use crate::font::{FontQuery, FontStyle, FontWeight};

/// An RGBA color with 8-bit channels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Color {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Alpha.
    pub a: u8,
}

impl Color {
    /// Opaque black.
    pub const BLACK: Self = Self::rgba(0, 0, 0, 255);
    /// Opaque white.
    pub const WHITE: Self = Self::rgba(255, 255, 255, 255);

    /// Creates a color from its channels.
    #[must_use]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parses `"#RRGGBB"` or `"#RRGGBBAA"` (the `#` is optional).
    ///
    /// Anything else yields opaque black.
    #[must_use]
    pub fn from_hex(hex: &str) -> Self {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if !(digits.len() == 6 || digits.len() == 8) || !digits.bytes().all(|b| b.is_ascii_hexdigit())
        {
            return Self::BLACK;
        }
        let Ok(value) = u32::from_str_radix(digits, 16) else {
            return Self::BLACK;
        };
        let [b0, b1, b2, b3] = value.to_be_bytes();
        if digits.len() == 6 {
            Self::rgba(b1, b2, b3, 255)
        } else {
            Self::rgba(b0, b1, b2, b3)
        }
    }

    /// Builds a color from up to four numeric components.
    ///
    /// Missing components default to 255; values are clamped to `0..=255`.
    #[must_use]
    pub fn from_components(components: &[f64]) -> Self {
        let channel = |i: usize| -> u8 {
            components.get(i).map_or(255, |&v| {
                #[expect(
                    clippy::cast_possible_truncation,
                    reason = "value is clamped to the u8 range first"
                )]
                let byte = v.clamp(0.0, 255.0) as u8;
                byte
            })
        };
        Self::rgba(channel(0), channel(1), channel(2), channel(3))
    }

    fn from_prop(value: &PropValue) -> Option<Self> {
        match value {
            PropValue::Str(hex) => Some(Self::from_hex(hex)),
            PropValue::List(components) => Some(Self::from_components(components)),
            _ => None,
        }
    }
}

/// A declared length.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Length {
    /// Determined by the layout solver.
    #[default]
    Auto,
    /// Absolute pixels.
    Px(f64),
    /// Percentage of the parent's size (`50.0` means half).
    Percent(f64),
}

impl Length {
    fn from_prop(value: &PropValue) -> Self {
        match value {
            PropValue::Number(n) => Self::Px(*n),
            PropValue::Str(s) => s
                .strip_suffix('%')
                .and_then(|n| n.trim().parse::<f64>().ok())
                .map_or(Self::Auto, Self::Percent),
            _ => Self::Auto,
        }
    }
}

/// Cross-axis alignment of children (`alignItems`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Align {
    /// `"start"` and anything unrecognized.
    #[default]
    Start,
    /// `"center"`.
    Center,
    /// `"end"`.
    End,
    /// `"stretch"`.
    Stretch,
}

impl Align {
    fn parse(s: &str) -> Self {
        match s {
            "center" => Self::Center,
            "end" => Self::End,
            "stretch" => Self::Stretch,
            _ => Self::Start,
        }
    }
}

/// Main-axis distribution of children (`justifyContent`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Justify {
    /// `"start"` and anything unrecognized.
    #[default]
    Start,
    /// `"center"`.
    Center,
    /// `"end"`.
    End,
    /// `"space-between"`.
    SpaceBetween,
    /// `"space-around"`.
    SpaceAround,
    /// `"space-evenly"`.
    SpaceEvenly,
}

impl Justify {
    fn parse(s: &str) -> Self {
        match s {
            "center" => Self::Center,
            "end" => Self::End,
            "space-between" => Self::SpaceBetween,
            "space-around" => Self::SpaceAround,
            "space-evenly" => Self::SpaceEvenly,
            _ => Self::Start,
        }
    }
}

/// Horizontal alignment of wrapped text lines (`textAlign`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TextAlign {
    /// `"left"`, `"start"`, and anything unrecognized.
    #[default]
    Start,
    /// `"center"`.
    Center,
    /// `"right"` or `"end"`.
    End,
}

impl TextAlign {
    fn parse(s: &str) -> Self {
        match s {
            "center" => Self::Center,
            "right" | "end" => Self::End,
            _ => Self::Start,
        }
    }

    /// Horizontal offset of a line of `line_width` inside `content_width`.
    #[must_use]
    pub fn offset(self, content_width: f64, line_width: f64) -> f64 {
        match self {
            Self::Start => 0.0,
            Self::Center => (content_width - line_width) / 2.0,
            Self::End => content_width - line_width,
        }
    }
}

/// Positioning scheme (`position`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Position {
    /// In flow.
    #[default]
    Relative,
    /// Out of flow: takes no space among its siblings and sits at the
    /// parent's content origin, offset by its margins.
    Absolute,
}

/// Text decoration (`textDecoration`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TextDecoration {
    /// None.
    #[default]
    None,
    /// `"underline"`.
    Underline,
    /// `"strike-through"`.
    StrikeThrough,
}

impl TextDecoration {
    fn parse(s: &str) -> Self {
        match s {
            "underline" => Self::Underline,
            "strike-through" => Self::StrikeThrough,
            _ => Self::None,
        }
    }
}

/// Whether children are clipped to the node's box (`overflow`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Overflow {
    /// `"visible"`: children may paint outside.
    Visible,
    /// Any other value, and the default.
    #[default]
    Clip,
}

/// Geometry-affecting properties.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutStyle {
    /// Declared width (`w` / `width`).
    pub width: Length,
    /// Declared height (`h` / `height`).
    pub height: Length,
    /// `minWidth`.
    pub min_width: Length,
    /// `maxWidth`.
    pub max_width: Length,
    /// `minHeight`.
    pub min_height: Length,
    /// `maxHeight`.
    pub max_height: Length,
    /// Inner spacing (`padding` shorthand and per-side overrides).
    pub padding: Insets,
    /// Outer spacing (`margin` shorthand and per-side overrides).
    pub margin: Insets,
    /// `flexGrow`.
    pub flex_grow: f64,
    /// `flexShrink`.
    pub flex_shrink: f64,
    /// `alignItems`.
    pub align_items: Align,
    /// `justifyContent`.
    pub justify_content: Justify,
    /// `position`.
    pub position: Position,
    /// Spacing between children (`gap`, falling back to `spacing`).
    pub gap: f64,
    /// `textAlign`.
    pub text_align: TextAlign,
    /// Font selection for text nodes.
    pub font: FontQuery,
}

impl Default for LayoutStyle {
    fn default() -> Self {
        Self {
            width: Length::Auto,
            height: Length::Auto,
            min_width: Length::Auto,
            max_width: Length::Auto,
            min_height: Length::Auto,
            max_height: Length::Auto,
            padding: Insets::ZERO,
            margin: Insets::ZERO,
            flex_grow: 0.0,
            flex_shrink: 0.0,
            align_items: Align::Start,
            justify_content: Justify::Start,
            position: Position::Relative,
            gap: 0.0,
            text_align: TextAlign::Start,
            font: FontQuery::default(),
        }
    }
}

/// Paint-only properties.
#[derive(Clone, Debug, PartialEq)]
pub struct PaintStyle {
    /// Background fill (`BGColor` / `background`); `None` paints nothing.
    pub background: Option<Color>,
    /// Text color (`color`).
    pub color: Color,
    /// `textDecoration`.
    pub decoration: TextDecoration,
    /// `overflow`.
    pub overflow: Overflow,
}

impl Default for PaintStyle {
    fn default() -> Self {
        Self {
            background: None,
            color: Color::WHITE,
            decoration: TextDecoration::None,
            overflow: Overflow::Clip,
        }
    }
}

/// The full style of a node.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Style {
    /// Geometry-affecting properties.
    pub layout: LayoutStyle,
    /// Paint-only properties.
    pub paint: PaintStyle,
}

/// Which dirty classes a style change raises.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StyleChange {
    /// A layout-affecting property differs.
    pub layout: bool,
    /// A paint-only property differs.
    pub paint: bool,
}

impl Style {
    /// Builds a style from a description's property table.
    #[must_use]
    pub fn from_props(props: &BTreeMap<String, PropValue>) -> Self {
        let p = Props(props);

        let padding = p.insets("padding");
        let margin = p.insets("margin");
        let font = FontQuery {
            family: p.string("fontFamily").map(String::from),
            size: p.number("fontSize").filter(|s| *s > 0.0),
            weight: p.string("fontWeight").map_or_else(FontWeight::default, FontWeight::parse),
            style: p.string("fontStyle").map_or_else(FontStyle::default, FontStyle::parse),
        };

        let layout = LayoutStyle {
            width: p.length(&["w", "width"]),
            height: p.length(&["h", "height"]),
            min_width: p.length(&["minWidth"]),
            max_width: p.length(&["maxWidth"]),
            min_height: p.length(&["minHeight"]),
            max_height: p.length(&["maxHeight"]),
            padding,
            margin,
            flex_grow: p.number("flexGrow").unwrap_or(0.0),
            flex_shrink: p.number("flexShrink").unwrap_or(0.0),
            align_items: p.string("alignItems").map_or(Align::Start, Align::parse),
            justify_content: p
                .string("justifyContent")
                .map_or(Justify::Start, Justify::parse),
            position: match p.string("position") {
                Some("absolute") => Position::Absolute,
                _ => Position::Relative,
            },
            gap: p
                .number("gap")
                .or_else(|| p.number("spacing"))
                .unwrap_or(0.0),
            text_align: p.string("textAlign").map_or(TextAlign::Start, TextAlign::parse),
            font,
        };

        let paint = PaintStyle {
            background: p.color(&["BGColor", "background"]),
            color: p.color(&["color"]).unwrap_or(Color::WHITE),
            decoration: p
                .string("textDecoration")
                .map_or(TextDecoration::None, TextDecoration::parse),
            overflow: match p.string("overflow") {
                Some("visible") => Overflow::Visible,
                _ => Overflow::Clip,
            },
        };

        Self { layout, paint }
    }

    /// Compares against a new style and reports the dirty classes raised.
    #[must_use]
    pub fn diff(&self, new: &Self) -> StyleChange {
        StyleChange {
            layout: self.layout != new.layout,
            paint: self.paint != new.paint,
        }
    }
}

/// Typed lookups over a property table.
struct Props<'a>(&'a BTreeMap<String, PropValue>);

impl Props<'_> {
    fn number(&self, key: &str) -> Option<f64> {
        self.0.get(key).and_then(PropValue::as_number)
    }

    fn string(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(PropValue::as_str)
    }

    fn length(&self, keys: &[&str]) -> Length {
        keys.iter()
            .find_map(|k| self.0.get(*k))
            .map_or(Length::Auto, Length::from_prop)
    }

    fn color(&self, keys: &[&str]) -> Option<Color> {
        keys.iter()
            .find_map(|k| self.0.get(*k))
            .and_then(Color::from_prop)
    }

    /// Reads `<name>` as a shorthand and `<name>Top` etc. as overrides.
    fn insets(&self, name: &str) -> Insets {
        let all = self.number(name).unwrap_or(0.0);
        let mut key = String::from(name);
        let base = key.len();
        let mut side = |suffix: &str| {
            key.truncate(base);
            key.push_str(suffix);
            self.number(&key).unwrap_or(all)
        };
        let top = side("Top");
        let right = side("Right");
        let bottom = side("Bottom");
        let left = side("Left");
        Insets::new(left, top, right, bottom)
    }
}
