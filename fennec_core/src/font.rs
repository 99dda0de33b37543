// Copyright 2026 the Fennec Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Font service interface and text measurement types.
//!
//! Glyph rasterization, shaping, and fallback live outside the core. The tree
//! only stores a [`FontId`] per text node: a weak handle into the service's
//! cache, never an owned resource. Font loading failures surface as
//! [`FontService::resolve`] returning `None`; the node then renders without
//! text.
//!
//! [`MonospaceFonts`] is a deterministic fixed-advance service for headless
//! hosts and tests.

use alloc::string::String;
use alloc::vec::Vec;

/// Weak handle to a font loaded by a [`FontService`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FontId(pub u32);

/// Font weight requested by a text node's `fontWeight` property.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FontWeight {
    /// `"thin"`.
    Thin,
    /// Any other value.
    #[default]
    Normal,
    /// `"semi-bold"`.
    SemiBold,
    /// `"bold"`.
    Bold,
    /// `"very-bold"`.
    VeryBold,
}

impl FontWeight {
    /// Parses a weight name; unknown names map to [`Normal`](Self::Normal).
    #[must_use]
    pub fn parse(name: &str) -> Self {
        match name {
            "thin" => Self::Thin,
            "semi-bold" => Self::SemiBold,
            "bold" => Self::Bold,
            "very-bold" => Self::VeryBold,
            _ => Self::Normal,
        }
    }
}

/// Font slant requested by a text node's `fontStyle` property.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FontStyle {
    /// Upright.
    #[default]
    Normal,
    /// `"italics"` or `"italic"`.
    Italic,
}

impl FontStyle {
    /// Parses a style name; unknown names map to [`Normal`](Self::Normal).
    #[must_use]
    pub fn parse(name: &str) -> Self {
        match name {
            "italics" | "italic" => Self::Italic,
            _ => Self::Normal,
        }
    }
}

/// What a text node asks the font service for.
///
/// `family: None` and `size: None` defer to the service's defaults.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FontQuery {
    /// Family alias (`fontFamily`).
    pub family: Option<String>,
    /// Pixel size (`fontSize`).
    pub size: Option<f64>,
    /// Weight variant.
    pub weight: FontWeight,
    /// Slant variant.
    pub style: FontStyle,
}

/// Vertical metrics of a loaded font.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FontMetrics {
    /// Distance between consecutive baselines.
    pub line_height: f64,
    /// Distance from the top of a line box to its baseline.
    pub ascent: f64,
}

/// Result of measuring a block of text.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TextMeasure {
    /// Width of the widest line.
    pub width: f64,
    /// Total height of all lines.
    pub height: f64,
    /// Number of wrapped lines.
    pub lines: usize,
}

/// One wrapped line with its measured advance width.
#[derive(Clone, Debug, PartialEq)]
pub struct TextLine {
    /// Line content.
    pub text: String,
    /// Measured width of [`text`](Self::text).
    pub width: f64,
}

/// Text services consumed by the tree and the layout solver.
pub trait FontService {
    /// Resolves a font for the query, loading it if needed.
    ///
    /// Returns `None` when no font (including fallbacks) can satisfy the
    /// query.
    fn resolve(&mut self, query: &FontQuery) -> Option<FontId>;

    /// Returns the vertical metrics of a resolved font.
    fn metrics(&self, font: FontId) -> Option<FontMetrics>;

    /// Measures `text` wrapped to `max_width`.
    fn measure(&mut self, text: &str, font: FontId, max_width: f64) -> TextMeasure;

    /// Wraps `text` to `max_width`, measuring each resulting line.
    fn wrap(&mut self, text: &str, font: FontId, max_width: f64) -> Vec<TextLine>;
}

/// Greedy word wrap shared by font services.
///
/// Words are separated by spaces and kept whole; a word that does not fit on
/// the current line starts a new one, unless the line is still empty (an
/// over-long word overflows rather than leaving a blank line). `'\n'` forces
/// a break. Spaces stay attached to the preceding word, so line widths
/// include trailing spaces.
/// A non-positive `max_width` is treated as one pixel, which puts every word
/// on its own line.
pub fn wrap_words(text: &str, max_width: f64, mut advance: impl FnMut(char) -> f64) -> Vec<TextLine> {
    let mut lines = Vec::new();
    if text.is_empty() {
        return lines;
    }
    let max_width = if max_width <= 0.0 { 1.0 } else { max_width };

    let mut line = String::new();
    let mut line_width = 0.0;
    let mut word = String::new();
    let mut word_width = 0.0;

    for c in text.chars().map(Some).chain(core::iter::once(None)) {
        if let Some(ch) = c.filter(|ch| *ch != ' ' && *ch != '\n') {
            word.push(ch);
            word_width += advance(ch);
            continue;
        }

        // Word boundary: place the pending word, then handle the separator.
        if line.is_empty() || line_width + word_width <= max_width {
            line.push_str(&word);
            line_width += word_width;
        } else {
            lines.push(TextLine {
                text: core::mem::take(&mut line),
                width: line_width,
            });
            line.push_str(&word);
            line_width = word_width;
        }
        word.clear();
        word_width = 0.0;

        match c {
            Some(' ') => {
                line.push(' ');
                line_width += advance(' ');
            }
            Some(_) => {
                lines.push(TextLine {
                    text: core::mem::take(&mut line),
                    width: line_width,
                });
                line_width = 0.0;
            }
            None => {}
        }
    }
    if !line.is_empty() {
        lines.push(TextLine {
            text: line,
            width: line_width,
        });
    }
    lines
}

/// Computes the measured size of wrapped lines.
#[must_use]
pub fn measure_lines(lines: &[TextLine], line_height: f64) -> TextMeasure {
    TextMeasure {
        width: lines.iter().map(|l| l.width).fold(0.0, f64::max),
        height: lines.len() as f64 * line_height,
        lines: lines.len(),
    }
}

/// A registered family in [`MonospaceFonts`].
#[derive(Clone, Debug, PartialEq)]
pub struct FamilyConfig {
    /// Alias used in `fontFamily`.
    pub alias: String,
    /// Size used when the query names none.
    pub default_size: f64,
}

/// Deterministic fixed-advance font service.
///
/// Every glyph advances `size * advance_ratio` pixels; line height is
/// `size * line_height_ratio` and the ascent is 80% of the size. Families
/// must be registered; a query without a family uses the alias `"default"`.
/// Each distinct (family, size, weight, style) combination gets its own
/// [`FontId`], cached for the lifetime of the service.
#[derive(Clone, Debug)]
pub struct MonospaceFonts {
    families: Vec<FamilyConfig>,
    loaded: Vec<LoadedFont>,
    /// Horizontal advance per glyph, as a fraction of the size.
    pub advance_ratio: f64,
    /// Line height as a fraction of the size.
    pub line_height_ratio: f64,
}

#[derive(Clone, Debug, PartialEq)]
struct LoadedFont {
    family: usize,
    size: f64,
    weight: FontWeight,
    style: FontStyle,
}

impl Default for MonospaceFonts {
    fn default() -> Self {
        Self::new()
    }
}

impl MonospaceFonts {
    /// Creates a service with no families registered.
    #[must_use]
    pub fn new() -> Self {
        Self {
            families: Vec::new(),
            loaded: Vec::new(),
            advance_ratio: 0.5,
            line_height_ratio: 1.25,
        }
    }

    /// Creates a service with a `"default"` family at the given size.
    #[must_use]
    pub fn with_default_family(size: f64) -> Self {
        let mut fonts = Self::new();
        fonts.register(FamilyConfig {
            alias: String::from("default"),
            default_size: size,
        });
        fonts
    }

    /// Registers a family, replacing any previous family with the same alias.
    pub fn register(&mut self, family: FamilyConfig) {
        if let Some(existing) = self.families.iter_mut().find(|f| f.alias == family.alias) {
            *existing = family;
        } else {
            self.families.push(family);
        }
    }

    fn font(&self, font: FontId) -> Option<&LoadedFont> {
        self.loaded.get(font.0 as usize)
    }
}

impl FontService for MonospaceFonts {
    fn resolve(&mut self, query: &FontQuery) -> Option<FontId> {
        let alias = query.family.as_deref().unwrap_or("default");
        let family = self.families.iter().position(|f| f.alias == alias)?;
        let size = query.size.unwrap_or(self.families[family].default_size);
        if size <= 0.0 {
            return None;
        }
        let wanted = LoadedFont {
            family,
            size,
            weight: query.weight,
            style: query.style,
        };
        let idx = match self.loaded.iter().position(|f| *f == wanted) {
            Some(idx) => idx,
            None => {
                self.loaded.push(wanted);
                self.loaded.len() - 1
            }
        };
        u32::try_from(idx).ok().map(FontId)
    }

    fn metrics(&self, font: FontId) -> Option<FontMetrics> {
        self.font(font).map(|f| FontMetrics {
            line_height: f.size * self.line_height_ratio,
            ascent: f.size * 0.8,
        })
    }

    fn measure(&mut self, text: &str, font: FontId, max_width: f64) -> TextMeasure {
        let Some(metrics) = self.metrics(font) else {
            return TextMeasure::default();
        };
        let lines = self.wrap(text, font, max_width);
        measure_lines(&lines, metrics.line_height)
    }

    fn wrap(&mut self, text: &str, font: FontId, max_width: f64) -> Vec<TextLine> {
        let Some(size) = self.font(font).map(|f| f.size) else {
            return Vec::new();
        };
        let advance = size * self.advance_ratio;
        wrap_words(text, max_width, |_| advance)
    }
}
