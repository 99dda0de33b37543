// Copyright 2026 the Fennec Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Style conversion from fennec to taffy.

use fennec_core::node::NodeKind;
use fennec_core::style::{Align, Justify, LayoutStyle, Length, Position};
use kurbo::Insets;
use taffy::{
    AlignItems, Dimension, Display, FlexDirection, JustifyContent, LengthPercentage,
    LengthPercentageAuto, Rect, Size, Style,
};

/// Narrows a fennec coordinate to taffy's precision.
#[expect(
    clippy::cast_possible_truncation,
    reason = "taffy lays out in f32; UI coordinates fit comfortably"
)]
pub(crate) fn px(value: f64) -> f32 {
    value as f32
}

fn dimension(length: Length) -> Dimension {
    match length {
        Length::Auto => Dimension::Auto,
        Length::Px(v) => Dimension::Length(px(v)),
        Length::Percent(p) => Dimension::Percent(px(p / 100.0)),
    }
}

fn padding(insets: Insets) -> Rect<LengthPercentage> {
    Rect {
        left: LengthPercentage::Length(px(insets.x0)),
        right: LengthPercentage::Length(px(insets.x1)),
        top: LengthPercentage::Length(px(insets.y0)),
        bottom: LengthPercentage::Length(px(insets.y1)),
    }
}

fn margin(insets: Insets) -> Rect<LengthPercentageAuto> {
    Rect {
        left: LengthPercentageAuto::Length(px(insets.x0)),
        right: LengthPercentageAuto::Length(px(insets.x1)),
        top: LengthPercentageAuto::Length(px(insets.y0)),
        bottom: LengthPercentageAuto::Length(px(insets.y1)),
    }
}

fn align_items(align: Align) -> AlignItems {
    match align {
        Align::Start => AlignItems::FlexStart,
        Align::Center => AlignItems::Center,
        Align::End => AlignItems::FlexEnd,
        Align::Stretch => AlignItems::Stretch,
    }
}

fn justify_content(justify: Justify) -> JustifyContent {
    match justify {
        Justify::Start => JustifyContent::FlexStart,
        Justify::Center => JustifyContent::Center,
        Justify::End => JustifyContent::FlexEnd,
        Justify::SpaceBetween => JustifyContent::SpaceBetween,
        Justify::SpaceAround => JustifyContent::SpaceAround,
        Justify::SpaceEvenly => JustifyContent::SpaceEvenly,
    }
}

fn flex_direction(kind: NodeKind) -> FlexDirection {
    match kind {
        NodeKind::Row => FlexDirection::Row,
        NodeKind::Column | NodeKind::Text | NodeKind::Rect => FlexDirection::Column,
    }
}

/// Builds the taffy style of one node.
pub(crate) fn style(kind: NodeKind, layout: &LayoutStyle) -> Style {
    let gap = LengthPercentage::Length(px(layout.gap));
    let mut style = Style {
        display: Display::Flex,
        position: match layout.position {
            Position::Relative => taffy::Position::Relative,
            Position::Absolute => taffy::Position::Absolute,
        },
        flex_direction: flex_direction(kind),
        size: Size {
            width: dimension(layout.width),
            height: dimension(layout.height),
        },
        min_size: Size {
            width: dimension(layout.min_width),
            height: dimension(layout.min_height),
        },
        max_size: Size {
            width: dimension(layout.max_width),
            height: dimension(layout.max_height),
        },
        padding: padding(layout.padding),
        margin: margin(layout.margin),
        gap: Size {
            width: gap,
            height: gap,
        },
        flex_grow: px(layout.flex_grow),
        flex_shrink: px(layout.flex_shrink),
        align_items: Some(align_items(layout.align_items)),
        justify_content: Some(justify_content(layout.justify_content)),
        ..Style::default()
    };
    if kind == NodeKind::Text {
        style.flex_grow = 0.0;
        style.flex_shrink = 0.0;
    }
    style
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lengths_map_to_dimensions() {
        assert_eq!(dimension(Length::Auto), Dimension::Auto);
        assert_eq!(dimension(Length::Px(12.0)), Dimension::Length(12.0));
        assert_eq!(dimension(Length::Percent(50.0)), Dimension::Percent(0.5));
    }

    #[test]
    fn kinds_pick_direction() {
        let layout = LayoutStyle::default();
        assert_eq!(style(NodeKind::Row, &layout).flex_direction, FlexDirection::Row);
        assert_eq!(style(NodeKind::Column, &layout).flex_direction, FlexDirection::Column);
        assert_eq!(style(NodeKind::Rect, &layout).flex_direction, FlexDirection::Column);
    }

    #[test]
    fn text_never_flexes() {
        let layout = LayoutStyle {
            flex_grow: 2.0,
            flex_shrink: 1.0,
            ..LayoutStyle::default()
        };
        let text = style(NodeKind::Text, &layout);
        assert_eq!(text.flex_grow, 0.0);
        assert_eq!(text.flex_shrink, 0.0);
        let rect = style(NodeKind::Rect, &layout);
        assert_eq!(rect.flex_grow, 2.0);
        assert_eq!(rect.flex_shrink, 1.0);
    }

    #[test]
    fn insets_keep_their_sides() {
        let layout = LayoutStyle {
            padding: Insets::new(1.0, 2.0, 3.0, 4.0),
            ..LayoutStyle::default()
        };
        let s = style(NodeKind::Column, &layout);
        assert_eq!(s.padding.left, LengthPercentage::Length(1.0));
        assert_eq!(s.padding.top, LengthPercentage::Length(2.0));
        assert_eq!(s.padding.right, LengthPercentage::Length(3.0));
        assert_eq!(s.padding.bottom, LengthPercentage::Length(4.0));
    }
}
