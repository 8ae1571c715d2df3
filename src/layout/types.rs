//! Core types for the layout engine
//!
//! All coordinates are in pin grid units with the origin at the body centre
//! and y pointing up.

use crate::table::{PinSpec, Side};

/// A 2D point in grid units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Move `distance` away from the body across `side`
    pub fn outward(self, side: Side, distance: f64) -> Self {
        match side {
            Side::Left => Point::new(self.x - distance, self.y),
            Side::Right => Point::new(self.x + distance, self.y),
            Side::Top => Point::new(self.x, self.y + distance),
            Side::Bottom => Point::new(self.x, self.y - distance),
        }
    }
}

/// An axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: Point,
    pub max: Point,
}

impl Rect {
    /// Rectangle centred on the origin
    pub fn centered(half_width: f64, half_height: f64) -> Self {
        Self {
            min: Point::new(-half_width, -half_height),
            max: Point::new(half_width, half_height),
        }
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }
}

/// A pin with its final position
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedPin {
    pub pin: PinSpec,
    pub side: Side,
    /// Ordinal of the anchor on its side
    pub anchor: usize,
    /// Where the pin meets the body
    pub edge: Point,
    /// Connection point, `length` outside the body
    pub end: Point,
    /// Drawn length, zero for hidden pins
    pub length: f64,
    pub rotation: u16,
}

/// Per-side layout facts
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SideSummary {
    pub anchors: usize,
    /// Declared length of the longest pin, hidden pins included
    pub longest_pin: f64,
    /// Coordinate of the first anchor along the edge
    pub start: f64,
}

/// Computed geometry of one symbol
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolGeometry {
    /// Half extents of the pin rectangle
    pub half_width: i64,
    pub half_height: i64,
    /// Pin rectangle plus padding
    pub body: Rect,
    pub pins: Vec<PlacedPin>,
    pub left: SideSummary,
    pub right: SideSummary,
    pub top: SideSummary,
    pub bottom: SideSummary,
}

impl SymbolGeometry {
    pub fn side(&self, side: Side) -> &SideSummary {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
            Side::Top => &self.top,
            Side::Bottom => &self.bottom,
        }
    }

    pub fn side_mut(&mut self, side: Side) -> &mut SideSummary {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
            Side::Top => &mut self.top,
            Side::Bottom => &mut self.bottom,
        }
    }

    /// Anchor count of the fuller vertical edge
    pub fn vertical_anchors(&self) -> usize {
        self.left.anchors.max(self.right.anchors)
    }

    pub fn has_horizontal_pins(&self) -> bool {
        self.top.anchors > 0 || self.bottom.anchors > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outward() {
        let p = Point::new(-2.0, 1.0);
        assert_eq!(p.outward(Side::Left, 1.0), Point::new(-3.0, 1.0));
        assert_eq!(p.outward(Side::Top, 0.5), Point::new(-2.0, 1.5));
    }

    #[test]
    fn test_rect_centered() {
        let r = Rect::centered(3.0, 2.0);
        assert_eq!(r.width(), 6.0);
        assert_eq!(r.height(), 4.0);
        assert_eq!(r.min, Point::new(-3.0, -2.0));
    }
}
