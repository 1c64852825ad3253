//! Screen geometry value types and coordinate translation.
//!
//! Coordinates in the open interval (0, 1) are treated as fractions of the
//! reference length; everything else is an absolute pixel value.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("Coordinate {coordinate} cannot be negative")]
    NegativeCoordinate { coordinate: f64 },
    #[error("Coordinate [x={x}, y={y}] is outside of element rect: {rect}")]
    OutOfBounds { x: f64, y: f64, rect: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Integer rectangle with exclusive right/bottom edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    pub fn is_empty(&self) -> bool {
        self.left >= self.right || self.top >= self.bottom
    }

    pub fn center(&self) -> Point {
        Point {
            x: f64::from(self.left + self.right) / 2.0,
            y: f64::from(self.top + self.bottom) / 2.0,
        }
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        !self.is_empty()
            && x >= f64::from(self.left)
            && x < f64::from(self.right)
            && y >= f64::from(self.top)
            && y < f64::from(self.bottom)
    }

    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let clipped = Rect {
            left: self.left.max(other.left),
            top: self.top.max(other.top),
            right: self.right.min(other.right),
            bottom: self.bottom.min(other.bottom),
        };
        (!clipped.is_empty()).then_some(clipped)
    }

    /// `[left,top][right,bottom]`, the form clients expect for the bounds attribute.
    pub fn to_short_string(&self) -> String {
        format!(
            "[{},{}][{},{}]",
            self.left, self.top, self.right, self.bottom
        )
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_short_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn as_rect(&self) -> Rect {
        Rect::new(
            0,
            0,
            i32::try_from(self.width).unwrap_or(i32::MAX),
            i32::try_from(self.height).unwrap_or(i32::MAX),
        )
    }
}

pub fn translate_coordinate(coord: f64, length: f64, offset: f64) -> Result<f64, GeometryError> {
    if coord < 0.0 {
        return Err(GeometryError::NegativeCoordinate { coordinate: coord });
    }
    if coord > 0.0 && coord < 1.0 {
        return Ok(length * coord + offset);
    }
    Ok(coord + offset)
}

/// Translate `point` (absolute or fractional) against `rect`, then apply `offset`.
pub fn absolute_position(
    point: Point,
    rect: Rect,
    offset: Point,
    check_bounds: bool,
) -> Result<Point, GeometryError> {
    let absolute = Point {
        x: translate_coordinate(point.x, f64::from(rect.width()), offset.x)?,
        y: translate_coordinate(point.y, f64::from(rect.height()), offset.y)?,
    };
    if check_bounds && !rect.contains(absolute.x, absolute.y) {
        return Err(GeometryError::OutOfBounds {
            x: absolute.x,
            y: absolute.y,
            rect: rect.to_short_string(),
        });
    }
    Ok(absolute)
}
