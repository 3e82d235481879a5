//! Axis-aligned rectangles.

use serde::{Deserialize, Serialize};

use crate::point::Point;
use crate::snap::snap_to_grid;

/// An axis-aligned rectangle, specified by lower-left and upper-right corners.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// The lower-left corner.
    p0: Point,
    /// The upper-right corner.
    p1: Point,
}

impl Rect {
    /// Creates a rectangle from two corner points, reordering them so that `p0 <= p1`
    /// on both axes.
    pub fn new(p0: Point, p1: Point) -> Self {
        Self::from_sides(p0.x, p0.y, p1.x, p1.y)
    }

    /// Creates a rectangle from all 4 sides (left, bottom, right, top).
    ///
    /// The sides are sorted for you: `left`/`right` and `bot`/`top` need not already be ordered.
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let rect = Rect::from_sides(15.0, 20.0, 30.0, 40.0);
    /// assert_eq!(rect.left(), 15.0);
    /// assert_eq!(rect.bot(), 20.0);
    /// assert_eq!(rect.right(), 30.0);
    /// assert_eq!(rect.top(), 40.0);
    /// ```
    pub fn from_sides(left: f64, bot: f64, right: f64, top: f64) -> Self {
        let (x0, x1) = if left <= right { (left, right) } else { (right, left) };
        let (y0, y1) = if bot <= top { (bot, top) } else { (top, bot) };
        Self {
            p0: Point::new(x0, y0),
            p1: Point::new(x1, y1),
        }
    }

    /// The lower-left corner.
    pub const fn p0(&self) -> Point {
        self.p0
    }

    /// The upper-right corner.
    pub const fn p1(&self) -> Point {
        self.p1
    }

    /// The left (minimum x) coordinate.
    pub const fn left(&self) -> f64 {
        self.p0.x
    }

    /// The right (maximum x) coordinate.
    pub const fn right(&self) -> f64 {
        self.p1.x
    }

    /// The bottom (minimum y) coordinate.
    pub const fn bot(&self) -> f64 {
        self.p0.y
    }

    /// The top (maximum y) coordinate.
    pub const fn top(&self) -> f64 {
        self.p1.y
    }

    /// The width of the rectangle (`right - left`).
    pub fn width(&self) -> f64 {
        self.p1.x - self.p0.x
    }

    /// The height of the rectangle (`top - bot`).
    pub fn height(&self) -> f64 {
        self.p1.y - self.p0.y
    }

    /// The area of the rectangle.
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// The center point of the rectangle.
    pub fn center(&self) -> Point {
        Point::new((self.p0.x + self.p1.x) / 2.0, (self.p0.y + self.p1.y) / 2.0)
    }

    /// Returns a copy of this rectangle translated by `(dx, dy)`.
    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        Self {
            p0: Point::new(self.p0.x + dx, self.p0.y + dy),
            p1: Point::new(self.p1.x + dx, self.p1.y + dy),
        }
    }

    /// Returns a copy of this rectangle with each side snapped to the nearest multiple of `grid`.
    pub fn snap_to_grid(&self, grid: f64) -> Self {
        Self {
            p0: self.p0.snap_to_grid(grid),
            p1: self.p1.snap_to_grid(grid),
        }
    }

    /// Returns the smallest rectangle containing both `self` and `other`.
    pub fn union(&self, other: &Rect) -> Self {
        Self::from_sides(
            self.left().min(other.left()),
            self.bot().min(other.bot()),
            self.right().max(other.right()),
            self.top().max(other.top()),
        )
    }
}
