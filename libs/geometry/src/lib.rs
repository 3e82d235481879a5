//! 2-D geometric primitives for MOSFET device layout.
//!
//! This is a small, `f64`-coordinate sibling of the workspace's integer-database-unit
//! `geometry` crate: device dimensions here come from engineering-notation lengths and widths
//! divided by an arbitrary real database unit, so corners are real numbers snapped to a real
//! grid rather than always-integer lattice points.
//!
//! # Examples
//!
//! Create a [rectangle](crate::rect::Rect):
//!
//! ```
//! # use geometry::prelude::*;
//! let rect = Rect::from_sides(10.0, 20.0, 30.0, 40.0);
//! ```
#![warn(missing_docs)]

extern crate self as geometry;

pub mod bbox;
pub mod point;
pub mod prelude;
pub mod rect;
pub mod snap;
