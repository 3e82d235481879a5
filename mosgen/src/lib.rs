//! Generates analog/custom-IC MOSFET device layouts from a netlist-derived circuit description.
//!
//! Given a [`model::Circuit`] of nmos/pmos/subckt groups and a [`tech::Tech`] rule deck, this
//! crate synthesizes each group's transistor topology (an Eulerian trail over a diffusion-net
//! multigraph, found with Fleury's algorithm) and emits the resulting mask-layer geometry,
//! including implant/nwell coverage and an optional body-tap ring. [`orchestrate::generate_circuit`]
//! is the top-level entry point.

pub mod error;
pub mod euler;
pub mod fleury;
pub mod layout;
pub mod model;
pub mod orchestrate;
pub mod pattern;
pub mod placer;
pub mod tech;
pub mod terminal;
pub mod topology;
pub mod units;

pub use error::{Error, Result};
pub use orchestrate::generate_circuit;
