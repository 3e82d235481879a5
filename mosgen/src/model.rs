//! The circuit/group/instance data model shared by topology and layout generation.

use arcstr::ArcStr;
use geometry::prelude::*;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::terminal::TerminalRef;

/// A mask-layer rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    /// The mask layer name (e.g. `"pdiffusion"`, `"metal1"`).
    pub layer: ArcStr,
    /// The rectangle itself.
    pub rect: Rect,
}

impl Bbox for Shape {
    fn bbox(&self) -> Option<Rect> {
        Some(self.rect)
    }
}

/// A single electrical pin: a net name paired with the shape that exposes it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pin {
    /// The net this pin belongs to.
    pub net: ArcStr,
    /// The layer the pin shape lives on.
    pub layer: ArcStr,
    /// The pin's rectangle.
    pub rect: Rect,
}

/// A reference to a pre-built child cell, placed at a given origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InstanceRef {
    /// Origin at which the child cell's own (0, 0) lands in the parent.
    pub origin: Point,
}

/// What kind of device a [`Group`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupKind {
    /// An n-type MOSFET group.
    Nmos,
    /// A p-type MOSFET group.
    Pmos,
    /// A reference to a pre-built sub-circuit cell.
    Subckt,
}

/// Symmetry/partitioning constraints attached to a group.
///
/// `mf_sym` and `mp_sym` each take one of `"None"`, `"ID"`, `"CC"`, or a custom 2-D literal
/// pattern string like `"[012,210]"`. `tap` is a comma-separated subset of `"t"`, `"b"`, `"r"`,
/// `"l"` naming which sides of the group get a body-tap ring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Constraint {
    /// Symmetry constraint governing finger ordering within a single row.
    pub mf_sym: ArcStr,
    /// Symmetry constraint governing multiplier-row ordering.
    pub mp_sym: ArcStr,
    /// Number of rows the multiplier axis is split across.
    pub mp_row: u32,
    /// Comma-separated body-tap sides, e.g. `"t,b"`. Empty means no tap ring.
    pub tap: ArcStr,
}

impl Default for Constraint {
    fn default() -> Self {
        Constraint { mf_sym: "None".into(), mp_sym: "None".into(), mp_row: 1, tap: ArcStr::new() }
    }
}

/// One placed device (for nmos/pmos groups) or one sub-circuit reference (for subckt groups).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instance {
    /// The instance's name, as it appears in the netlist.
    pub id: ArcStr,
    /// Finger count. Required to be >= 1 for nmos/pmos instances.
    pub finger: u32,
    /// Multiplier count. Required to be >= 1 for nmos/pmos instances.
    pub multiplier: u32,
    /// Channel length, an engineering-notation string (e.g. `"1u"`).
    pub length: ArcStr,
    /// Total channel width, an engineering-notation string, split evenly across fingers.
    pub width: ArcStr,
    /// For a subckt-group instance, the name of the pre-built cell this instance refers to.
    pub subckt_type: Option<ArcStr>,
    /// Port-name to net-name bindings. For nmos/pmos instances this carries the four keys
    /// `"source"`, `"drain"`, `"gate"`, `"bulk"`; for subckt instances it carries whatever port
    /// names the referenced cell exposes.
    pub terminals: IndexMap<ArcStr, ArcStr>,
}

impl Instance {
    fn terminal(&self, name: &str) -> Result<ArcStr> {
        self.terminals
            .get(name)
            .cloned()
            .ok_or_else(|| Error::MissingTerminal { instance: self.id.clone(), terminal: name.to_string() })
    }

    /// The net bound to this instance's source.
    pub fn source(&self) -> Result<ArcStr> {
        self.terminal("source")
    }
    /// The net bound to this instance's drain.
    pub fn drain(&self) -> Result<ArcStr> {
        self.terminal("drain")
    }
    /// The net bound to this instance's gate.
    pub fn gate(&self) -> Result<ArcStr> {
        self.terminal("gate")
    }
    /// The net bound to this instance's bulk/body.
    pub fn bulk(&self) -> Result<ArcStr> {
        self.terminal("bulk")
    }
}

/// One group of instances sharing a topology and a constraint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    /// The group's name, unique within its circuit.
    pub name: ArcStr,
    /// Device kind or sub-circuit reference.
    pub kind: GroupKind,
    /// The instances making up this group.
    pub instances: Vec<Instance>,
    /// Symmetry and tap constraints.
    pub constraint: Constraint,
    /// Synthesized topology: one terminal sequence per row.
    pub topology: Vec<Vec<TerminalRef>>,
    /// Mask-layer rectangles, keyed by layer name, in emission order.
    pub shape: IndexMap<ArcStr, Vec<Shape>>,
    /// Electrical pins exposed by this group.
    pub pin: Vec<Pin>,
    /// Child-cell references (populated only for subckt groups).
    pub refs: Vec<InstanceRef>,
    /// The group's final boundary rectangle, set once layout generation completes.
    pub boundary: Option<Rect>,
}

impl Group {
    /// Creates an empty group ready for topology and layout generation.
    pub fn new(name: impl Into<ArcStr>, kind: GroupKind, instances: Vec<Instance>, constraint: Constraint) -> Self {
        Group {
            name: name.into(),
            kind,
            instances,
            constraint,
            topology: Vec::new(),
            shape: IndexMap::new(),
            pin: Vec::new(),
            refs: Vec::new(),
            boundary: None,
        }
    }

    /// Appends a rectangle to the named layer's shape list, creating the layer's entry if needed.
    pub fn push_shape(&mut self, layer: &str, rect: Rect) {
        self.shape.entry(ArcStr::from(layer)).or_default().push(Shape { layer: ArcStr::from(layer), rect });
    }

    /// The most recently appended rectangle on the named layer.
    ///
    /// # Panics
    ///
    /// Panics if the layer has no shapes yet. Every call site relies on a preceding row position
    /// having already populated the layer, which the topology's admitted transitions guarantee.
    pub fn last_shape_rect(&self, layer: &str) -> Rect {
        self.shape
            .get(layer)
            .and_then(|shapes| shapes.last())
            .unwrap_or_else(|| panic!("layer `{layer}` has no prior rectangle"))
            .rect
    }
}

/// A circuit: a named, ordered table of groups.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Circuit {
    /// The circuit's name.
    pub name: ArcStr,
    /// Groups in netlist declaration order.
    pub groups: IndexMap<ArcStr, Group>,
}

/// A pre-built child cell, as consumed by the sub-circuit placer.
#[derive(Debug, Clone)]
pub struct CellLayout {
    /// Cell width.
    pub width: f64,
    /// Cell height.
    pub height: f64,
    /// Port shapes, keyed by port name.
    pub ports: IndexMap<ArcStr, Vec<Shape>>,
}

/// A library of pre-built child cells, looked up by name during sub-circuit placement.
#[derive(Debug, Clone, Default)]
pub struct Library {
    /// Cells indexed by name.
    pub cells: IndexMap<ArcStr, CellLayout>,
}

impl Library {
    /// Looks up a pre-built cell by name.
    pub fn get(&self, name: &str) -> Option<&CellLayout> {
        self.cells.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_tracks_last_shape_per_layer() {
        let mut group = Group::new("m1", GroupKind::Nmos, vec![], Constraint::default());
        group.push_shape("pdiffusion", Rect::from_sides(0.0, 0.0, 1.0, 1.0));
        group.push_shape("pdiffusion", Rect::from_sides(2.0, 0.0, 3.0, 1.0));
        assert_eq!(group.last_shape_rect("pdiffusion"), Rect::from_sides(2.0, 0.0, 3.0, 1.0));
    }

    #[test]
    fn instance_terminal_accessors_read_the_map() {
        let mut terminals = IndexMap::new();
        terminals.insert("source".into(), "VDD".into());
        terminals.insert("drain".into(), "out".into());
        terminals.insert("gate".into(), "in".into());
        terminals.insert("bulk".into(), "VDD".into());
        let inst = Instance {
            id: "M0".into(),
            finger: 1,
            multiplier: 1,
            length: "1u".into(),
            width: "2u".into(),
            subckt_type: None,
            terminals,
        };
        assert_eq!(inst.source().unwrap(), ArcStr::from("VDD"));
        assert_eq!(inst.gate().unwrap(), ArcStr::from("in"));
    }

    #[test]
    fn missing_terminal_errors_instead_of_panicking() {
        let inst = Instance {
            id: "M0".into(),
            finger: 1,
            multiplier: 1,
            length: "1u".into(),
            width: "2u".into(),
            subckt_type: None,
            terminals: IndexMap::new(),
        };
        assert!(matches!(inst.source(), Err(Error::MissingTerminal { .. })));
    }
}
