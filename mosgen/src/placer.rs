//! Sub-circuit placement: instantiates a pre-built cell into a `subckt`-kind [`Group`].

use geometry::prelude::*;

use crate::error::{Error, Result};
use crate::model::{Group, InstanceRef, Library, Pin};

/// Places the referenced cell into `group`, copying its boundary and port geometry.
///
/// `group` must carry exactly one instance, whose `subckt_type` names the cell to place and
/// whose `terminals` map port names to the nets they connect to in the parent circuit.
pub fn place_subckt(library: &Library, group: &mut Group) -> Result<()> {
    let inst = group
        .instances
        .first()
        .ok_or_else(|| Error::EmptyGroup { group: group.name.clone() })?;
    let subckt_type = inst
        .subckt_type
        .clone()
        .ok_or_else(|| Error::MissingSubcktType { instance: inst.id.clone() })?;

    let cell = library.get(subckt_type.as_str()).ok_or_else(|| Error::MissingSubckt { name: subckt_type.clone() })?;

    group.boundary = Some(Rect::from_sides(0.0, 0.0, cell.width, cell.height));
    group.refs.push(InstanceRef { origin: Point::zero() });

    for (port, net) in inst.terminals.iter() {
        if let Some(shapes) = cell.ports.get(port.as_str()) {
            for shape in shapes {
                group.pin.push(Pin { net: net.clone(), layer: shape.layer.clone(), rect: shape.rect });
            }
        }
    }

    tracing::info!(group = %group.name, cell = %subckt_type, "placed sub-circuit reference");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CellLayout, Constraint, Group, GroupKind, Instance, Shape};
    use arcstr::ArcStr;
    use indexmap::IndexMap;

    fn sample_library() -> Library {
        let mut ports = IndexMap::new();
        ports.insert(
            ArcStr::from("a"),
            vec![Shape { layer: "metal1".into(), rect: Rect::from_sides(0.0, 0.0, 1.0, 1.0) }],
        );
        let mut cells = IndexMap::new();
        cells.insert(ArcStr::from("inv"), CellLayout { width: 5.0, height: 3.0, ports });
        Library { cells }
    }

    fn subckt_group() -> Group {
        let mut terminals = IndexMap::new();
        terminals.insert("a".into(), "net1".into());
        let inst = Instance {
            id: "X0".into(),
            finger: 1,
            multiplier: 1,
            length: ArcStr::new(),
            width: ArcStr::new(),
            subckt_type: Some("inv".into()),
            terminals,
        };
        Group::new("X0", GroupKind::Subckt, vec![inst], Constraint::default())
    }

    #[test]
    fn places_boundary_and_remaps_port_nets() {
        let library = sample_library();
        let mut group = subckt_group();
        place_subckt(&library, &mut group).unwrap();

        assert_eq!(group.boundary, Some(Rect::from_sides(0.0, 0.0, 5.0, 3.0)));
        assert_eq!(group.refs.len(), 1);
        assert_eq!(group.pin.len(), 1);
        assert_eq!(group.pin[0].net, ArcStr::from("net1"));
    }

    #[test]
    fn missing_cell_errors() {
        let library = Library::default();
        let mut group = subckt_group();
        assert!(matches!(place_subckt(&library, &mut group), Err(Error::MissingSubckt { .. })));
    }

    #[test]
    fn empty_group_errors_instead_of_panicking() {
        let library = sample_library();
        let mut group = Group::new("X0", GroupKind::Subckt, vec![], Constraint::default());
        assert!(matches!(place_subckt(&library, &mut group), Err(Error::EmptyGroup { .. })));
    }

    #[test]
    fn missing_subckt_type_errors_instead_of_panicking() {
        let library = sample_library();
        let mut terminals = IndexMap::new();
        terminals.insert("a".into(), "net1".into());
        let inst = Instance {
            id: "X0".into(),
            finger: 1,
            multiplier: 1,
            length: ArcStr::new(),
            width: ArcStr::new(),
            subckt_type: None,
            terminals,
        };
        let mut group = Group::new("X0", GroupKind::Subckt, vec![inst], Constraint::default());
        assert!(matches!(place_subckt(&library, &mut group), Err(Error::MissingSubcktType { .. })));
    }
}
