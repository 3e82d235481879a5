//! Walks a circuit's groups in declaration order, generating topology and layout for each.

use crate::error::Result;
use crate::layout;
use crate::model::{Circuit, GroupKind, Library};
use crate::placer;
use crate::tech::Tech;
use crate::topology;

/// Generates topology, geometry, pins, and boundary for every group in `circuit`.
///
/// `library` resolves any `subckt`-kind group's reference to a pre-built cell; it is expected to
/// already contain every cell named by a `subckt` instance in this circuit.
pub fn generate_circuit(tech: &Tech, circuit: &mut Circuit, library: &Library) -> Result<()> {
    tracing::info!(circuit = %circuit.name, groups = circuit.groups.len(), "generating circuit layout");

    for (name, group) in circuit.groups.iter_mut() {
        let span = tracing::info_span!("group", name = %name, kind = ?group.kind);
        let _enter = span.enter();

        match group.kind {
            GroupKind::Nmos | GroupKind::Pmos => {
                topology::generate_topology(tech, group)?;
                layout::generate_layout(tech, group)?;
            }
            GroupKind::Subckt => {
                placer::place_subckt(library, group)?;
            }
        }
        tracing::debug!("group layout complete");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Constraint, Group, Instance};
    use arcstr::ArcStr;
    use indexmap::IndexMap;

    fn tech_deck() -> Tech {
        let mut tech = Tech::default();
        tech.unit.insert("grid".into(), 0.005);
        tech.unit.insert("db".into(), 1e-6);
        tech.min_size_rule.insert("contact".into(), 0.17);
        tech.min_spacing_rule.insert(("ngate".into(), "ngate".into(), None), 0.21);
        tech.min_spacing_rule.insert(("poly".into(), "contact".into(), None), 0.2);
        tech.min_spacing_rule.insert(("contact".into(), "contact".into(), None), 0.21);
        tech.min_enclosure_rule.insert(("ndiffusion".into(), "contact".into(), None), 0.12);
        tech.min_spacing_rule.insert(("ndiffusion".into(), "ndiffusion".into(), None), 0.27);
        tech.min_extension_rule.insert(("poly".into(), "ndiffusion".into(), None), 0.13);
        tech.min_extension_rule.insert(("ndiffusion".into(), "poly".into(), None), 0.06);
        tech.min_enclosure_rule.insert(("nimplant".into(), "ndiffusion".into(), None), 0.18);
        tech.min_enclosure_rule.insert(("nimplant".into(), "ngate".into(), None), 0.18);
        tech.min_area_rule.insert("nimplant".into(), 0.2);
        tech.min_width_rule.insert("nimplant".into(), 0.38);
        tech.min_enclosure_rule.insert(("nwell".into(), "pdiffusion".into(), None), 0.3);
        tech.min_area_rule.insert("nwell".into(), 0.5);
        tech.min_enclosure_rule.insert(("metal1".into(), "contact".into(), None), 0.03);
        tech.min_enclosure_rule.insert(("metal1".into(), "contact".into(), Some("end".into())), 0.06);
        tech.min_enclosure_rule.insert(("pimplant".into(), "pdiffusion".into(), Some("tap".into())), 0.18);
        tech.min_enclosure_rule.insert(("pdiffusion".into(), "contact".into(), Some("tap".into())), 0.12);
        tech.min_area_rule.insert("pimplant".into(), 0.2);
        tech.min_width_rule.insert("pimplant".into(), 0.38);
        tech.tap_spacing_floor = 0.2;
        tech
    }

    #[test]
    fn single_nmos_group_generates_a_boundary() {
        let tech = tech_deck();
        let mut terminals = IndexMap::new();
        terminals.insert("source".into(), "VSS".into());
        terminals.insert("drain".into(), "out".into());
        terminals.insert("gate".into(), "in".into());
        terminals.insert("bulk".into(), "VSS".into());
        let inst = Instance {
            id: "M0".into(),
            finger: 1,
            multiplier: 1,
            length: "150n".into(),
            width: "1u".into(),
            subckt_type: None,
            terminals,
        };
        let group = Group::new("M0", crate::model::GroupKind::Nmos, vec![inst], Constraint::default());

        let mut groups = IndexMap::new();
        groups.insert(ArcStr::from("M0"), group);
        let mut circuit = Circuit { name: "top".into(), groups };

        generate_circuit(&tech, &mut circuit, &Library::default()).unwrap();

        let built = &circuit.groups["M0"];
        assert!(built.boundary.is_some());
        assert!(!built.pin.is_empty());
    }
}
