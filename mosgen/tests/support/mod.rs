//! Shared fixtures for the end-to-end scenario tests.

use arcstr::ArcStr;
use indexmap::IndexMap;
use mosgen::model::{Constraint, GroupKind, Instance};
use mosgen::tech::Tech;

pub fn tech_deck() -> Tech {
    let mut tech = Tech::default();
    tech.unit.insert("grid".into(), 0.005);
    tech.unit.insert("db".into(), 1e-6);
    tech.min_size_rule.insert("contact".into(), 0.17);

    tech.min_spacing_rule.insert(("ngate".into(), "ngate".into(), None), 0.21);
    tech.min_spacing_rule.insert(("pgate".into(), "pgate".into(), None), 0.21);
    tech.min_spacing_rule.insert(("poly".into(), "contact".into(), None), 0.2);
    tech.min_spacing_rule.insert(("contact".into(), "contact".into(), None), 0.21);

    tech.min_enclosure_rule.insert(("ndiffusion".into(), "contact".into(), None), 0.12);
    tech.min_enclosure_rule.insert(("pdiffusion".into(), "contact".into(), None), 0.12);
    tech.min_spacing_rule.insert(("ndiffusion".into(), "ndiffusion".into(), None), 0.27);
    tech.min_spacing_rule.insert(("pdiffusion".into(), "pdiffusion".into(), None), 0.27);
    tech.min_extension_rule.insert(("poly".into(), "ndiffusion".into(), None), 0.13);
    tech.min_extension_rule.insert(("poly".into(), "pdiffusion".into(), None), 0.13);
    tech.min_extension_rule.insert(("ndiffusion".into(), "poly".into(), None), 0.06);
    tech.min_extension_rule.insert(("pdiffusion".into(), "poly".into(), None), 0.06);

    tech.min_enclosure_rule.insert(("nimplant".into(), "ndiffusion".into(), None), 0.18);
    tech.min_enclosure_rule.insert(("nimplant".into(), "ngate".into(), None), 0.18);
    tech.min_enclosure_rule.insert(("pimplant".into(), "pdiffusion".into(), None), 0.18);
    tech.min_enclosure_rule.insert(("pimplant".into(), "pgate".into(), None), 0.18);
    tech.min_area_rule.insert("nimplant".into(), 0.2);
    tech.min_area_rule.insert("pimplant".into(), 0.2);
    tech.min_width_rule.insert("nimplant".into(), 0.38);
    tech.min_width_rule.insert("pimplant".into(), 0.38);

    tech.min_enclosure_rule.insert(("nwell".into(), "pdiffusion".into(), None), 0.3);
    tech.min_area_rule.insert("nwell".into(), 0.5);

    tech.min_enclosure_rule.insert(("metal1".into(), "contact".into(), None), 0.03);
    tech.min_enclosure_rule.insert(("metal1".into(), "contact".into(), Some("end".into())), 0.06);

    tech.min_enclosure_rule.insert(("pimplant".into(), "pdiffusion".into(), Some("tap".into())), 0.18);
    tech.min_enclosure_rule.insert(("nimplant".into(), "ndiffusion".into(), Some("tap".into())), 0.18);
    tech.min_enclosure_rule.insert(("pdiffusion".into(), "contact".into(), Some("tap".into())), 0.12);
    tech.min_enclosure_rule.insert(("ndiffusion".into(), "contact".into(), Some("tap".into())), 0.12);

    tech.tap_spacing_floor = 0.2;
    tech
}

pub fn mosfet_instance(id: &str, finger: u32, multiplier: u32, length: &str, width: &str, s: &str, d: &str, g: &str, b: &str) -> Instance {
    let mut terminals = IndexMap::new();
    terminals.insert("source".into(), ArcStr::from(s));
    terminals.insert("drain".into(), ArcStr::from(d));
    terminals.insert("gate".into(), ArcStr::from(g));
    terminals.insert("bulk".into(), ArcStr::from(b));
    Instance {
        id: id.into(),
        finger,
        multiplier,
        length: length.into(),
        width: width.into(),
        subckt_type: None,
        terminals,
    }
}

pub fn constraint(mf_sym: &str, mp_sym: &str, mp_row: u32, tap: &str) -> Constraint {
    Constraint { mf_sym: mf_sym.into(), mp_sym: mp_sym.into(), mp_row, tap: tap.into() }
}

pub const NMOS: GroupKind = GroupKind::Nmos;
pub const PMOS: GroupKind = GroupKind::Pmos;
