//! Classifies a group's finger/multiplier vectors, selects an instance ordering, builds the
//! per-row Euler multigraph, and runs Fleury's algorithm to produce the group's topology.

use arcstr::ArcStr;

use crate::error::{Error, Result};
use crate::euler::Multigraph;
use crate::fleury::fleury_trail;
use crate::model::{Constraint, Group, GroupKind};
use crate::pattern::{self, Token};
use crate::tech::Tech;
use crate::terminal::{Terminal, TerminalKind, TerminalRef};
use crate::units::parse_eng_number;

/// Which generation strategy a group's finger/multiplier vectors call for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Classification {
    /// Every instance has multiplier 1: a single row of fingers.
    MultiFinger,
    /// Every instance has finger 1: one or more rows, each an independent diffusion island.
    Multiplier,
    /// Uniform multiplier > 1 and uniform finger > 1: a finger row repeated per row.
    Hybrid,
}

fn distinct_sorted(values: &[u32]) -> Vec<u32> {
    let mut v = values.to_vec();
    v.sort_unstable();
    v.dedup();
    v
}

fn classify(fingers: &[u32], multipliers: &[u32]) -> Option<Classification> {
    if fingers.iter().any(|&f| f == 0) || multipliers.iter().any(|&m| m == 0) {
        return None;
    }

    let mult_distinct = distinct_sorted(multipliers);
    let fin_distinct = distinct_sorted(fingers);

    if mult_distinct.len() == 1 {
        let m = mult_distinct[0];
        if m == 1 {
            return Some(Classification::MultiFinger);
        }
        if fin_distinct.len() == 1 {
            return if fin_distinct[0] == 1 { Some(Classification::Multiplier) } else { Some(Classification::Hybrid) };
        }
        // Mixed fingers, uniform multiplier > 1: some finger is necessarily > 1.
        return Some(Classification::Hybrid);
    }

    // Mixed multiplier is only meaningful when every instance has a single finger.
    if fin_distinct.len() == 1 && fin_distinct[0] == 1 && mult_distinct.iter().any(|&m| m > 1) {
        return Some(Classification::Multiplier);
    }
    None
}

fn flatten(rows: Vec<Vec<Token>>) -> Vec<Token> {
    rows.into_iter().flatten().collect()
}

fn mf_order(constraint: &Constraint, fingers: &[u32]) -> Result<Vec<Token>> {
    let order = match constraint.mf_sym.as_str() {
        "None" => pattern::clustered_1d(fingers),
        "ID" => pattern::interdigitated_simple_1d(fingers),
        "CC" => pattern::common_centroid_1d(fingers),
        s if pattern::is_literal_pattern(s) => flatten(pattern::custom_2d(s)),
        other => return Err(Error::MissingRuleKey { key: format!("unknown mf_sym constraint `{other}`") }),
    };
    tracing::debug!(?order, "multi-finger instance ordering");
    Ok(order)
}

fn mp_order(constraint: &Constraint, multipliers: &[u32]) -> Result<Vec<Vec<Token>>> {
    let rows = match (constraint.mp_sym.as_str(), constraint.mp_row) {
        ("None", 1) => vec![pattern::clustered_1d(multipliers)],
        ("ID", _) => vec![pattern::interdigitated_simple_1d(multipliers)],
        ("CC", _) => vec![pattern::common_centroid_1d(multipliers)],
        ("None", row) if row > 1 => pattern::clustered_2d(multipliers, row as usize),
        (s, _) if pattern::is_literal_pattern(s) => pattern::custom_2d(s),
        (other, row) => {
            return Err(Error::MissingRuleKey { key: format!("unknown mp_sym/mp_row constraint `{other}`/{row}") })
        }
    };
    tracing::debug!(?rows, "multiplier row ordering");
    Ok(rows)
}

/// Builds the per-row Euler multigraph for `order`, skipping padding positions: a dummy token
/// contributes no device, so it simply compacts the row rather than inserting a placeholder
/// edge (the original pattern library's dummy padding was never paired with a defined dummy
/// device in edge construction).
fn build_row_multigraph(tech: &Tech, group: &Group, order: &[Token]) -> Result<Multigraph> {
    let db_unit = tech.db_unit()?;
    let mut graph = Multigraph::new();
    for tok in order {
        let idx = match tok {
            Token::Class(idx) => *idx,
            Token::Dummy => continue,
        };
        let inst = &group.instances[idx];
        let length = parse_eng_number(inst.length.as_str())? / db_unit;
        let width = parse_eng_number(inst.width.as_str())? / db_unit / inst.finger as f64;

        let source = Terminal::new_shared(TerminalKind::Diff, inst.source()?, length, width);
        let gate = Terminal::new_shared(TerminalKind::Gate, inst.gate()?, length, width);
        let drain = Terminal::new_shared(TerminalKind::Diff, inst.drain()?, length, width);
        graph.add_edge(source, drain, vec![gate]);
    }
    Ok(graph)
}

fn generate_multi_finger_topology(tech: &Tech, group: &Group) -> Result<Vec<TerminalRef>> {
    let fingers: Vec<u32> = group.instances.iter().map(|i| i.finger).collect();
    let order = mf_order(&group.constraint, &fingers)?;
    let mut graph = build_row_multigraph(tech, group, &order)?;
    Ok(fleury_trail(&mut graph, true))
}

fn generate_multiplier_topology(tech: &Tech, group: &Group) -> Result<Vec<Vec<TerminalRef>>> {
    let multipliers: Vec<u32> = group.instances.iter().map(|i| i.multiplier).collect();
    let rows = mp_order(&group.constraint, &multipliers)?;
    rows.into_iter()
        .map(|row| {
            let mut graph = build_row_multigraph(tech, group, &row)?;
            Ok(fleury_trail(&mut graph, false))
        })
        .collect()
}

fn generate_hybrid_topology(tech: &Tech, group: &Group) -> Result<Vec<Vec<TerminalRef>>> {
    let mf_row = generate_multi_finger_topology(tech, group)?;
    let multiplier = group.instances[0].multiplier;
    let mp_row = group.constraint.mp_row;
    let per_row = multiplier / mp_row.max(1);

    let first = mf_row.first().cloned().expect("a finger row always has at least one terminal");
    let last = mf_row.last().cloned().expect("a finger row always has at least one terminal");
    let middle: Vec<TerminalRef> = mf_row[1..mf_row.len() - 1].to_vec();

    let mut rows = Vec::with_capacity(mp_row as usize);
    for _ in 0..mp_row {
        let mut graph = Multigraph::new();
        for _ in 0..per_row {
            graph.add_edge(first.clone(), last.clone(), middle.clone());
        }
        rows.push(fleury_trail(&mut graph, false));
    }
    Ok(rows)
}

/// Synthesizes `group.topology` from its instances' finger/multiplier vectors and constraint.
pub fn generate_topology(tech: &Tech, group: &mut Group) -> Result<()> {
    let fingers: Vec<u32> = group.instances.iter().map(|i| i.finger).collect();
    let multipliers: Vec<u32> = group.instances.iter().map(|i| i.multiplier).collect();

    let classification =
        classify(&fingers, &multipliers).ok_or_else(|| Error::InvalidTopology { group: group.name.clone() })?;

    let rows = match classification {
        Classification::MultiFinger => {
            tracing::info!(group = %group.name, "multi-finger topology");
            vec![generate_multi_finger_topology(tech, group)?]
        }
        Classification::Multiplier => {
            tracing::info!(group = %group.name, "multiplier topology");
            generate_multiplier_topology(tech, group)?
        }
        Classification::Hybrid => {
            tracing::info!(group = %group.name, "hybrid multi-finger/multiplier topology");
            generate_hybrid_topology(tech, group)?
        }
    };

    group.topology = rows;
    Ok(())
}

/// Pads a row with dummy boundary devices bound to the supply/ground net, matching the length
/// and width of the row's second-from-each-end node. Not called automatically by
/// [`generate_topology`]; available for an orchestration layer that wants dummy-decorated rows.
pub fn pad_with_dummy(row: &[TerminalRef], kind: GroupKind, finger: bool) -> Vec<TerminalRef> {
    assert!(row.len() >= 3, "a row needs at least one interior node to derive dummy dimensions from");
    let supply: ArcStr = if kind == GroupKind::Pmos { "VDD".into() } else { "GND".into() };

    let left_ref = &row[1];
    let right_ref = &row[row.len() - 2];
    let left_diff = Terminal::new_shared(TerminalKind::Diff, supply.clone(), left_ref.length, left_ref.width);
    let left_gate = Terminal::new_shared(TerminalKind::Gate, ArcStr::new(), left_ref.length, left_ref.width);
    let right_diff = Terminal::new_shared(TerminalKind::Diff, supply, right_ref.length, right_ref.width);
    let right_gate = Terminal::new_shared(TerminalKind::Gate, ArcStr::new(), right_ref.length, right_ref.width);

    let mut out = Vec::with_capacity(row.len() + 4);
    if finger {
        out.push(left_diff);
        out.push(left_gate);
        out.extend(row.iter().cloned());
        out.push(right_gate);
        out.push(right_diff);
    } else {
        out.push(left_diff.clone());
        out.push(left_gate);
        out.push(left_diff);
        out.extend(row.iter().cloned());
        out.push(right_diff.clone());
        out.push(right_gate);
        out.push(right_diff);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_uniform_multiplier_one_as_multi_finger() {
        assert_eq!(classify(&[1, 3], &[1, 1]), Some(Classification::MultiFinger));
    }

    #[test]
    fn classifies_uniform_finger_one_as_multiplier() {
        assert_eq!(classify(&[1, 1], &[2, 2]), Some(Classification::Multiplier));
    }

    #[test]
    fn classifies_uniform_finger_and_multiplier_above_one_as_hybrid() {
        assert_eq!(classify(&[2, 2], &[2, 2]), Some(Classification::Hybrid));
    }

    #[test]
    fn zero_finger_or_multiplier_is_invalid() {
        assert_eq!(classify(&[0], &[1]), None);
        assert_eq!(classify(&[1], &[0]), None);
    }

    #[test]
    fn mixed_multiplier_with_any_finger_above_one_is_invalid() {
        assert_eq!(classify(&[2, 2], &[1, 2]), None);
    }
}
