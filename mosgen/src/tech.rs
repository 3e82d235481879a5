//! The technology rule deck consumed by the geometry emitter.

use std::collections::HashMap;

use arcstr::ArcStr;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A two-layer rule key, optionally qualified (e.g. by `"tap"` or `"end"`).
pub type RuleKey = (ArcStr, ArcStr, Option<ArcStr>);

/// A read-only technology rule deck.
///
/// Built once, by a downstream tech-deck reader that is out of scope for this crate, and shared
/// by reference across every group a circuit lays out.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Tech {
    /// Scalar units: `"grid"` (snap resolution) and `"db"` (database unit), both in the same
    /// real-valued length unit as instance `length`/`width` strings.
    pub unit: HashMap<ArcStr, f64>,
    /// Per-layer minimum size (e.g. the contact's fixed width and height).
    pub min_size_rule: HashMap<ArcStr, f64>,
    /// Per-layer minimum width.
    pub min_width_rule: HashMap<ArcStr, f64>,
    /// Per-layer minimum area.
    pub min_area_rule: HashMap<ArcStr, f64>,
    /// Minimum spacing between two layers, optionally qualified.
    pub min_spacing_rule: HashMap<RuleKey, f64>,
    /// Minimum enclosure of one layer by another, optionally qualified.
    pub min_enclosure_rule: HashMap<RuleKey, f64>,
    /// Minimum extension of one layer past another, optionally qualified.
    pub min_extension_rule: HashMap<RuleKey, f64>,
    /// Floor on body-tap separation. Lifted out of the hard-coded `0.2` the original generator
    /// carried inline; a tech deck (or a generator default) is expected to set this explicitly.
    pub tap_spacing_floor: f64,
}

impl Tech {
    /// The manufacturing grid.
    pub fn grid(&self) -> Result<f64> {
        self.unit
            .get("grid")
            .copied()
            .ok_or_else(|| Error::MissingRuleKey { key: "unit[grid]".into() })
    }

    /// The database unit.
    pub fn db_unit(&self) -> Result<f64> {
        self.unit
            .get("db")
            .copied()
            .ok_or_else(|| Error::MissingRuleKey { key: "unit[db]".into() })
    }

    /// Minimum size of a layer (e.g. a contact's fixed square size).
    pub fn min_size(&self, layer: &str) -> Result<f64> {
        self.min_size_rule
            .get(layer)
            .copied()
            .ok_or_else(|| Error::MissingRuleKey { key: format!("min_size_rule[{layer}]") })
    }

    /// Minimum width of a layer.
    pub fn min_width(&self, layer: &str) -> Result<f64> {
        self.min_width_rule
            .get(layer)
            .copied()
            .ok_or_else(|| Error::MissingRuleKey { key: format!("min_width_rule[{layer}]") })
    }

    /// Minimum area of a layer.
    pub fn min_area(&self, layer: &str) -> Result<f64> {
        self.min_area_rule
            .get(layer)
            .copied()
            .ok_or_else(|| Error::MissingRuleKey { key: format!("min_area_rule[{layer}]") })
    }

    /// Minimum spacing between `a` and `b`, unqualified.
    pub fn min_spacing(&self, a: &str, b: &str) -> Result<f64> {
        self.rule(&self.min_spacing_rule, a, b, None, "min_spacing_rule")
    }

    /// Minimum enclosure of `a` by `b`, unqualified.
    pub fn min_enclosure(&self, a: &str, b: &str) -> Result<f64> {
        self.rule(&self.min_enclosure_rule, a, b, None, "min_enclosure_rule")
    }

    /// Minimum enclosure of `a` by `b`, qualified (e.g. by `"tap"` or `"end"`).
    pub fn min_enclosure_qualified(&self, a: &str, b: &str, qualifier: &str) -> Result<f64> {
        self.rule(&self.min_enclosure_rule, a, b, Some(qualifier), "min_enclosure_rule")
    }

    /// Minimum extension of `a` past `b`, unqualified.
    pub fn min_extension(&self, a: &str, b: &str) -> Result<f64> {
        self.rule(&self.min_extension_rule, a, b, None, "min_extension_rule")
    }

    /// Optional tap spacing: defaults to 0 when absent, per the spec's carve-out for
    /// `"tap"`-qualified spacing keys (every other rule key is mandatory).
    pub fn min_spacing_tap_or_zero(&self, a: &str, b: &str) -> f64 {
        let key = (ArcStr::from(a), ArcStr::from(b), Some(ArcStr::from("tap")));
        self.min_spacing_rule.get(&key).copied().unwrap_or(0.0)
    }

    fn rule(
        &self,
        table: &HashMap<RuleKey, f64>,
        a: &str,
        b: &str,
        qualifier: Option<&str>,
        table_name: &str,
    ) -> Result<f64> {
        let key = (ArcStr::from(a), ArcStr::from(b), qualifier.map(ArcStr::from));
        table.get(&key).copied().ok_or_else(|| Error::MissingRuleKey {
            key: format!(
                "{table_name}[({a}, {b}{})]",
                qualifier.map(|q| format!(", {q}")).unwrap_or_default()
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tech() -> Tech {
        let mut tech = Tech::default();
        tech.unit.insert("grid".into(), 0.005);
        tech.unit.insert("db".into(), 1e-6);
        tech.min_size_rule.insert("contact".into(), 0.17);
        tech.min_spacing_rule
            .insert(("poly".into(), "poly".into(), None), 0.21);
        tech.min_spacing_rule.insert(
            ("nimplant".into(), "pdiffusion".into(), Some("tap".into())),
            0.0,
        );
        tech
    }

    #[test]
    fn required_rule_present() {
        let tech = sample_tech();
        assert_eq!(tech.grid().unwrap(), 0.005);
        assert_eq!(tech.min_spacing("poly", "poly").unwrap(), 0.21);
    }

    #[test]
    fn missing_required_rule_errors() {
        let tech = sample_tech();
        assert!(matches!(
            tech.min_spacing("contact", "contact"),
            Err(Error::MissingRuleKey { .. })
        ));
    }

    #[test]
    fn missing_tap_spacing_defaults_to_zero() {
        let tech = sample_tech();
        assert_eq!(tech.min_spacing_tap_or_zero("timplant", "pdiffusion"), 0.0);
    }
}
