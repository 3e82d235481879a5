//! Terminal records: the nodes of a topology row.

use std::rc::Rc;

use arcstr::ArcStr;
use serde::{Deserialize, Serialize};

/// The kind of a [`Terminal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminalKind {
    /// A diffusion (source/drain) terminal.
    Diff,
    /// A gate terminal.
    Gate,
}

/// A node in a topology row: either a diffusion endpoint or a gate.
///
/// Terminal records are created once by the topology builder and shared by reference between
/// a row's terminal list and the Euler multigraph's half-edges; they are never deep-copied or
/// mutated after creation, so two occurrences of the same instance's source terminal are
/// guaranteed to be the same allocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Terminal {
    /// Diffusion or gate.
    pub kind: TerminalKind,
    /// The net this terminal connects to. Empty for a dummy gate's floating poly.
    pub net: ArcStr,
    /// Channel length, in database units.
    pub length: f64,
    /// Channel width, in database units (already divided by the instance's finger count).
    pub width: f64,
}

/// A shared handle to a [`Terminal`].
pub type TerminalRef = Rc<Terminal>;

impl Terminal {
    /// Builds a new terminal record, wrapped for sharing between a row and the multigraph.
    pub fn new_shared(kind: TerminalKind, net: impl Into<ArcStr>, length: f64, width: f64) -> TerminalRef {
        Rc::new(Terminal { kind, net: net.into(), length, width })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_terminals_compare_by_value() {
        let a = Terminal::new_shared(TerminalKind::Diff, "VDD", 1.0, 2.0);
        let b = Terminal::new_shared(TerminalKind::Diff, "VDD", 1.0, 2.0);
        assert_eq!(a, b);
        assert!(!Rc::ptr_eq(&a, &b));
    }
}
