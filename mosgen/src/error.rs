//! Error types for MOSFET device-layout generation.

use arcstr::ArcStr;

use crate::units::ParseEngNumberError;

/// A result type returning [`Error`]s.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for mosgen functions.
///
/// All variants are fatal: there is no local retry or partial-recovery path. A malformed group
/// fails fast and no partial `shape`/`pin`/`boundary` state is retained on the group.
#[derive(thiserror::Error, Debug, Clone)]
pub enum Error {
    /// A group's finger/multiplier vectors do not form a valid topology class.
    #[error(
        "invalid topology in group `{group}`: fingers and multipliers must each be >= 1, and a \
         non-uniform multiplier vector requires every finger == 1"
    )]
    InvalidTopology {
        /// The offending group's name.
        group: ArcStr,
    },
    /// The geometry emitter encountered a row position whose adjacent terminal kinds are not
    /// one of the five admitted transitions.
    #[error("invalid node sequence at row {row}, position {position}")]
    InvalidNodeSequence {
        /// Index of the row within the group's topology.
        row: usize,
        /// Index of the position within the row.
        position: usize,
    },
    /// A design rule referenced by the geometry emitter is absent from the technology deck.
    #[error("missing rule key: {key}")]
    MissingRuleKey {
        /// A human-readable description of the missing rule tuple.
        key: String,
    },
    /// The sub-circuit placer could not find a pre-built layout for the named child cell.
    #[error("missing sub-circuit layout: {name}")]
    MissingSubckt {
        /// Name of the sub-circuit that could not be found.
        name: ArcStr,
    },
    /// A group has no instances but an operation needs at least one.
    #[error("group `{group}` has no instances")]
    EmptyGroup {
        /// The offending group's name.
        group: ArcStr,
    },
    /// An instance is missing a required terminal binding.
    #[error("instance `{instance}` is missing required terminal `{terminal}`")]
    MissingTerminal {
        /// The instance's name.
        instance: ArcStr,
        /// The terminal name that was looked up.
        terminal: String,
    },
    /// A subckt-kind instance has no `subckt_type` naming the cell it references.
    #[error("instance `{instance}` has no subckt_type")]
    MissingSubcktType {
        /// The instance's name.
        instance: ArcStr,
    },
    /// A length/width string could not be parsed as an engineering-notation number.
    #[error("failed to parse engineering-notation number: {0}")]
    ParseEngNumber(#[from] ParseEngNumberError),
}
