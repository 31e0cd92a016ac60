//! Crate error type.

use crate::models::{VehicleKind, ZoneId};

/// Errors surfaced by graph construction, search, and scheduling.
///
/// Unreachable goals and insufficient fleets are not errors: they are
/// reported as values ([`SearchResult::unreachable`](crate::search::SearchResult::unreachable)
/// and [`InsufficientCapacity`](crate::fleet::InsufficientCapacity)).
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// A zone id was not present in the graph.
    #[error("unknown zone `{0}`")]
    UnknownZone(ZoneId),
    /// A zone id was registered twice.
    #[error("duplicate zone `{0}`")]
    DuplicateZone(ZoneId),
    /// A road weight was negative or not a number.
    #[error("invalid road {from} -> {to}: weight {weight}")]
    InvalidRoad {
        /// Source zone.
        from: ZoneId,
        /// Destination zone.
        to: ZoneId,
        /// Rejected weight.
        weight: f64,
    },
    /// Travel was estimated over a pair of zones with no road between them.
    #[error("no road between {from} and {to}")]
    MissingRoad {
        /// Source zone.
        from: ZoneId,
        /// Destination zone.
        to: ZoneId,
    },
    /// A vehicle kind has no spec in the catalog.
    #[error("vehicle kind `{0}` is not in the catalog")]
    UnknownVehicle(VehicleKind),
    /// Unrecognized search algorithm name.
    #[error("unknown algorithm `{0}` (expected BFS, DFS, UCS, Greedy or AStar)")]
    UnknownAlgorithm(String),
    /// Unrecognized resource mode name.
    #[error("unknown resource mode `{0}` (expected unlimited or bounded)")]
    UnknownMode(String),
    /// Configuration values out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Malformed JSON input.
    #[error("malformed input: {0}")]
    Input(#[from] serde_json::Error),
    /// A result sink failed to accept output.
    #[error("result sink failed: {0}")]
    Sink(#[from] std::io::Error),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, DispatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_offender() {
        let err = DispatchError::UnknownZone(ZoneId::from("Z9"));
        assert_eq!(err.to_string(), "unknown zone `Z9`");

        let err = DispatchError::UnknownAlgorithm("dijkstra".into());
        assert!(err.to_string().contains("dijkstra"));
    }

    #[test]
    fn test_input_error_converts() {
        let parse = serde_json::from_str::<Vec<u32>>("[1,").unwrap_err();
        let err: DispatchError = parse.into();
        assert!(matches!(err, DispatchError::Input(_)));
    }

    #[test]
    fn test_sink_error_keeps_source() {
        use std::error::Error as _;

        let err: DispatchError = std::io::Error::other("disk full").into();
        assert_eq!(err.to_string(), "result sink failed: disk full");
        let source = err.source().expect("io source");
        assert_eq!(source.to_string(), "disk full");
    }
}
