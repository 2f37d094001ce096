use pathworld_common::{NodeId, PolygonError, TerrainType};
use pathworld_stream::StreamError;

use crate::format::FormatVersion;

/// Structural errors that abort a world load. The world stays null.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("stream truncated: needed {needed} bytes, {available} available")]
    TruncatedStream { needed: u64, available: u64 },
    #[error("world has no {0}")]
    EmptyGraph(&'static str),
    #[error("{what} index {index} out of range (limit {limit})")]
    CorruptIndex {
        what: &'static str,
        index: u64,
        limit: u64,
    },
    #[error("node {node} has unknown terrain type ordinal {raw}")]
    UnknownTerrain { node: usize, raw: i32 },
    #[error("node {node} has non-finite {what} {value}")]
    InvalidNode {
        node: usize,
        what: &'static str,
        value: f32,
    },
    #[error("node {node} has an invalid polygon: {reason}")]
    InvalidPolygon {
        node: usize,
        #[source]
        reason: PolygonError,
    },
    #[error("edge {edge} has invalid distance {distance}")]
    InvalidEdgeWeight { edge: usize, distance: f32 },
    #[error("edge {edge} joins ocean and land: {from} ({from_kind}) to {to} ({to_kind})")]
    InconsistentTerrain {
        edge: usize,
        from: NodeId,
        to: NodeId,
        from_kind: TerrainType,
        to_kind: TerrainType,
    },
    #[error("format version mismatch: file has v{found}, expected v{expected}")]
    VersionMismatch {
        found: FormatVersion,
        expected: FormatVersion,
    },
}

impl From<StreamError> for LoadError {
    fn from(e: StreamError) -> Self {
        match e {
            StreamError::Io(io) => LoadError::Io(io),
            StreamError::Truncated { needed, available } => {
                LoadError::TruncatedStream { needed, available }
            }
        }
    }
}

/// Expected, recoverable query failures.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum QueryError {
    #[error("no region contains point ({x}, {y})")]
    NotFound { x: f32, y: f32 },
    #[error("no path from {from} to {to}")]
    NoPath { from: NodeId, to: NodeId },
}

/// Invalid agent movement profile.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum AgentError {
    #[error("speed {speed} on {terrain} must be finite and non-negative")]
    InvalidSpeed { terrain: TerrainType, speed: f32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncated_stream_maps_to_load_error() {
        let err: LoadError = StreamError::Truncated {
            needed: 16,
            available: 4,
        }
        .into();
        assert!(matches!(
            err,
            LoadError::TruncatedStream {
                needed: 16,
                available: 4
            }
        ));
    }

    #[test]
    fn messages_name_the_offender() {
        let err = LoadError::InvalidEdgeWeight {
            edge: 3,
            distance: -1.0,
        };
        assert_eq!(err.to_string(), "edge 3 has invalid distance -1");

        let err = QueryError::NoPath {
            from: NodeId(1),
            to: NodeId(2),
        };
        assert_eq!(err.to_string(), "no path from #1 to #2");
    }
}
