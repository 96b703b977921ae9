//! Error types for shiftplan

use thiserror::Error;

/// Main error type for shiftplan operations
#[derive(Debug, Error)]
pub enum ShiftplanError {
    /// Zero-length or unparsable time range
    #[error("Malformed interval for {entity}: {reason}")]
    MalformedInterval { entity: String, reason: String },

    /// An entity references a role or id that does not exist
    #[error("{entity} references unknown {kind} '{reference}'")]
    UnknownReference {
        entity: String,
        kind: &'static str,
        reference: String,
    },

    /// Two entities of the same kind share an id
    #[error("Duplicate {kind} id '{id}'")]
    DuplicateId { kind: &'static str, id: String },

    /// Structurally invalid input value (negative counts, bad skill lists)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Segment count for a role/day exceeded the hard threshold
    #[error("Segment explosion for role '{role}' on {day}: {count} segments exceed hard limit {limit}")]
    SegmentExplosion {
        role: String,
        day: String,
        count: usize,
        limit: usize,
    },

    /// A window segment has no shift that could ever staff it
    #[error("Window '{window}' has no covering shift between minute {start} and {end} on {day}")]
    UncoverableWindow {
        window: String,
        day: String,
        start: u32,
        end: u32,
    },

    /// Normalized weights do not preserve lexicographic separation
    #[error("Weight dominance violated between '{higher}' and '{lower}': {detail}")]
    WeightDominanceViolation {
        higher: String,
        lower: String,
        detail: String,
    },

    /// Error in planner configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// The engine exhausted its time budget without proving optimality
    #[error("Solver timed out after {elapsed_ms} ms (incumbent found: {has_incumbent})")]
    SolverTimeout { elapsed_ms: u64, has_incumbent: bool },

    /// The engine proved the problem infeasible
    #[error("Problem is infeasible; dominant constraint family: {dominant_family}")]
    SolverInfeasible { dominant_family: String },

    /// The run was cancelled before completion
    #[error("Run was cancelled")]
    Cancelled,

    /// The external engine failed for reasons of its own
    #[error("Engine error: {0}")]
    Engine(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ShiftplanError {
    pub fn malformed(entity: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedInterval {
            entity: entity.into(),
            reason: reason.into(),
        }
    }

    pub fn unknown(entity: impl Into<String>, kind: &'static str, reference: impl Into<String>) -> Self {
        Self::UnknownReference {
            entity: entity.into(),
            kind,
            reference: reference.into(),
        }
    }

    /// Returns true if retrying with a larger budget may succeed.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::SolverTimeout { .. })
    }
}

/// Result type alias for shiftplan operations
pub type Result<T> = std::result::Result<T, ShiftplanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_timeout_is_recoverable() {
        let timeout = ShiftplanError::SolverTimeout {
            elapsed_ms: 10,
            has_incumbent: false,
        };
        let infeasible = ShiftplanError::SolverInfeasible {
            dominant_family: "rest".to_string(),
        };
        assert!(timeout.is_recoverable());
        assert!(!infeasible.is_recoverable());
        assert!(!ShiftplanError::Cancelled.is_recoverable());
    }

    #[test]
    fn test_display_names_reference() {
        let err = ShiftplanError::unknown("window W1", "role", "chef");
        assert_eq!(err.to_string(), "window W1 references unknown role 'chef'");
    }
}
