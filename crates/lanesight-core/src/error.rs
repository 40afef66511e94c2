//! Error types for the lanesight observation framework.
//!
//! Split by origin: [`SceneError`] is raised by the simulation
//! collaborators (TTC routine, renderer) and [`ObsError`] by the
//! encoders themselves. Collaborator failures are wrapped unchanged in
//! [`ObsError::Scene`] so callers can still inspect them via `source()`.

use thiserror::Error;

/// Errors reported by a [`Scene`](crate::Scene) collaborator.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SceneError {
    /// The scene has no time-to-collision routine.
    #[error("scene does not provide a time-to-collision grid")]
    TtcUnavailable,
    /// The scene has no rendering backend.
    #[error("scene does not provide rendered frames")]
    RenderUnavailable,
    /// The collaborator produced data that violates its own contract.
    #[error("malformed scene data: {reason}")]
    Malformed {
        /// Description of the malformation.
        reason: String,
    },
}

/// Errors from observation encoder construction and execution.
///
/// Configuration variants ([`is_configuration`](Self::is_configuration))
/// are only ever returned while building an encoder; every other variant
/// aborts a single `observe()` call without producing a partial tensor.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ObsError {
    /// The configuration tag does not name a registered encoder.
    #[error("unknown observation type '{tag}'")]
    UnknownObservationType {
        /// The rejected tag.
        tag: String,
    },
    /// A feature name in the configuration is not extractable.
    #[error("unknown feature '{name}'")]
    UnknownFeature {
        /// The rejected feature name.
        name: String,
    },
    /// A configuration option is missing, malformed, or out of range.
    #[error("invalid observation config: {reason}")]
    InvalidConfig {
        /// Description of the problem.
        reason: String,
    },
    /// The encoder was configured in a mode it cannot execute.
    #[error("unsupported observation mode: {reason}")]
    UnsupportedMode {
        /// Description of the unsupported mode.
        reason: String,
    },
    /// The scene does not expose a requested attribute.
    #[error("attribute '{name}' is not exposed by the scene")]
    MissingAttribute {
        /// Name of the missing attribute.
        name: String,
    },
    /// Observation failed mid-extraction.
    #[error("observation failed: {reason}")]
    ExecutionFailed {
        /// Description of the failure.
        reason: String,
    },
    /// A scene collaborator failed.
    #[error("scene collaborator failed")]
    Scene(#[from] SceneError),
}

impl ObsError {
    /// Whether this error belongs to the construction-time configuration
    /// family (unknown tag, unknown feature, invalid option).
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::UnknownObservationType { .. }
                | Self::UnknownFeature { .. }
                | Self::InvalidConfig { .. }
                | Self::MissingAttribute { .. }
        )
    }

    /// Shorthand for [`ObsError::InvalidConfig`].
    pub fn config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Shorthand for [`ObsError::ExecutionFailed`].
    pub fn execution(reason: impl Into<String>) -> Self {
        Self::ExecutionFailed {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn scene_error_is_exposed_as_source() {
        let err = ObsError::from(SceneError::TtcUnavailable);
        let source = err.source().expect("scene errors carry a source");
        assert_eq!(
            source.to_string(),
            "scene does not provide a time-to-collision grid"
        );
    }

    #[test]
    fn configuration_family() {
        assert!(ObsError::UnknownObservationType { tag: "x".into() }.is_configuration());
        assert!(ObsError::config("bad").is_configuration());
        assert!(!ObsError::execution("boom").is_configuration());
        assert!(!ObsError::UnsupportedMode {
            reason: "absolute".into()
        }
        .is_configuration());
    }

    #[test]
    fn display_includes_reason() {
        let err = ObsError::UnknownFeature {
            name: "heading".into(),
        };
        assert_eq!(err.to_string(), "unknown feature 'heading'");
    }
}
