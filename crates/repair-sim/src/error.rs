//! Error type for the repair simulator
//!
//! Every variant here is a configuration or usage problem. A repair attempt that
//! fails to restore its shares is a normal outcome and is reported through
//! [`RepairOutcome`](crate::repair::RepairOutcome), never through this type.

use crate::ids::ParticipantId;

/// Unified error type for simulator operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimError {
    /// The design has no blocks, so there is nobody to repair
    #[error("Invalid design: no blocks supplied")]
    EmptyDesign,

    /// A block carries no shares
    #[error("Invalid design: block {index} is empty")]
    EmptyBlock {
        /// Position of the offending block
        index: usize,
    },

    /// Fault kind string did not name a known fault model
    #[error("Unknown fault kind '{value}', expected 'Permanent' or 'Transient'")]
    UnknownFaultKind {
        /// The rejected input
        value: String,
    },

    /// Repair algorithm name did not match any known algorithm
    #[error("Unknown repair algorithm '{value}'")]
    UnknownAlgorithm {
        /// The rejected input
        value: String,
    },

    /// Availability probability outside `[0, 1]`
    #[error("Invalid availability probability {value}: must lie in [0, 1]")]
    InvalidProbability {
        /// The rejected value
        value: f64,
    },

    /// Participant id not present in the registry
    #[error("Unknown participant {id}")]
    UnknownParticipant {
        /// The requested id
        id: ParticipantId,
    },

    /// An operation needed the derived indices before `index()` ran
    #[error("Registry has not been indexed")]
    NotIndexed,

    /// Sweep or repair parameters are unusable
    #[error("Invalid configuration: {message}")]
    Config {
        /// What was wrong
        message: String,
    },

    /// Design, sweep config or option text could not be parsed
    #[error("Parse error: {message}")]
    Parse {
        /// Parser message with context
        message: String,
    },

    /// Reading or writing a file failed
    #[error("IO error: {message}")]
    Io {
        /// Underlying IO message with context
        message: String,
    },

    /// Result serialization failed
    #[error("Serialization error: {message}")]
    Serialization {
        /// Encoder message
        message: String,
    },
}

impl SimError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a parse error
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Create an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Whether this error stems from bad input configuration.
    ///
    /// These are raised before any trial runs.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::EmptyDesign
                | Self::EmptyBlock { .. }
                | Self::UnknownFaultKind { .. }
                | Self::UnknownAlgorithm { .. }
                | Self::InvalidProbability { .. }
                | Self::NotIndexed
                | Self::Config { .. }
                | Self::Parse { .. }
        )
    }
}

/// Standard Result type for simulator operations
pub type Result<T> = std::result::Result<T, SimError>;

impl From<std::io::Error> for SimError {
    fn from(err: std::io::Error) -> Self {
        Self::io(err.to_string())
    }
}

impl From<serde_json::Error> for SimError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err.to_string())
    }
}

impl From<toml::de::Error> for SimError {
    fn from(err: toml::de::Error) -> Self {
        Self::parse(err.to_string())
    }
}
