//! Peer availability fault model
//!
//! Each contact with a peer draws once against the availability probability.
//! Under [`FaultKind::Transient`] a failed draw only skips that contact; under
//! [`FaultKind::Permanent`] the peer is out for the rest of the trial.

use crate::error::{Result, SimError};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How long a failed availability draw lasts
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FaultKind {
    /// Unavailability is never remembered; the peer may be retried
    Transient,
    /// The first failed draw removes the peer for the remainder of the trial
    Permanent,
}

impl FaultKind {
    /// Both fault kinds, in default sweep order
    pub const ALL: [FaultKind; 2] = [FaultKind::Permanent, FaultKind::Transient];

    /// Canonical name
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Transient => "Transient",
            Self::Permanent => "Permanent",
        }
    }
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FaultKind {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "transient" => Ok(Self::Transient),
            "permanent" => Ok(Self::Permanent),
            _ => Err(SimError::UnknownFaultKind {
                value: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for FaultKind {
    type Error = SimError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<FaultKind> for String {
    fn from(kind: FaultKind) -> String {
        kind.as_str().to_string()
    }
}

/// Probability in `[0, 1]` that a contacted peer is usable
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Probability(f64);

impl Probability {
    /// Peer always usable
    pub const ALWAYS: Probability = Probability(1.0);
    /// Peer never usable
    pub const NEVER: Probability = Probability(0.0);

    /// Validate a probability; NaN and values outside `[0, 1]` are rejected.
    pub fn new(value: f64) -> Result<Self> {
        if (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(SimError::InvalidProbability { value })
        }
    }

    /// The raw value
    pub const fn value(self) -> f64 {
        self.0
    }

    /// The default availability levels: 1.0 down to 0.1
    pub fn default_sweep() -> Vec<Probability> {
        (1..=10).rev().map(|tenths| Probability(f64::from(tenths) / 10.0)).collect()
    }
}

impl fmt::Display for Probability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Probability {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self> {
        let value: f64 = s
            .trim()
            .parse()
            .map_err(|_| SimError::parse(format!("'{s}' is not a probability")))?;
        Self::new(value)
    }
}

impl TryFrom<f64> for Probability {
    type Error = SimError;

    fn try_from(value: f64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Probability> for f64 {
    fn from(p: Probability) -> f64 {
        p.0
    }
}

/// Result of one availability draw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactDecision {
    /// The peer answered and its shares may be used
    Usable,
    /// The peer did not answer this contact
    Unavailable,
}

/// A fault kind paired with an availability probability
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaultModel {
    /// Persistence of failures
    pub kind: FaultKind,
    /// Chance a single contact succeeds
    pub availability: Probability,
}

impl FaultModel {
    /// Create a fault model
    pub fn new(kind: FaultKind, availability: Probability) -> Self {
        Self { kind, availability }
    }

    /// Every contact succeeds
    pub fn perfect() -> Self {
        Self::new(FaultKind::Transient, Probability::ALWAYS)
    }

    /// Draw once for a contact
    pub fn contact<R: Rng + ?Sized>(&self, rng: &mut R) -> ContactDecision {
        if rng.gen_bool(self.availability.value()) {
            ContactDecision::Usable
        } else {
            ContactDecision::Unavailable
        }
    }

    /// Whether a failed draw takes the peer out of the trial
    pub fn removes_on_failure(&self) -> bool {
        self.kind == FaultKind::Permanent
    }
}
