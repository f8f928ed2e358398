//! Inference configuration

use serde::{Deserialize, Serialize};

use crate::limits::Limits;

/// How occurrence bounds and attribute uses are inferred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum Occurrence {
    /// First-seen particles and attributes are required; bounds stay tight
    #[default]
    Restricted,
    /// Everything is optional and repeatable from the start
    Relaxed,
}

/// Whether leaf values are typed at all
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum TypeInference {
    /// Narrow every leaf to the most specific lattice type
    #[default]
    Restricted,
    /// Type every leaf as `string`
    Relaxed,
}

/// Options for one [`SchemaInference`](super::SchemaInference)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InferenceOptions {
    /// Occurrence mode
    pub occurrence: Occurrence,
    /// Type inference mode
    pub type_inference: TypeInference,
    /// Resource limits applied while reading instances
    pub limits: Limits,
}

impl InferenceOptions {
    /// Default options: restricted occurrence and typing, default limits
    pub fn new() -> Self {
        Self::default()
    }
}
