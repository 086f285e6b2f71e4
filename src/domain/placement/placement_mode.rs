use std::fmt;
use std::str::FromStr;

use crate::domain::placement::policy::EDGE_CPU_THRESHOLD;
use crate::error::Error;

/// Strategy deciding where the analytics module runs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlacementMode {
    /// Analytics always runs on the cloud device.
    CloudOnly,

    /// Analytics is replicated to every edge device unless the load exceeds
    /// `threshold`, in which case it escalates to the cloud.
    FogEdgeAssisted { threshold: f64 },
}

impl PlacementMode {
    pub fn fog_edge_assisted() -> Self {
        PlacementMode::FogEdgeAssisted { threshold: EDGE_CPU_THRESHOLD }
    }

    /// Replaces the escalation threshold; no effect on `CloudOnly`.
    pub fn with_threshold(self, threshold: f64) -> Self {
        match self {
            PlacementMode::CloudOnly => PlacementMode::CloudOnly,
            PlacementMode::FogEdgeAssisted { .. } => PlacementMode::FogEdgeAssisted { threshold },
        }
    }

    /// Heading printed before the batch pass of this mode.
    pub fn banner(&self) -> &'static str {
        match self {
            PlacementMode::CloudOnly => "CloudOnlyProcessing",
            PlacementMode::FogEdgeAssisted { .. } => "FogEdgeAssistedProcessing",
        }
    }
}

impl fmt::Display for PlacementMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlacementMode::CloudOnly => write!(f, "CLOUD_ONLY"),
            PlacementMode::FogEdgeAssisted { .. } => write!(f, "FOG_EDGE_ASSISTED"),
        }
    }
}

impl FromStr for PlacementMode {
    type Err = Error;

    fn from_str(mode: &str) -> Result<PlacementMode, Self::Err> {
        match mode {
            "CLOUD_ONLY" | "CloudOnly" | "cloudOnly" => Ok(PlacementMode::CloudOnly),
            "FOG_EDGE_ASSISTED" | "FogEdgeAssisted" | "fogEdgeAssisted" => Ok(PlacementMode::fog_edge_assisted()),
            _ => Err(Error::InvalidConfig(format!("Unknown placement mode '{}'", mode))),
        }
    }
}
