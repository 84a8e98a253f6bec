use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a batch of queries is executed against the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// Searched on the calling thread.
    #[default]
    Sequential,
    /// Sharded across a fixed worker pool.
    Parallel,
}

impl ExecutionMode {
    pub const ALL: [ExecutionMode; 2] = [ExecutionMode::Sequential, ExecutionMode::Parallel];

    /// Dense position of this mode in [`ExecutionMode::ALL`].
    pub const fn ordinal(self) -> usize {
        match self {
            ExecutionMode::Sequential => 0,
            ExecutionMode::Parallel => 1,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            ExecutionMode::Sequential => "sequential",
            ExecutionMode::Parallel => "parallel",
        }
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExecutionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sequential" | "single" | "1" => Ok(ExecutionMode::Sequential),
            "parallel" | "multi" | "2" => Ok(ExecutionMode::Parallel),
            other => Err(format!("Unknown execution mode '{}'", other)),
        }
    }
}

/// Size/density of the reference dataset.
///
/// Coarser tiers hold fewer, sparser reference places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PrecisionTier {
    #[serde(alias = "tier0")]
    Coarse,
    #[serde(alias = "tier1")]
    Medium,
    #[serde(alias = "tier2")]
    #[default]
    Fine,
}

impl PrecisionTier {
    pub const ALL: [PrecisionTier; 3] = [
        PrecisionTier::Coarse,
        PrecisionTier::Medium,
        PrecisionTier::Fine,
    ];

    /// Dense position of this tier in [`PrecisionTier::ALL`].
    pub const fn ordinal(self) -> usize {
        match self {
            PrecisionTier::Coarse => 0,
            PrecisionTier::Medium => 1,
            PrecisionTier::Fine => 2,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            PrecisionTier::Coarse => "coarse",
            PrecisionTier::Medium => "medium",
            PrecisionTier::Fine => "fine",
        }
    }
}

impl fmt::Display for PrecisionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PrecisionTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "coarse" | "tier0" | "0" => Ok(PrecisionTier::Coarse),
            "medium" | "tier1" | "1" => Ok(PrecisionTier::Medium),
            "fine" | "tier2" | "2" => Ok(PrecisionTier::Fine),
            other => Err(format!("Unknown precision tier '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordinals_are_dense() {
        for (i, mode) in ExecutionMode::ALL.iter().enumerate() {
            assert_eq!(mode.ordinal(), i);
        }
        for (i, tier) in PrecisionTier::ALL.iter().enumerate() {
            assert_eq!(tier.ordinal(), i);
        }
    }

    #[test]
    fn test_parse_names_and_aliases() {
        assert_eq!("Parallel".parse::<ExecutionMode>(), Ok(ExecutionMode::Parallel));
        assert_eq!("tier0".parse::<PrecisionTier>(), Ok(PrecisionTier::Coarse));
        assert_eq!("fine".parse::<PrecisionTier>(), Ok(PrecisionTier::Fine));
        assert!("bogus".parse::<PrecisionTier>().is_err());
    }
}
