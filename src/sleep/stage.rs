//! Sleep stages and their category values

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::error::SleepError;

/// Record type carrying sleep analysis samples
pub const SLEEP_TYPE: &str = "HKCategoryTypeIdentifierSleepAnalysis";

/// Stage of a sleep segment
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum SleepStage {
    Awake,
    #[serde(rename = "REM")]
    Rem,
    Deep,
    Core,
    Asleep,
    Unspecified,
    /// Time in bed; never part of a session
    InBed,
}

/// Stages that take part in overlap resolution, indexed by priority
pub(crate) const BY_PRIORITY: [SleepStage; 6] = [
    SleepStage::Unspecified,
    SleepStage::Asleep,
    SleepStage::Core,
    SleepStage::Deep,
    SleepStage::Rem,
    SleepStage::Awake,
];

impl SleepStage {
    /// Get all stages for iteration
    pub fn all() -> &'static [SleepStage] {
        &[
            SleepStage::Awake,
            SleepStage::Rem,
            SleepStage::Deep,
            SleepStage::Core,
            SleepStage::Asleep,
            SleepStage::Unspecified,
            SleepStage::InBed,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SleepStage::Awake => "Awake",
            SleepStage::Rem => "REM",
            SleepStage::Deep => "Deep",
            SleepStage::Core => "Core",
            SleepStage::Asleep => "Asleep",
            SleepStage::Unspecified => "Unspecified",
            SleepStage::InBed => "InBed",
        }
    }

    /// Overlap priority, higher wins. `None` for InBed, which is dropped
    /// before overlaps are resolved.
    pub fn priority(&self) -> Option<u8> {
        match self {
            SleepStage::Awake => Some(5),
            SleepStage::Rem => Some(4),
            SleepStage::Deep => Some(3),
            SleepStage::Core => Some(2),
            SleepStage::Asleep => Some(1),
            SleepStage::Unspecified => Some(0),
            SleepStage::InBed => None,
        }
    }

    pub fn is_awake(&self) -> bool {
        matches!(self, SleepStage::Awake)
    }

    /// Map an `HKCategoryValueSleepAnalysis*` value. Missing or unknown
    /// values are `Unspecified`.
    pub fn from_category_value(value: Option<&str>) -> Self {
        match value {
            Some("HKCategoryValueSleepAnalysisAwake") => SleepStage::Awake,
            Some("HKCategoryValueSleepAnalysisAsleepCore") => SleepStage::Core,
            Some("HKCategoryValueSleepAnalysisAsleepDeep") => SleepStage::Deep,
            Some("HKCategoryValueSleepAnalysisAsleepREM") => SleepStage::Rem,
            Some("HKCategoryValueSleepAnalysisInBed") => SleepStage::InBed,
            Some("HKCategoryValueSleepAnalysisAsleep") => SleepStage::Asleep,
            _ => SleepStage::Unspecified,
        }
    }
}

impl FromStr for SleepStage {
    type Err = SleepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SleepStage::all()
            .iter()
            .copied()
            .find(|stage| stage.as_str() == s)
            .ok_or_else(|| SleepError::InvalidStage(s.to_string()))
    }
}

impl std::fmt::Display for SleepStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
