//! A single contiguous sleep-stage interval

use chrono::Duration;

use super::error::{SleepError, SleepResult};
use super::stage::SleepStage;
use crate::parser::{HealthRecord, Timestamp};

/// Immutable `[start, end)` interval with one stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SleepSegment {
    start: Timestamp,
    end: Timestamp,
    stage: SleepStage,
}

impl SleepSegment {
    /// Create a segment. Zero-length segments are allowed here and dropped
    /// when a session is built.
    pub fn new(start: Timestamp, end: Timestamp, stage: SleepStage) -> SleepResult<Self> {
        if end < start {
            return Err(SleepError::InvalidSegment { start, end });
        }
        Ok(Self { start, end, stage })
    }

    /// Create a segment from a stage name such as `"REM"`
    pub fn try_from_name(start: Timestamp, end: Timestamp, stage: &str) -> SleepResult<Self> {
        Self::new(start, end, stage.parse()?)
    }

    /// Project a sleep analysis record. Records without a positive-length
    /// window yield nothing.
    pub fn from_record(record: &HealthRecord) -> Option<Self> {
        match (record.start(), record.end()) {
            (Some(start), Some(end)) if end > start => Some(Self {
                start,
                end,
                stage: SleepStage::from_category_value(record.get("value")),
            }),
            _ => None,
        }
    }

    pub fn start(&self) -> Timestamp {
        self.start
    }

    pub fn end(&self) -> Timestamp {
        self.end
    }

    pub fn stage(&self) -> SleepStage {
        self.stage
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }

    /// Whether the segment can take part in a session
    pub(crate) fn is_countable(&self) -> bool {
        self.stage != SleepStage::InBed && !self.is_empty()
    }

    /// Internal constructor for bounds already known to be ordered
    pub(crate) fn new_unchecked(start: Timestamp, end: Timestamp, stage: SleepStage) -> Self {
        debug_assert!(start <= end);
        Self { start, end, stage }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse_timestamp, Element, METADATA_TAG};

    fn ts(s: &str) -> Timestamp {
        parse_timestamp(s).unwrap()
    }

    #[test]
    fn test_basic_segment() {
        let seg = SleepSegment::new(ts("2024-01-05T23:20:00Z"), ts("2024-01-06T01:10:00Z"), SleepStage::Core).unwrap();
        assert_eq!(seg.duration(), Duration::minutes(110));
        assert_eq!(seg.stage(), SleepStage::Core);
        assert!(seg.is_countable());
    }

    #[test]
    fn test_rejects_reversed_bounds() {
        let err = SleepSegment::new(ts("2024-01-06T01:10:00Z"), ts("2024-01-05T23:20:00Z"), SleepStage::Core)
            .unwrap_err();
        assert!(matches!(err, SleepError::InvalidSegment { .. }));
        assert!(err.to_string().contains("before"));
    }

    #[test]
    fn test_zero_length_is_constructible_but_not_countable() {
        let t = ts("2024-01-05T23:20:00Z");
        let seg = SleepSegment::new(t, t, SleepStage::Deep).unwrap();
        assert!(seg.is_empty());
        assert!(!seg.is_countable());
    }

    #[test]
    fn test_stage_names() {
        let s = ts("2024-01-05T23:20:00Z");
        let e = ts("2024-01-06T01:10:00Z");
        assert_eq!(SleepSegment::try_from_name(s, e, "REM").unwrap().stage(), SleepStage::Rem);
        assert!(matches!(
            SleepSegment::try_from_name(s, e, "Unknown"),
            Err(SleepError::InvalidStage(_))
        ));
    }

    #[test]
    fn test_from_record() {
        let record = HealthRecord::from_element(
            Element::new("Record")
                .attr("type", "HKCategoryTypeIdentifierSleepAnalysis")
                .attr("startDate", "2024-01-20 23:00:00 -0700")
                .attr("endDate", "2024-01-21 01:00:00 -0700")
                .attr("value", "HKCategoryValueSleepAnalysisAsleepDeep")
                .child(Element::new(METADATA_TAG).attr("key", "HKTimeZone").attr("value", "America/Denver")),
        );
        let seg = SleepSegment::from_record(&record).unwrap();
        assert_eq!(seg.stage(), SleepStage::Deep);
        assert_eq!(seg.duration(), Duration::hours(2));
        assert_eq!(seg.start().offset().local_minus_utc(), -7 * 3600);

        let instant = HealthRecord::from_element(
            Element::new("Record")
                .attr("startDate", "2024-01-20 23:00:00 -0700")
                .attr("endDate", "2024-01-20 23:00:00 -0700"),
        );
        assert!(SleepSegment::from_record(&instant).is_none());

        let undated = HealthRecord::from_element(Element::new("Record").attr("value", "x"));
        assert!(SleepSegment::from_record(&undated).is_none());
    }
}
