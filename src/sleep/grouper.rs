//! Grouping sleep segments into sessions
//!
//! Segments are sorted and accumulated greedily; a new session starts when
//! the next segment begins more than `gap` after the latest end seen in the
//! current group.

use chrono::Duration;
use std::path::Path;
use tracing::debug;

use super::error::SleepResult;
use super::segment::SleepSegment;
use super::session::SleepSession;
use super::stage::SLEEP_TYPE;
use crate::parser::{IntoTimestamp, RecordFilter, RecordReader};

/// Idle gap separating sessions when none is given
pub const DEFAULT_GAP_HOURS: f64 = 2.0;

/// Convert fractional hours into a gap
pub fn gap_from_hours(hours: f64) -> Duration {
    Duration::milliseconds((hours * 3_600_000.0).round() as i64)
}

/// Partition segments into sessions separated by more than `gap`
pub fn build_sleep_sessions<I>(segments: I, gap: Duration) -> SleepResult<Vec<SleepSession>>
where
    I: IntoIterator<Item = SleepSegment>,
{
    let mut segs: Vec<_> = segments.into_iter().filter(SleepSegment::is_countable).collect();
    segs.sort_by_key(|s| (s.start(), s.end()));

    let mut sessions = Vec::new();
    let mut current: Vec<SleepSegment> = Vec::new();
    let mut latest_end = None;

    for seg in segs {
        if let Some(end) = latest_end {
            if seg.start() - end > gap {
                sessions.push(SleepSession::from_segments(std::mem::take(&mut current))?);
                latest_end = None;
            }
        }
        latest_end = Some(latest_end.map_or(seg.end(), |end| seg.end().max(end)));
        current.push(seg);
    }
    if !current.is_empty() {
        sessions.push(SleepSession::from_segments(current)?);
    }

    debug!(sessions = sessions.len(), gap_secs = gap.num_seconds(), "Built sleep sessions");
    Ok(sessions)
}

/// Stream sleep segments from an export.
///
/// Only sleep analysis records with a positive-length window are kept.
pub fn iter_sleep_segments(
    path: impl AsRef<Path>,
    start: impl IntoTimestamp,
    end: impl IntoTimestamp,
) -> SleepResult<impl Iterator<Item = SleepSegment>> {
    let filter = RecordFilter::new().types([SLEEP_TYPE]).start(start).end(end);
    let reader = RecordReader::open(path, filter)?;
    Ok(reader.filter_map(|record| SleepSegment::from_record(&record)))
}

/// Read an export and reconstruct its sleep sessions
pub fn sleep_sessions(
    path: impl AsRef<Path>,
    start: impl IntoTimestamp,
    end: impl IntoTimestamp,
    gap: Duration,
) -> SleepResult<Vec<SleepSession>> {
    build_sleep_sessions(iter_sleep_segments(path, start, end)?, gap)
}
