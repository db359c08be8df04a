//! Sleep sessions and interval normalization
//!
//! Raw sleep samples from several sources overlap freely. [`normalize`]
//! turns them into one disjoint timeline in which every elementary interval
//! takes the highest-priority stage covering it:
//!
//! ```text
//! Core   [00:00 ─────────────── 02:00)
//! Awake        [00:30 ── 01:30)
//! ─────────────────────────────────────
//! Core   [00:00, 00:30) Awake [00:30, 01:30) Core [01:30, 02:00)
//! ```

use chrono::Duration;
use serde::{Deserialize, Serialize, Serializer};

use super::error::{SleepError, SleepResult};
use super::segment::SleepSegment;
use super::stage::{SleepStage, BY_PRIORITY};
use crate::parser::{format_timestamp, Timestamp};

/// Awake periods at least this long count as an awakening
pub const AWAKENING_THRESHOLD_MINUTES: i64 = 2;

/// Build a disjoint, ordered, merged timeline from overlapping segments.
///
/// InBed and zero-length segments are dropped. Uncovered gaps stay gaps.
/// Adjacent output segments with the same stage are merged, so normalizing
/// an already normalized sequence returns it unchanged.
pub fn normalize<I>(segments: I) -> Vec<SleepSegment>
where
    I: IntoIterator<Item = SleepSegment>,
{
    // (instant, +1 opens / -1 closes, priority)
    let mut events: Vec<(Timestamp, i8, usize)> = Vec::new();
    for seg in segments.into_iter().filter(SleepSegment::is_countable) {
        let Some(priority) = seg.stage().priority() else {
            continue;
        };
        events.push((seg.start(), 1, priority as usize));
        events.push((seg.end(), -1, priority as usize));
    }
    events.sort_by_key(|(at, _, _)| *at);

    let mut active = [0usize; BY_PRIORITY.len()];
    let mut result: Vec<SleepSegment> = Vec::new();
    let mut idx = 0;
    let mut prev: Option<Timestamp> = None;

    while idx < events.len() {
        let at = events[idx].0;

        // Resolve [prev, at) with the coverage in effect before this boundary
        if let Some(from) = prev {
            let winner = active.iter().rposition(|&count| count > 0).map(|p| BY_PRIORITY[p]);
            if let Some(stage) = winner {
                match result.last_mut() {
                    Some(last) if last.stage() == stage && last.end() == from => {
                        *last = SleepSegment::new_unchecked(last.start(), at, stage);
                    }
                    _ => result.push(SleepSegment::new_unchecked(from, at, stage)),
                }
            }
        }

        while idx < events.len() && events[idx].0 == at {
            let (_, delta, priority) = events[idx];
            if delta > 0 {
                active[priority] += 1;
            } else {
                active[priority] = active[priority].saturating_sub(1);
            }
            idx += 1;
        }
        prev = Some(at);
    }

    result
}

/// One night of sleep: a non-empty, ordered sequence of disjoint segments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SleepSession {
    start: Timestamp,
    end: Timestamp,
    segments: Vec<SleepSegment>,
}

impl SleepSession {
    /// Build a session from raw segments, normalizing overlaps and dropping
    /// InBed time
    pub fn from_segments<I>(segments: I) -> SleepResult<Self>
    where
        I: IntoIterator<Item = SleepSegment>,
    {
        let segments = normalize(segments);
        let (Some(first), Some(last)) = (segments.first(), segments.last()) else {
            return Err(SleepError::EmptySession);
        };

        Ok(Self {
            start: first.start(),
            end: last.end(),
            segments,
        })
    }

    pub fn start(&self) -> Timestamp {
        self.start
    }

    pub fn end(&self) -> Timestamp {
        self.end
    }

    pub fn segments(&self) -> &[SleepSegment] {
        &self.segments
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Time spent in any stage other than Awake
    pub fn asleep_duration(&self) -> Duration {
        self.sum_durations(|stage| !stage.is_awake())
    }

    pub fn awake_duration(&self) -> Duration {
        self.sum_durations(SleepStage::is_awake)
    }

    /// Awake periods lasting at least two minutes
    pub fn awakenings(&self) -> usize {
        let threshold = Duration::minutes(AWAKENING_THRESHOLD_MINUTES);
        self.segments
            .iter()
            .filter(|s| s.stage().is_awake() && s.duration() >= threshold)
            .count()
    }

    fn sum_durations(&self, pred: impl Fn(&SleepStage) -> bool) -> Duration {
        self.segments
            .iter()
            .filter(|s| pred(&s.stage()))
            .fold(Duration::zero(), |acc, s| acc + s.duration())
    }

    /// External shape of the session
    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            start_date: format_timestamp(&self.start),
            end_date: format_timestamp(&self.end),
            duration: seconds(self.duration()),
            asleep_duration: seconds(self.asleep_duration()),
            awake_duration: seconds(self.awake_duration()),
            awakenings: self.awakenings(),
            segments: self.segments.iter().map(SegmentSummary::from).collect(),
        }
    }
}

impl Serialize for SleepSession {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.summary().serialize(serializer)
    }
}

fn seconds(d: Duration) -> f64 {
    d.num_milliseconds() as f64 / 1000.0
}

/// Serialized session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub start_date: String,
    pub end_date: String,
    /// Seconds
    pub duration: f64,
    pub asleep_duration: f64,
    pub awake_duration: f64,
    pub awakenings: usize,
    pub segments: Vec<SegmentSummary>,
}

/// Serialized segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentSummary {
    pub stage: SleepStage,
    pub start_date: String,
    pub end_date: String,
    pub duration: f64,
}

impl From<&SleepSegment> for SegmentSummary {
    fn from(seg: &SleepSegment) -> Self {
        Self {
            stage: seg.stage(),
            start_date: format_timestamp(&seg.start()),
            end_date: format_timestamp(&seg.end()),
            duration: seconds(seg.duration()),
        }
    }
}
