//! Build stability aggregation.
//!
//! Builds are ordered by number and folded in a single pass. A failure opens
//! a streak anchored on its build; the next successful build fixes the streak
//! and contributes the elapsed time and build distance to the fix statistics.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::builds::BuildRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuildResult {
    #[serde(rename = "g")]
    Green,
    #[serde(rename = "r")]
    Red,
}

impl BuildResult {
    pub fn as_char(self) -> char {
        match self {
            Self::Green => 'g',
            Self::Red => 'r',
        }
    }
}

impl std::fmt::Display for BuildResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Per-build series, keyed by build number in ascending order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildSeries {
    pub durations_seconds: IndexMap<i64, f64>,
    pub results: IndexMap<i64, BuildResult>,
}

impl BuildSeries {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            durations_seconds: IndexMap::with_capacity(capacity),
            results: IndexMap::with_capacity(capacity),
        }
    }

    fn push(&mut self, build: &BuildRecord) {
        let result = if build.successful {
            BuildResult::Green
        } else {
            BuildResult::Red
        };

        self.durations_seconds
            .insert(build.number, build.duration_millis / 1000.0);
        self.results.insert(build.number, result);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StabilityMetrics {
    pub name: String,
    pub total_builds: usize,
    pub failed_builds: usize,
    pub success_rate_percent: f64,
    pub avg_duration_millis: f64,
    pub shortest_duration_millis: f64,
    pub longest_duration_millis: f64,
    pub avg_time_to_fix_millis: f64,
    pub longest_time_to_fix_millis: f64,
    pub avg_builds_to_fix: f64,
    /// `None` when there were no builds to report.
    pub series: Option<BuildSeries>,
}

/// Computes stability metrics for one source.
///
/// `builds` may come in any order. Duration statistics only consider
/// successful builds, and a failure streak still open after the last build
/// does not count towards the fix statistics.
pub fn aggregate(builds: &[BuildRecord], label: &str) -> StabilityMetrics {
    let mut ordered: Vec<&BuildRecord> = builds.iter().collect();
    ordered.sort_by_key(|build| build.number);

    let mut tally = Tally::default();
    let mut series = BuildSeries::with_capacity(ordered.len());

    for build in ordered {
        series.push(build);
        tally.record(build);
    }

    tally.into_metrics(label, (!builds.is_empty()).then_some(series))
}

#[derive(Default)]
struct Tally<'a> {
    successful: usize,
    failed: usize,
    duration_sum: f64,
    shortest: Option<f64>,
    longest: Option<f64>,
    open_failure: Option<&'a BuildRecord>,
    fixes: usize,
    total_time_to_fix: f64,
    total_builds_to_fix: f64,
    longest_time_to_fix: Option<f64>,
}

impl<'a> Tally<'a> {
    fn record(&mut self, build: &'a BuildRecord) {
        if !build.successful {
            self.failed += 1;
            if self.open_failure.is_none() {
                self.open_failure = Some(build);
            }
            return;
        }

        let duration = build.duration_millis;
        self.successful += 1;
        self.duration_sum += duration;
        self.shortest = Some(self.shortest.map_or(duration, |s| s.min(duration)));
        self.longest = Some(self.longest.map_or(duration, |l| l.max(duration)));

        if let Some(anchor) = self.open_failure.take() {
            #[allow(clippy::cast_precision_loss)]
            let (builds_to_fix, time_to_fix) = (
                build.number.saturating_sub(anchor.number) as f64,
                build.timestamp.saturating_sub(anchor.timestamp) as f64,
            );

            self.fixes += 1;
            self.total_builds_to_fix += builds_to_fix;
            self.total_time_to_fix += time_to_fix;
            self.longest_time_to_fix = Some(
                self.longest_time_to_fix
                    .map_or(time_to_fix, |l| l.max(time_to_fix)),
            );
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn into_metrics(self, label: &str, series: Option<BuildSeries>) -> StabilityMetrics {
        let total = self.successful + self.failed;

        StabilityMetrics {
            name: label.to_string(),
            total_builds: total,
            failed_builds: self.failed,
            success_rate_percent: divide(self.successful as f64, total as f64) * 100.0,
            avg_duration_millis: divide(self.duration_sum, self.successful as f64),
            shortest_duration_millis: self.shortest.unwrap_or(0.0),
            longest_duration_millis: self.longest.unwrap_or(0.0),
            avg_time_to_fix_millis: divide(self.total_time_to_fix, self.fixes as f64),
            longest_time_to_fix_millis: self.longest_time_to_fix.unwrap_or(0.0),
            avg_builds_to_fix: divide(self.total_builds_to_fix, self.fixes as f64),
            series,
        }
    }
}

fn divide(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}
