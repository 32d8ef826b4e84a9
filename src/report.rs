use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::descriptor::CiSourceDescriptor;
use crate::measures::{measures_for, Measure};
use crate::stability::StabilityMetrics;

#[derive(Debug, Serialize)]
pub struct StabilityReport {
    pub collected_at: DateTime<Utc>,
    pub builds_since: DateTime<Utc>,
    pub sources: Vec<SourceReport>,
    pub skipped: Vec<SkippedSource>,
}

impl StabilityReport {
    pub fn new(collected_at: DateTime<Utc>, builds_since: DateTime<Utc>) -> Self {
        Self {
            collected_at,
            builds_since,
            sources: vec![],
            skipped: vec![],
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SourceReport {
    pub index: usize,
    pub descriptor: CiSourceDescriptor,
    pub metrics: StabilityMetrics,
    pub measures: Vec<Measure>,
}

impl SourceReport {
    pub fn new(index: usize, descriptor: CiSourceDescriptor, metrics: StabilityMetrics) -> Self {
        let measures = measures_for(index, &metrics);

        Self {
            index,
            descriptor,
            metrics,
            measures,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SkippedSource {
    pub descriptor: CiSourceDescriptor,
    pub reason: String,
}
