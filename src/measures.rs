use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::stability::StabilityMetrics;

pub const DOMAIN: &str = "Continuous integration";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    Int,
    Percent,
    Millisec,
    Data,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    None,
    Better,
    Worst,
}

/// A metric published once per CI source index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricDefinition {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub value_type: ValueType,
    pub direction: Direction,
}

impl MetricDefinition {
    const fn new(
        key: &'static str,
        name: &'static str,
        description: &'static str,
        value_type: ValueType,
        direction: Direction,
    ) -> Self {
        Self {
            key,
            name,
            description,
            value_type,
            direction,
        }
    }

    pub fn key_for(&self, index: usize) -> String {
        format!("{}_{index}", self.key)
    }

    fn measure(&self, index: usize, value: MeasureValue) -> Measure {
        Measure {
            key: self.key_for(index),
            name: self.name,
            value,
        }
    }
}

pub const BUILDS: MetricDefinition = MetricDefinition::new(
    "builds",
    "Builds",
    "Number of builds",
    ValueType::Int,
    Direction::None,
);
pub const FAILED: MetricDefinition = MetricDefinition::new(
    "build_failures",
    "Failed Builds",
    "Number of failed builds",
    ValueType::Int,
    Direction::Worst,
);
pub const SUCCESS_RATE: MetricDefinition = MetricDefinition::new(
    "build_success_density",
    "Success Rate (%)",
    "Ratio of successful builds",
    ValueType::Percent,
    Direction::Better,
);
pub const AVG_DURATION: MetricDefinition = MetricDefinition::new(
    "build_average_duration",
    "Average Duration",
    "Average Duration",
    ValueType::Millisec,
    Direction::Worst,
);
pub const LONGEST_DURATION: MetricDefinition = MetricDefinition::new(
    "build_longest_duration",
    "Longest duration",
    "Duration of longest successful build",
    ValueType::Millisec,
    Direction::Worst,
);
pub const SHORTEST_DURATION: MetricDefinition = MetricDefinition::new(
    "build_shortest_duration",
    "Shortest duration",
    "Duration of shortest successful build",
    ValueType::Millisec,
    Direction::Worst,
);
pub const AVG_TIME_TO_FIX: MetricDefinition = MetricDefinition::new(
    "build_average_time_to_fix_failure",
    "Average time to fix a failure",
    "Average time to fix a failure",
    ValueType::Millisec,
    Direction::Worst,
);
pub const LONGEST_TIME_TO_FIX: MetricDefinition = MetricDefinition::new(
    "build_longest_time_to_fix_failure",
    "Longest time to fix a failure",
    "Longest time to fix a failure",
    ValueType::Millisec,
    Direction::Worst,
);
pub const AVG_BUILDS_TO_FIX: MetricDefinition = MetricDefinition::new(
    "build_average_builds_to_fix_failure",
    "Average number of builds between fixes",
    "Average number of builds between fixes",
    ValueType::Int,
    Direction::Worst,
);
pub const DURATIONS: MetricDefinition = MetricDefinition::new(
    "build_durations",
    "Durations",
    "Durations",
    ValueType::Data,
    Direction::None,
);
pub const RESULTS: MetricDefinition = MetricDefinition::new(
    "build_results",
    "Results",
    "Results",
    ValueType::Data,
    Direction::None,
);
pub const NAME: MetricDefinition = MetricDefinition::new(
    "build_name",
    "Name",
    "Name",
    ValueType::Data,
    Direction::None,
);

pub static CATALOG: [MetricDefinition; 12] = [
    BUILDS,
    FAILED,
    SUCCESS_RATE,
    AVG_DURATION,
    LONGEST_DURATION,
    SHORTEST_DURATION,
    AVG_TIME_TO_FIX,
    LONGEST_TIME_TO_FIX,
    AVG_BUILDS_TO_FIX,
    DURATIONS,
    RESULTS,
    NAME,
];

/// Every metric key registered for the first `sources` source indices.
pub fn catalog(sources: usize) -> IndexMap<String, MetricDefinition> {
    (0..sources)
        .flat_map(|index| CATALOG.iter().map(move |def| (def.key_for(index), *def)))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MeasureValue {
    Number(f64),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Measure {
    pub key: String,
    pub name: &'static str,
    pub value: MeasureValue,
}

/// Flattens the metrics of the source at `index` into keyed measures.
///
/// Series measures are only present when the metrics carry series.
#[allow(clippy::cast_precision_loss)]
pub fn measures_for(index: usize, metrics: &StabilityMetrics) -> Vec<Measure> {
    let number =
        |def: &MetricDefinition, value: f64| def.measure(index, MeasureValue::Number(value));

    let mut measures = vec![
        number(&BUILDS, metrics.total_builds as f64),
        number(&FAILED, metrics.failed_builds as f64),
        number(&SUCCESS_RATE, metrics.success_rate_percent),
        number(&AVG_DURATION, metrics.avg_duration_millis),
        number(&LONGEST_DURATION, metrics.longest_duration_millis),
        number(&SHORTEST_DURATION, metrics.shortest_duration_millis),
        number(&AVG_TIME_TO_FIX, metrics.avg_time_to_fix_millis),
        number(&LONGEST_TIME_TO_FIX, metrics.longest_time_to_fix_millis),
        number(&AVG_BUILDS_TO_FIX, metrics.avg_builds_to_fix),
    ];

    if let Some(series) = &metrics.series {
        measures.push(DURATIONS.measure(
            index,
            MeasureValue::Text(render_series(&series.durations_seconds)),
        ));
        measures.push(RESULTS.measure(
            index,
            MeasureValue::Text(render_series(&series.results)),
        ));
    }

    measures.push(NAME.measure(index, MeasureValue::Text(metrics.name.clone())));

    measures
}

/// Renders a series as `number=value` pairs joined by `;`.
fn render_series<V: std::fmt::Display>(series: &IndexMap<i64, V>) -> String {
    series
        .iter()
        .map(|(number, value)| format!("{number}={value}"))
        .collect::<Vec<_>>()
        .join(";")
}
