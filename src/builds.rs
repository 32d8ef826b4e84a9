use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One historical execution of a build job, as reported by a build source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildRecord {
    pub number: i64,
    /// Start of the build, in epoch milliseconds.
    pub timestamp: i64,
    #[serde(default)]
    pub name: String,
    pub successful: bool,
    pub duration_millis: f64,
}

impl BuildRecord {
    pub fn new(
        number: i64,
        timestamp: i64,
        name: impl Into<String>,
        successful: bool,
        duration_millis: f64,
    ) -> Self {
        Self {
            number,
            timestamp,
            name: name.into(),
            successful,
            duration_millis,
        }
    }

    pub fn started_since(&self, since: DateTime<Utc>) -> bool {
        self.timestamp >= since.timestamp_millis()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserializes_without_name() {
        let record: BuildRecord = serde_json::from_str(
            r#"{"number": 7, "timestamp": 1000, "successful": false, "duration_millis": 2500}"#,
        )
        .unwrap();

        assert_eq!(record, BuildRecord::new(7, 1000, "", false, 2500.0));
    }

    #[test]
    fn test_started_since_includes_boundary() {
        let since = DateTime::from_timestamp_millis(5_000).unwrap();

        assert!(BuildRecord::new(1, 5_000, "b", true, 1.0).started_since(since));
        assert!(BuildRecord::new(2, 6_000, "b", true, 1.0).started_since(since));
        assert!(!BuildRecord::new(3, 4_999, "b", true, 1.0).started_since(since));
    }
}
