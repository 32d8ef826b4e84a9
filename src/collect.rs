use chrono::{DateTime, Utc};
use futures::{stream, StreamExt};
use log::{error, info, warn};

use crate::auth::Credentials;
use crate::builds::BuildRecord;
use crate::config::LookbackWindow;
use crate::descriptor::CiSourceDescriptor;
use crate::error::Result;
use crate::report::{SkippedSource, SourceReport, StabilityReport};
use crate::sources::source_for;
use crate::stability::aggregate;

const CONCURRENCY: usize = 4;

#[derive(Debug, Clone, Default)]
pub struct CollectSettings {
    pub window: LookbackWindow,
    pub credentials: Option<Credentials>,
}

/// Retrieves and analyzes every CI source.
///
/// Sources are fetched concurrently but reported in descriptor order. A
/// source that cannot be read is skipped without consuming an index.
pub async fn collect(
    descriptors: Vec<CiSourceDescriptor>,
    settings: &CollectSettings,
) -> StabilityReport {
    let collected_at = Utc::now();
    let since = settings.window.since(collected_at);

    let fetched: Vec<_> = stream::iter(descriptors)
        .map(|descriptor| async move {
            let outcome = fetch(&descriptor, settings.credentials.as_ref(), since).await;
            (descriptor, outcome)
        })
        .buffered(CONCURRENCY)
        .collect()
        .await;

    let mut report = StabilityReport::new(collected_at, since);

    for (descriptor, outcome) in fetched {
        match outcome {
            Ok(Some(builds)) => {
                info!("Retrieved {} builds since {since} from {descriptor}", builds.len());
                let index = report.sources.len();
                let metrics = aggregate(&builds, &descriptor.title);
                report
                    .sources
                    .push(SourceReport::new(index, descriptor, metrics));
            }
            Ok(None) => {
                warn!("Unknown CI system or incorrect URL: {descriptor}");
                report.skipped.push(SkippedSource {
                    descriptor,
                    reason: "no build source for URL".to_string(),
                });
            }
            Err(e) => {
                error!("Failed to retrieve builds from {descriptor}: {e}");
                report.skipped.push(SkippedSource {
                    descriptor,
                    reason: e.to_string(),
                });
            }
        }
    }

    info!(
        "Analyzed {} sources, skipped {}",
        report.sources.len(),
        report.skipped.len()
    );

    report
}

async fn fetch(
    descriptor: &CiSourceDescriptor,
    credentials: Option<&Credentials>,
    since: DateTime<Utc>,
) -> Result<Option<Vec<BuildRecord>>> {
    info!("CI URL: {descriptor}");

    let Some(source) = source_for(descriptor, credentials)? else {
        return Ok(None);
    };

    source.builds_since(since).await.map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn feed_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn all_history() -> CollectSettings {
        CollectSettings {
            window: LookbackWindow::new(u32::MAX),
            credentials: None,
        }
    }

    #[tokio::test]
    async fn test_collect_skips_unreadable_sources() {
        let first = feed_file(
            r#"[
                {"number": 1, "timestamp": 0, "successful": true, "duration_millis": 10000},
                {"number": 2, "timestamp": 1000, "successful": false, "duration_millis": 4000},
                {"number": 3, "timestamp": 10000, "successful": true, "duration_millis": 3000},
                {"number": 4, "timestamp": 20000, "successful": true, "duration_millis": 5000}
            ]"#,
        );
        let second = feed_file("[]");

        let descriptors = vec![
            CiSourceDescriptor::new("First", "hudson", first.path().to_string_lossy()),
            CiSourceDescriptor::new("No URL", "hudson", ""),
            CiSourceDescriptor::new("Missing", "go", "/nonexistent/cistab/builds.json"),
            CiSourceDescriptor::new("Second", "bamboo", second.path().to_string_lossy()),
        ];

        let report = collect(descriptors, &all_history()).await;

        assert_eq!(report.sources.len(), 2);
        assert_eq!(report.skipped.len(), 2);

        let first_report = &report.sources[0];
        assert_eq!(first_report.index, 0);
        assert_eq!(first_report.metrics.name, "First");
        assert_eq!(first_report.metrics.total_builds, 4);
        assert!(first_report.measures.iter().any(|m| m.key == "builds_0"));

        let second_report = &report.sources[1];
        assert_eq!(second_report.index, 1);
        assert_eq!(second_report.metrics.name, "Second");
        assert!(second_report.metrics.series.is_none());
        assert!(second_report.measures.iter().any(|m| m.key == "build_name_1"));

        assert_eq!(report.skipped[0].descriptor.title, "No URL");
        assert_eq!(report.skipped[1].descriptor.title, "Missing");
    }

    #[tokio::test]
    async fn test_collect_nothing() {
        let report = collect(vec![], &CollectSettings::default()).await;

        assert!(report.sources.is_empty());
        assert!(report.skipped.is_empty());
        assert!(report.builds_since < report.collected_at);
    }

    #[tokio::test]
    async fn test_collect_from_http_feed() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/feed")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"[{"number": 5, "timestamp": 0, "successful": false, "duration_millis": 10}]"#,
            )
            .create_async()
            .await;

        let descriptors =
            crate::parser::parse_all(&format!("[Remote]jenkins:{}/feed", server.url()));
        let report = collect(descriptors, &all_history()).await;

        assert_eq!(report.sources.len(), 1);
        assert_eq!(report.sources[0].descriptor.system, "hudson");
        assert_eq!(report.sources[0].metrics.failed_builds, 1);
        assert_eq!(report.sources[0].metrics.success_rate_percent, 0.0);
    }
}
