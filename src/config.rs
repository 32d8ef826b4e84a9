use chrono::{DateTime, Duration, Utc};
use log::debug;

use crate::descriptor::{recognized_system, CiSourceDescriptor};
use crate::parser::parse_all;

pub const DEFAULT_LOOKBACK_DAYS: u32 = 30;

/// CI system declared by the project itself, used when no descriptor
/// string is configured.
#[derive(Debug, Clone, Default)]
pub struct CiManagement {
    pub system: String,
    pub url: String,
}

impl CiManagement {
    fn to_descriptor(&self) -> Option<CiSourceDescriptor> {
        if self.system.trim().is_empty() || self.url.trim().is_empty() {
            return None;
        }

        let system = recognized_system(&self.system)
            .map_or_else(|| self.system.trim().to_lowercase(), str::to_owned);

        Some(CiSourceDescriptor::new("", system, self.url.trim()))
    }
}

/// Resolves the CI sources to analyze.
///
/// The configured descriptor string wins whenever it names at least one
/// source; otherwise the project's own CI management entry is used.
pub fn resolve_descriptors(
    configured: Option<&str>,
    fallback: Option<&CiManagement>,
) -> Vec<CiSourceDescriptor> {
    let parsed = configured.map(parse_all).unwrap_or_default();
    if !parsed.is_empty() {
        return parsed;
    }

    debug!("No descriptors configured, falling back to project CI management");
    fallback
        .and_then(CiManagement::to_descriptor)
        .into_iter()
        .collect()
}

/// How far back builds are retrieved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookbackWindow {
    pub days: u32,
}

impl Default for LookbackWindow {
    fn default() -> Self {
        Self {
            days: DEFAULT_LOOKBACK_DAYS,
        }
    }
}

impl LookbackWindow {
    pub fn new(days: u32) -> Self {
        Self { days }
    }

    /// Earliest build start to retrieve. Saturates at the earliest
    /// representable instant.
    pub fn since(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        Duration::try_days(i64::from(self.days))
            .and_then(|window| now.checked_sub_signed(window))
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pom(system: &str, url: &str) -> CiManagement {
        CiManagement {
            system: system.to_string(),
            url: url.to_string(),
        }
    }

    #[test]
    fn test_configured_descriptors_take_precedence() {
        let fallback = pom("Hudson", "pom");
        let descriptors = resolve_descriptors(Some("Hudson:conf"), Some(&fallback));

        assert_eq!(descriptors.len(), 1);
        assert_eq!(descriptors[0].system, "hudson");
        assert_eq!(descriptors[0].url, "conf");
    }

    #[test]
    fn test_fallback_used_when_nothing_configured() {
        let fallback = pom("Hudson", "http://localhost");

        let descriptors = resolve_descriptors(None, Some(&fallback));
        assert_eq!(
            descriptors,
            vec![CiSourceDescriptor::new("", "hudson", "http://localhost")]
        );

        let descriptors = resolve_descriptors(Some("   "), Some(&fallback));
        assert_eq!(descriptors.len(), 1);
    }

    #[test]
    fn test_fallback_aliases_and_lowercases_system() {
        let descriptors = resolve_descriptors(None, Some(&pom("Jenkins", "http://ci")));
        assert_eq!(descriptors[0].system, "hudson");

        let descriptors = resolve_descriptors(None, Some(&pom("Travis", "http://ci")));
        assert_eq!(descriptors[0].system, "travis");
    }

    #[test]
    fn test_incomplete_fallback_is_ignored() {
        assert!(resolve_descriptors(None, Some(&pom("Hudson", ""))).is_empty());
        assert!(resolve_descriptors(None, Some(&pom("", "http://ci"))).is_empty());
        assert!(resolve_descriptors(None, None).is_empty());
    }

    #[test]
    fn test_lookback_window_since() {
        let now = DateTime::from_timestamp(10 * 86_400, 0).unwrap();

        assert_eq!(LookbackWindow::default().days, 30);
        assert_eq!(
            LookbackWindow::new(3).since(now),
            DateTime::from_timestamp(7 * 86_400, 0).unwrap()
        );
        assert_eq!(LookbackWindow::new(0).since(now), now);
        assert_eq!(
            LookbackWindow::new(u32::MAX).since(now),
            DateTime::<Utc>::MIN_UTC
        );
    }
}
