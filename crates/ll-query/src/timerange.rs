//! Time range resolution
//!
//! Converts a preset or explicit interval selection into a KQL filter
//! clause appended to outgoing queries. The clause syntax is an opaque
//! template as far as the analytics engine is concerned.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A user-selected time window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeRangeSelection {
    LastHour,
    Last6Hours,
    Last24Hours,
    Last7Days,
    Last30Days,
    /// No time filtering at all
    All,
    /// Explicit interval, inclusive both ends, exactly as supplied. Missing
    /// bounds fall back to the 24h preset rather than failing.
    Custom {
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    },
}

impl Default for TimeRangeSelection {
    fn default() -> Self {
        TimeRangeSelection::Last24Hours
    }
}

fn instant(t: DateTime<Utc>) -> String {
    t.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

impl TimeRangeSelection {
    /// Parse the preset labels the dashboard exposes.
    pub fn from_preset(label: &str) -> Option<Self> {
        match label {
            "1h" => Some(TimeRangeSelection::LastHour),
            "6h" => Some(TimeRangeSelection::Last6Hours),
            "24h" => Some(TimeRangeSelection::Last24Hours),
            "7d" => Some(TimeRangeSelection::Last7Days),
            "30d" => Some(TimeRangeSelection::Last30Days),
            "all" => Some(TimeRangeSelection::All),
            _ => None,
        }
    }

    fn lookback(self) -> Option<Duration> {
        match self {
            TimeRangeSelection::LastHour => Some(Duration::hours(1)),
            TimeRangeSelection::Last6Hours => Some(Duration::hours(6)),
            TimeRangeSelection::Last24Hours => Some(Duration::hours(24)),
            TimeRangeSelection::Last7Days => Some(Duration::days(7)),
            TimeRangeSelection::Last30Days => Some(Duration::days(30)),
            _ => None,
        }
    }

    /// Resolve the selection into a filter clause, or an empty string for
    /// the unfiltered selection.
    pub fn resolve(self, now: DateTime<Utc>) -> String {
        match self {
            TimeRangeSelection::All => String::new(),
            TimeRangeSelection::Custom {
                start: Some(start),
                end: Some(end),
            } => format!(
                "| where TimeGenerated between (datetime({}) .. datetime({}))",
                instant(start),
                instant(end)
            ),
            TimeRangeSelection::Custom { .. } => {
                // Incomplete custom range: documented fallback, not a failure
                tracing::debug!("custom range missing a bound; falling back to 24h");
                TimeRangeSelection::Last24Hours.resolve(now)
            }
            preset => {
                let lookback = preset.lookback().unwrap_or_else(|| Duration::hours(24));
                format!(
                    "| where TimeGenerated >= datetime({})",
                    instant(now - lookback)
                )
            }
        }
    }

    /// Append the resolved clause to the literal query text. Purely
    /// additive; the query itself is never rewritten.
    pub fn apply(self, query: &str, now: DateTime<Utc>) -> String {
        let clause = self.resolve(now);
        if clause.is_empty() {
            query.to_string()
        } else {
            format!("{query} {clause}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_six_hour_preset() {
        let clause = TimeRangeSelection::Last6Hours.resolve(noon());
        assert_eq!(
            clause,
            "| where TimeGenerated >= datetime(2024-01-01T06:00:00Z)"
        );
    }

    #[test]
    fn test_all_presets_reference_now_minus_lookback() {
        let cases = [
            (TimeRangeSelection::LastHour, "2024-01-01T11:00:00Z"),
            (TimeRangeSelection::Last24Hours, "2023-12-31T12:00:00Z"),
            (TimeRangeSelection::Last7Days, "2023-12-25T12:00:00Z"),
            (TimeRangeSelection::Last30Days, "2023-12-02T12:00:00Z"),
        ];
        for (selection, expected) in cases {
            assert!(selection.resolve(noon()).contains(expected));
        }
    }

    #[test]
    fn test_all_time_is_empty() {
        assert_eq!(TimeRangeSelection::All.resolve(noon()), "");
        assert_eq!(
            TimeRangeSelection::All.apply("Heartbeat | take 10", noon()),
            "Heartbeat | take 10"
        );
    }

    #[test]
    fn test_custom_between_inclusive() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let clause = TimeRangeSelection::Custom {
            start: Some(start),
            end: Some(end),
        }
        .resolve(noon());
        assert_eq!(
            clause,
            "| where TimeGenerated between (datetime(2024-01-01T00:00:00Z) .. datetime(2024-01-02T00:00:00Z))"
        );
    }

    #[test]
    fn test_incomplete_custom_falls_back_to_24h() {
        let selection = TimeRangeSelection::Custom {
            start: Some(noon()),
            end: None,
        };
        assert_eq!(
            selection.resolve(noon()),
            TimeRangeSelection::Last24Hours.resolve(noon())
        );
    }

    #[test]
    fn test_apply_appends() {
        let applied = TimeRangeSelection::Last6Hours.apply("AzureActivity | take 5", noon());
        assert_eq!(
            applied,
            "AzureActivity | take 5 | where TimeGenerated >= datetime(2024-01-01T06:00:00Z)"
        );
    }

    #[test]
    fn test_preset_labels() {
        assert_eq!(
            TimeRangeSelection::from_preset("6h"),
            Some(TimeRangeSelection::Last6Hours)
        );
        assert_eq!(
            TimeRangeSelection::from_preset("all"),
            Some(TimeRangeSelection::All)
        );
        assert_eq!(TimeRangeSelection::from_preset("2w"), None);
    }
}
