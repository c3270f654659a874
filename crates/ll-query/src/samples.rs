//! Sample query catalog
//!
//! Suggested natural-language questions grouped by category for the
//! dashboard's inspiration panel, plus a set of named full KQL queries for
//! common scenarios.

/// A category of suggested natural-language queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleCategory {
    pub name: &'static str,
    pub queries: &'static [&'static str],
}

const CATEGORIES: &[SampleCategory] = &[
    SampleCategory {
        name: "Errors & Exceptions",
        queries: &[
            "Show me all errors from the last hour",
            "What are the top 10 exceptions today?",
            "List failed requests by status code",
        ],
    },
    SampleCategory {
        name: "Security",
        queries: &[
            "Show failed sign-in attempts",
            "List suspicious activities in the last 24 hours",
            "Who accessed the resources yesterday?",
        ],
    },
    SampleCategory {
        name: "Performance",
        queries: &[
            "Show slow requests over 5 seconds",
            "What is the average response time by endpoint?",
            "List requests with high CPU usage",
        ],
    },
    SampleCategory {
        name: "Activity",
        queries: &[
            "What resources were created today?",
            "Show all deployment activities",
            "List configuration changes this week",
        ],
    },
];

/// Named full-KQL samples for common scenarios.
const NAMED_QUERIES: &[(&str, &str)] = &[
    (
        "recent_activity",
        "AzureActivity | where TimeGenerated > ago(24h) | project TimeGenerated, OperationName, ActivityStatus, Caller, ResourceGroup | order by TimeGenerated desc | take 100",
    ),
    (
        "failed_operations",
        "AzureActivity | where TimeGenerated > ago(24h) | where ActivityStatus == 'Failed' | summarize FailureCount = count() by OperationName, ResourceGroup | order by FailureCount desc",
    ),
    (
        "error_summary",
        "AzureDiagnostics | where TimeGenerated > ago(24h) | where Level == 'Error' | summarize ErrorCount = count() by ResourceType, Resource | order by ErrorCount desc",
    ),
    (
        "top_error_messages",
        "AzureDiagnostics | where TimeGenerated > ago(24h) | where Level == 'Error' | summarize Count = count() by Message | order by Count desc | take 10",
    ),
    (
        "cpu_usage",
        "Perf | where TimeGenerated > ago(1h) | where ObjectName == 'Processor' and CounterName == '% Processor Time' | summarize AvgCPU = avg(CounterValue) by Computer, bin(TimeGenerated, 5m) | order by TimeGenerated desc",
    ),
    (
        "failed_logins",
        "SecurityEvent | where TimeGenerated > ago(24h) | where EventID == 4625 | summarize FailedAttempts = count() by Account, Computer, IpAddress | order by FailedAttempts desc",
    ),
    (
        "request_performance",
        "AppRequests | where TimeGenerated > ago(1h) | summarize RequestCount = count(), AvgDuration = avg(DurationMs), P95Duration = percentile(DurationMs, 95) by Name, bin(TimeGenerated, 5m) | order by TimeGenerated desc",
    ),
    (
        "exceptions",
        "AppExceptions | where TimeGenerated > ago(24h) | summarize ExceptionCount = count() by ExceptionType, ProblemId | order by ExceptionCount desc | take 20",
    ),
    (
        "agent_heartbeat",
        "Heartbeat | summarize LastHeartbeat = max(TimeGenerated) by Computer, OSType, Version | extend MinutesAgo = datetime_diff('minute', now(), LastHeartbeat) | order by MinutesAgo desc",
    ),
    (
        "offline_agents",
        "Heartbeat | summarize LastHeartbeat = max(TimeGenerated) by Computer | where LastHeartbeat < ago(30m) | project Computer, LastHeartbeat, MinutesOffline = datetime_diff('minute', now(), LastHeartbeat) | order by MinutesOffline desc",
    ),
];

/// The suggested-query categories in display order.
pub fn sample_categories() -> &'static [SampleCategory] {
    CATEGORIES
}

/// Look up a named KQL sample.
pub fn sample_query(name: &str) -> Option<&'static str> {
    NAMED_QUERIES
        .iter()
        .find(|(key, _)| *key == name)
        .map(|(_, kql)| *kql)
}

/// Names of all KQL samples, in catalog order.
pub fn sample_query_names() -> Vec<&'static str> {
    NAMED_QUERIES.iter().map(|(name, _)| *name).collect()
}
