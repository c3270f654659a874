//! Natural language to KQL translation
//!
//! A shortcut table handles the questions people actually type, a pattern
//! fallback covers the rest. Translation never fails; something executable
//! always comes back. The analytics engine downstream stays agnostic of
//! the query language produced here.

/// Shortcut table, in priority order. Exact matches win, then the first
/// keyword contained in the question.
const SHORTCUTS: &[(&str, &str)] = &[
    // Errors and exceptions
    ("errors", "AzureDiagnostics | where Level == 'Error' or Category contains 'Error' | where TimeGenerated > ago(24h) | order by TimeGenerated desc | take 100"),
    ("error", "AzureDiagnostics | where Level == 'Error' or Category contains 'Error' | where TimeGenerated > ago(24h) | order by TimeGenerated desc | take 100"),
    ("exceptions", "AppExceptions | where TimeGenerated > ago(24h) | order by TimeGenerated desc | take 100"),
    ("exception", "AppExceptions | where TimeGenerated > ago(24h) | order by TimeGenerated desc | take 100"),
    ("failures", "AppRequests | where Success == false | where TimeGenerated > ago(24h) | order by TimeGenerated desc | take 100"),
    ("failed", "AppRequests | where Success == false | where TimeGenerated > ago(24h) | order by TimeGenerated desc | take 100"),
    ("crashes", "AppExceptions | where TimeGenerated > ago(24h) | order by TimeGenerated desc | take 100"),
    // App Service
    ("app service", "AppServiceHTTPLogs | where TimeGenerated > ago(24h) | order by TimeGenerated desc | take 100"),
    ("web app", "AppServiceHTTPLogs | where TimeGenerated > ago(24h) | order by TimeGenerated desc | take 100"),
    ("http logs", "AppServiceHTTPLogs | where TimeGenerated > ago(24h) | order by TimeGenerated desc | take 100"),
    ("console logs", "AppServiceConsoleLogs | where TimeGenerated > ago(24h) | order by TimeGenerated desc | take 100"),
    // Functions
    ("functions", "FunctionAppLogs | where TimeGenerated > ago(24h) | order by TimeGenerated desc | take 100"),
    ("function", "FunctionAppLogs | where TimeGenerated > ago(24h) | order by TimeGenerated desc | take 100"),
    ("serverless", "FunctionAppLogs | where TimeGenerated > ago(24h) | order by TimeGenerated desc | take 100"),
    // Activity and audit
    ("activity", "AzureActivity | where TimeGenerated > ago(24h) | order by TimeGenerated desc | take 100"),
    ("audit logs", "AuditLogs | where TimeGenerated > ago(24h) | order by TimeGenerated desc | take 100"),
    ("audit", "AzureActivity | where TimeGenerated > ago(24h) | order by TimeGenerated desc | take 100"),
    ("who did", "AzureActivity | where TimeGenerated > ago(24h) | project TimeGenerated, Caller, OperationNameValue, ResourceGroup, _ResourceId | order by TimeGenerated desc | take 100"),
    ("deployments", "AzureActivity | where OperationNameValue contains 'deploy' or OperationNameValue contains 'write' | where TimeGenerated > ago(24h) | order by TimeGenerated desc | take 100"),
    ("changes", "AzureActivity | where TimeGenerated > ago(24h) | order by TimeGenerated desc | take 100"),
    // Sign-ins
    ("who logged in", "SigninLogs | where TimeGenerated > ago(24h) | project TimeGenerated, UserPrincipalName, AppDisplayName, IPAddress, Location, Status | order by TimeGenerated desc | take 100"),
    ("failed logins", "SigninLogs | where ResultType != '0' | where TimeGenerated > ago(24h) | order by TimeGenerated desc | take 100"),
    ("sign in", "SigninLogs | where TimeGenerated > ago(24h) | order by TimeGenerated desc | take 100"),
    ("signin", "SigninLogs | where TimeGenerated > ago(24h) | order by TimeGenerated desc | take 100"),
    ("login", "SigninLogs | where TimeGenerated > ago(24h) | order by TimeGenerated desc | take 100"),
    ("logon", "SigninLogs | where TimeGenerated > ago(24h) | order by TimeGenerated desc | take 100"),
    ("authentication", "SigninLogs | where TimeGenerated > ago(24h) | order by TimeGenerated desc | take 100"),
    // Performance
    ("cpu", "Perf | where ObjectName == 'Processor' and CounterName == '% Processor Time' | where TimeGenerated > ago(1h) | summarize AvgCPU=avg(CounterValue) by Computer, bin(TimeGenerated, 5m) | order by TimeGenerated desc"),
    ("memory", "Perf | where ObjectName == 'Memory' and CounterName == '% Committed Bytes In Use' | where TimeGenerated > ago(1h) | summarize AvgMemory=avg(CounterValue) by Computer, bin(TimeGenerated, 5m) | order by TimeGenerated desc"),
    ("disk", "Perf | where ObjectName == 'LogicalDisk' and CounterName == '% Free Space' | where TimeGenerated > ago(1h) | summarize AvgFreeSpace=avg(CounterValue) by Computer, InstanceName, bin(TimeGenerated, 5m) | order by TimeGenerated desc"),
    ("performance", "Perf | where TimeGenerated > ago(1h) | order by TimeGenerated desc | take 100"),
    ("perf", "Perf | where TimeGenerated > ago(1h) | order by TimeGenerated desc | take 100"),
    // VMs and heartbeat
    ("heartbeat", "Heartbeat | summarize LastHeartbeat=max(TimeGenerated) by Computer, OSType, Version | order by LastHeartbeat desc | take 100"),
    ("vm health", "Heartbeat | summarize LastHeartbeat=max(TimeGenerated) by Computer, OSType | order by LastHeartbeat desc | take 100"),
    ("virtual machines", "Heartbeat | summarize LastHeartbeat=max(TimeGenerated) by Computer, OSType, ComputerEnvironment | order by LastHeartbeat desc | take 100"),
    ("computers", "Heartbeat | summarize LastHeartbeat=max(TimeGenerated) by Computer, OSType | order by LastHeartbeat desc | take 100"),
    // Containers and Kubernetes
    ("container", "ContainerLog | where TimeGenerated > ago(24h) | order by TimeGenerated desc | take 100"),
    ("docker", "ContainerLog | where TimeGenerated > ago(24h) | order by TimeGenerated desc | take 100"),
    ("kubernetes", "KubeEvents | where TimeGenerated > ago(24h) | order by TimeGenerated desc | take 100"),
    ("k8s", "KubeEvents | where TimeGenerated > ago(24h) | order by TimeGenerated desc | take 100"),
    ("pods", "KubePodInventory | where TimeGenerated > ago(1h) | order by TimeGenerated desc | take 100"),
    // Security
    ("security alerts", "SecurityAlert | where TimeGenerated > ago(24h) | order by TimeGenerated desc | take 100"),
    ("alerts", "SecurityAlert | where TimeGenerated > ago(24h) | order by TimeGenerated desc | take 100"),
    ("threats", "SecurityAlert | where TimeGenerated > ago(24h) | order by TimeGenerated desc | take 100"),
    ("security", "SecurityEvent | where TimeGenerated > ago(24h) | order by TimeGenerated desc | take 100"),
    // Application Insights
    ("requests", "AppRequests | where TimeGenerated > ago(24h) | order by TimeGenerated desc | take 100"),
    ("traces", "AppTraces | where TimeGenerated > ago(24h) | order by TimeGenerated desc | take 100"),
    ("dependencies", "AppDependencies | where TimeGenerated > ago(24h) | order by TimeGenerated desc | take 100"),
    ("page views", "AppPageViews | where TimeGenerated > ago(24h) | order by TimeGenerated desc | take 100"),
    ("availability", "AppAvailabilityResults | where TimeGenerated > ago(24h) | order by TimeGenerated desc | take 100"),
    // Diagnostics and platform logs
    ("diagnostics", "AzureDiagnostics | where TimeGenerated > ago(24h) | order by TimeGenerated desc | take 100"),
    ("resource logs", "AzureDiagnostics | where TimeGenerated > ago(24h) | order by TimeGenerated desc | take 100"),
    ("syslog", "Syslog | where TimeGenerated > ago(24h) | order by TimeGenerated desc | take 100"),
    ("linux logs", "Syslog | where TimeGenerated > ago(24h) | order by TimeGenerated desc | take 100"),
    ("windows events", "Event | where TimeGenerated > ago(24h) | order by TimeGenerated desc | take 100"),
    ("event log", "Event | where TimeGenerated > ago(24h) | order by TimeGenerated desc | take 100"),
    ("events", "Event | where TimeGenerated > ago(24h) | order by TimeGenerated desc | take 100"),
    // Data Factory, storage, SQL, metrics, updates
    ("data factory", "ADFActivityRun | where TimeGenerated > ago(24h) | order by TimeGenerated desc | take 100"),
    ("pipeline", "ADFPipelineRun | where TimeGenerated > ago(24h) | order by TimeGenerated desc | take 100"),
    ("storage", "StorageBlobLogs | where TimeGenerated > ago(24h) | order by TimeGenerated desc | take 100"),
    ("blob", "StorageBlobLogs | where TimeGenerated > ago(24h) | order by TimeGenerated desc | take 100"),
    ("sql", "AzureDiagnostics | where ResourceProvider == 'MICROSOFT.SQL' | where TimeGenerated > ago(24h) | order by TimeGenerated desc | take 100"),
    ("database", "AzureDiagnostics | where ResourceProvider == 'MICROSOFT.SQL' or ResourceProvider == 'MICROSOFT.DBFORMYSQL' or ResourceProvider == 'MICROSOFT.DBFORPOSTGRESQL' | where TimeGenerated > ago(24h) | order by TimeGenerated desc | take 100"),
    ("metrics", "AzureMetrics | where TimeGenerated > ago(1h) | order by TimeGenerated desc | take 100"),
    ("updates", "Update | where TimeGenerated > ago(7d) | order by TimeGenerated desc | take 100"),
    ("patches", "Update | where TimeGenerated > ago(7d) | order by TimeGenerated desc | take 100"),
];

/// Table detection keywords for the pattern fallback, checked in order.
const TABLE_PATTERNS: &[(&[&str], &str)] = &[
    (&["app service", "appservice", "web app", "webapp", "website", "http log"], "AppServiceHTTPLogs"),
    (&["function", "azure function", "serverless"], "FunctionAppLogs"),
    (&["activity", "who did", "changes", "deployment", "created", "deleted", "modified"], "AzureActivity"),
    (&["sign in", "signin", "login", "logon", "authentication", "logged in"], "SigninLogs"),
    (&["request", "api call"], "AppRequests"),
    (&["exception", "crash", "error"], "AppExceptions"),
    (&["trace"], "AppTraces"),
    (&["dependency", "external call"], "AppDependencies"),
    (&["security", "threat", "alert"], "SecurityEvent"),
    (&["container", "docker", "kubernetes", "k8s", "aks", "pod"], "ContainerLog"),
    (&["performance", "cpu", "memory", "disk", "perf"], "Perf"),
    (&["heartbeat", "vm", "virtual machine", "computer"], "Heartbeat"),
    (&["syslog", "linux"], "Syslog"),
    (&["windows event", "event log"], "Event"),
];

fn time_filter(question: &str) -> &'static str {
    if question.contains("last hour") || question.contains("1 hour") {
        "| where TimeGenerated > ago(1h)"
    } else if question.contains("last 7 days")
        || question.contains("last week")
        || question.contains("7 days")
    {
        "| where TimeGenerated > ago(7d)"
    } else if question.contains("last 30 days")
        || question.contains("last month")
        || question.contains("30 days")
    {
        "| where TimeGenerated > ago(30d)"
    } else if question.contains("yesterday") {
        "| where TimeGenerated between(ago(48h)..ago(24h))"
    } else {
        // "today" and everything unphrased default to 24h
        "| where TimeGenerated > ago(24h)"
    }
}

fn pattern_translation(question: &str) -> String {
    let filter = time_filter(question);

    let table = TABLE_PATTERNS
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|word| question.contains(word)))
        .map(|(_, table)| *table)
        .unwrap_or("AzureDiagnostics");

    format!("{table} {filter} | order by TimeGenerated desc | take 100")
}

/// Translate a natural-language question into KQL.
pub fn translate(question: &str) -> String {
    let lowered = question.to_lowercase();
    let lowered = lowered.trim();

    if let Some((_, kql)) = SHORTCUTS.iter().find(|(keyword, _)| *keyword == lowered) {
        return kql.to_string();
    }

    if let Some((keyword, kql)) = SHORTCUTS
        .iter()
        .find(|(keyword, _)| lowered.contains(keyword))
    {
        tracing::debug!(keyword, "shortcut keyword matched");
        return kql.to_string();
    }

    pattern_translation(lowered)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_shortcut_match() {
        assert!(translate("CPU").starts_with("Perf | where ObjectName == 'Processor'"));
        assert!(translate("  heartbeat  ").starts_with("Heartbeat | summarize"));
    }

    #[test]
    fn test_substring_shortcut_match() {
        let kql = translate("show me all the exceptions please");
        assert!(kql.starts_with("AppExceptions"));
    }

    #[test]
    fn test_shortcut_priority_order() {
        // "errors" appears before "security" in the table
        let kql = translate("errors in security");
        assert!(kql.starts_with("AzureDiagnostics | where Level == 'Error'"));
    }

    #[test]
    fn test_pattern_time_extraction() {
        let kql = translate("what happened to the webapp in the last week");
        assert!(kql.contains("ago(7d)"));
        assert!(kql.starts_with("AppServiceHTTPLogs"));
    }

    #[test]
    fn test_pattern_yesterday_window() {
        let kql = translate("what broke on the vm fleet yesterday");
        assert!(kql.contains("between(ago(48h)..ago(24h))"));
        assert!(kql.starts_with("Heartbeat"));
    }

    #[test]
    fn test_default_table_and_window() {
        let kql = translate("anything unusual going on");
        assert_eq!(
            kql,
            "AzureDiagnostics | where TimeGenerated > ago(24h) | order by TimeGenerated desc | take 100"
        );
    }

    #[test]
    fn test_never_empty() {
        assert!(!translate("").is_empty());
    }
}
