use std::sync::Mutex;

use crate::domain::ports::DiagnosticLog;

/// Forwards diagnostic events to `tracing`, tagged with the emitting component.
#[derive(Debug, Clone, Copy)]
pub struct TracingLog {
    component: &'static str,
}

impl TracingLog {
    pub const fn new(component: &'static str) -> Self {
        Self { component }
    }
}

impl DiagnosticLog for TracingLog {
    fn log(&self, event: &str, details: &[(&str, String)]) {
        let details = details
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join(" ");
        tracing::debug!(component = self.component, %details, "{event}");
    }
}

/// Keeps events in memory. Handy for asserting on what a component reported.
#[derive(Debug, Default)]
pub struct MemoryLog {
    events: Mutex<Vec<(String, Vec<(String, String)>)>>,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<String> {
        self.events
            .lock()
            .map(|events| events.iter().map(|(event, _)| event.clone()).collect())
            .unwrap_or_default()
    }

    /// Value of `key` on the most recent `event`, if any.
    pub fn detail(&self, event: &str, key: &str) -> Option<String> {
        let events = self.events.lock().ok()?;
        events
            .iter()
            .rev()
            .find(|(name, _)| name == event)
            .and_then(|(_, details)| details.iter().find(|(k, _)| k == key))
            .map(|(_, value)| value.clone())
    }
}

impl DiagnosticLog for MemoryLog {
    fn log(&self, event: &str, details: &[(&str, String)]) {
        if let Ok(mut events) = self.events.lock() {
            events.push((
                event.to_string(),
                details
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.clone()))
                    .collect(),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_log_records_details() {
        let log = MemoryLog::new();
        log.log("fetched", &[("status", "200".to_string())]);
        log.log("fetched", &[("status", "404".to_string())]);

        assert_eq!(log.events(), vec!["fetched", "fetched"]);
        assert_eq!(log.detail("fetched", "status").as_deref(), Some("404"));
        assert_eq!(log.detail("missing", "status"), None);
    }
}
