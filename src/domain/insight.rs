// Insight domain model
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Ok,
    Note,
    Warning,
    Alert,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Ok => "OK",
            Severity::Note => "NOTE",
            Severity::Warning => "WARNING",
            Severity::Alert => "ALERT",
            Severity::Info => "INFO",
        };
        f.write_str(label)
    }
}

/// A severity-tagged finding about the current series. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insight {
    pub severity: Severity,
    pub text: String,
}

impl Insight {
    pub fn new(severity: Severity, text: impl Into<String>) -> Self {
        Self {
            severity,
            text: text.into(),
        }
    }
}

impl fmt::Display for Insight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.severity, self.text)
    }
}
