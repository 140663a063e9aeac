use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// Concatenation family of a file-set.
///
/// Every file-set registered under one task name belongs to one family; the
/// family picks the minifier command and the style of the source-map comment
/// appended to the merged unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Styles,
    Scripts,
}

impl SourceKind {
    /// Infer the kind from a task name, for the conventional task names.
    pub fn infer(task_name: &str) -> Option<Self> {
        match task_name {
            "styles" => Some(SourceKind::Styles),
            "scripts" => Some(SourceKind::Scripts),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Styles => "styles",
            SourceKind::Scripts => "scripts",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "styles" => Ok(SourceKind::Styles),
            "scripts" => Ok(SourceKind::Scripts),
            other => Err(format!(
                "invalid source kind: {other} (expected \"styles\" or \"scripts\")"
            )),
        }
    }
}
