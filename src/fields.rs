//! Enumerations and field types for scheduled tasks.
//!
//! This module defines the display status values, the `auto`-or-explicit
//! status setting stored on every task, and the small enums used by the CLI
//! for sorting and resizing.

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Display status of a task.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Hash)]
pub enum Status {
    #[serde(rename = "On Track")]
    OnTrack,
    #[serde(rename = "At Risk")]
    AtRisk,
    #[serde(rename = "Delayed")]
    Delayed,
    #[serde(rename = "Complete")]
    Complete,
}

impl Status {
    pub fn label(self) -> &'static str {
        match self {
            Status::OnTrack => "On Track",
            Status::AtRisk => "At Risk",
            Status::Delayed => "Delayed",
            Status::Complete => "Complete",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Stored status of a task: either derived on read, or pinned by the user.
///
/// Serialised as the string `"auto"` or one of the [`Status`] labels so that
/// task files stay compatible with the flat string field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum StatusSetting {
    #[default]
    Auto,
    Explicit(Status),
}

impl StatusSetting {
    pub fn is_auto(self) -> bool {
        matches!(self, StatusSetting::Auto)
    }
}

impl fmt::Display for StatusSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusSetting::Auto => f.write_str("auto"),
            StatusSetting::Explicit(s) => f.write_str(s.label()),
        }
    }
}

impl From<StatusSetting> for String {
    fn from(value: StatusSetting) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for StatusSetting {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl FromStr for StatusSetting {
    type Err = String;

    /// Accepts the stored labels ("On Track") as well as CLI spellings ("on-track").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm = s.trim().to_lowercase().replace(['-', '_'], " ");
        match norm.as_str() {
            "auto" => Ok(StatusSetting::Auto),
            "on track" => Ok(StatusSetting::Explicit(Status::OnTrack)),
            "at risk" => Ok(StatusSetting::Explicit(Status::AtRisk)),
            "delayed" => Ok(StatusSetting::Explicit(Status::Delayed)),
            "complete" => Ok(StatusSetting::Explicit(Status::Complete)),
            other => Err(format!(
                "invalid status: {other} (expected auto, on-track, at-risk, delayed or complete)"
            )),
        }
    }
}

/// Which edge of a task bar a resize moves.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum Handle {
    Start,
    End,
}

/// Available sorting options for task lists.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SortKey {
    Start,
    End,
    Id,
    Name,
}

/// Value kind of a user-defined task column.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    #[default]
    Text,
}

/// A user-defined column every task may carry a value for.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CustomField {
    pub name: String,
    #[serde(rename = "type", default)]
    pub field_type: FieldType,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_setting_serialises_as_flat_string() {
        let auto = serde_json::to_string(&StatusSetting::Auto).unwrap();
        assert_eq!(auto, "\"auto\"");
        let risk = serde_json::to_string(&StatusSetting::Explicit(Status::AtRisk)).unwrap();
        assert_eq!(risk, "\"At Risk\"");

        let back: StatusSetting = serde_json::from_str("\"On Track\"").unwrap();
        assert_eq!(back, StatusSetting::Explicit(Status::OnTrack));
        let back: StatusSetting = serde_json::from_str("\"auto\"").unwrap();
        assert!(back.is_auto());
    }

    #[test]
    fn custom_field_schema_entry_shape() {
        let field = CustomField { name: "Owner".into(), field_type: FieldType::Text };
        let json = serde_json::to_string(&field).unwrap();
        assert_eq!(json, r#"{"name":"Owner","type":"text"}"#);
        let back: CustomField = serde_json::from_str(r#"{"name":"Owner"}"#).unwrap();
        assert_eq!(back, field);
    }

    #[test]
    fn status_setting_rejects_unknown_values() {
        assert!(serde_json::from_str::<StatusSetting>("\"Blocked\"").is_err());
        assert!("".parse::<StatusSetting>().is_err());
    }

    #[test]
    fn status_setting_parses_cli_spellings() {
        assert_eq!("at-risk".parse::<StatusSetting>(), Ok(StatusSetting::Explicit(Status::AtRisk)));
        assert_eq!("Complete".parse::<StatusSetting>(), Ok(StatusSetting::Explicit(Status::Complete)));
        assert_eq!(" AUTO ".parse::<StatusSetting>(), Ok(StatusSetting::Auto));
    }
}
