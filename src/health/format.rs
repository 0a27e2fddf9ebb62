// src/health/format.rs
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::HealthError;

/// Wire encoding used for the health response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Protobuf encoded `CheckResponse`
    #[default]
    Proto,
    /// `{"status":"SERVING"}`
    Json,
    /// Bare status name as plain text
    Mesg,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Proto => "proto",
            OutputFormat::Json => "json",
            OutputFormat::Mesg => "mesg",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            OutputFormat::Proto => "application/x-protobuf",
            OutputFormat::Json => "application/json",
            OutputFormat::Mesg => "text/plain; charset=utf-8",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = HealthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "proto" => Ok(OutputFormat::Proto),
            "json" => Ok(OutputFormat::Json),
            "mesg" => Ok(OutputFormat::Mesg),
            _ => Err(HealthError::InvalidFormat(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("Mesg".parse::<OutputFormat>().unwrap(), OutputFormat::Mesg);
        assert_eq!("proto".parse::<OutputFormat>().unwrap(), OutputFormat::Proto);
    }

    #[test]
    fn test_parse_rejects_unknown() {
        let err = "xml".parse::<OutputFormat>().unwrap_err();
        assert!(matches!(err, HealthError::InvalidFormat(ref v) if v == "xml"));
    }

    #[test]
    fn test_display_matches_query_spelling() {
        for format in [OutputFormat::Proto, OutputFormat::Json, OutputFormat::Mesg] {
            assert_eq!(format.to_string().parse::<OutputFormat>().unwrap(), format);
        }
    }

    #[test]
    fn test_deserialize_from_config_value() {
        let format: OutputFormat = serde_json::from_str("\"mesg\"").unwrap();
        assert_eq!(format, OutputFormat::Mesg);
    }
}
