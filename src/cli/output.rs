//! Output formatting for CLI commands.

use serde::Serialize;

use crate::error::CommandError;

/// How command results are written to stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
}

impl OutputFormat {
    /// Parses a format name. Unknown names fall back to text.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }

    /// Serializes `value` as pretty JSON, newline-terminated.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::OutputFormat`] if `value` cannot be serialized.
    pub fn to_json<T: Serialize>(self, value: &T) -> Result<String, CommandError> {
        let mut out = serde_json::to_string_pretty(value)
            .map_err(|e| CommandError::OutputFormat(e.to_string()))?;
        out.push('\n');
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("text", OutputFormat::Text ; "text")]
    #[test_case("json", OutputFormat::Json ; "json")]
    #[test_case("JSON", OutputFormat::Json ; "uppercase json")]
    #[test_case("yaml", OutputFormat::Text ; "unknown falls back")]
    fn test_parse(input: &str, expected: OutputFormat) {
        assert_eq!(OutputFormat::parse(input), expected);
    }

    #[test]
    fn test_to_json() {
        let out = OutputFormat::Json
            .to_json(&serde_json::json!({ "rows": 3 }))
            .unwrap_or_default();
        assert!(out.ends_with('\n'));
        assert!(out.contains("\"rows\": 3"));
    }

    #[test]
    fn test_to_json_failure_is_output_format_error() {
        // JSON object keys must be strings.
        let value = std::collections::BTreeMap::from([((1, 2), "pair")]);
        let result = OutputFormat::Json.to_json(&value);
        assert!(matches!(result, Err(CommandError::OutputFormat(_))));
    }
}
