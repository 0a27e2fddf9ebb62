// src/config/mod.rs
mod models;

pub use models::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a file (YAML or JSON)
pub async fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file {}", path.display()))?;

    let config = parse_config(&contents, is_yaml(path))?;
    config.validate()?;
    Ok(config)
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|s| s.to_str()),
        Some("yaml") | Some("yml")
    )
}

fn parse_config(contents: &str, yaml: bool) -> Result<Config> {
    let config = if yaml {
        serde_yaml::from_str(contents).context("Failed to parse YAML config")?
    } else {
        serde_json::from_str(contents).context("Failed to parse JSON config")?
    };
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::OutputFormat;

    const YAML: &str = r#"
listen_addr: "127.0.0.1:8080"
health:
  output_format: mesg
  services:
    - name: svc-a
    - name: svc-b
      upstream: http://10.0.0.2:8080/health
auth:
  bearer_tokens: ["secret"]
metrics:
  enabled: true
  port: 9100
"#;

    #[test]
    fn test_parse_yaml() {
        let config = parse_config(YAML, true).unwrap();
        config.validate().unwrap();

        assert_eq!(config.health.route, "/health");
        assert_eq!(config.health.output_format, OutputFormat::Mesg);
        assert_eq!(config.health.services.len(), 2);
        assert!(config.health.services[0].upstream.is_none());
        assert_eq!(
            config.health.services[1].upstream.as_ref().unwrap().as_str(),
            "http://10.0.0.2:8080/health"
        );
        assert_eq!(config.metrics.path, "/metrics");
        assert_eq!(config.metrics.port, 9100);
    }

    #[test]
    fn test_parse_json_defaults() {
        let config = parse_config("{}", false).unwrap();
        config.validate().unwrap();

        assert_eq!(config.listen_addr.port(), 8080);
        assert_eq!(config.health.output_format, OutputFormat::Proto);
        assert!(config.auth.is_none());
        assert!(!config.metrics.enabled);
    }

    #[test]
    fn test_rejects_bad_format() {
        assert!(parse_config(r#"{"health":{"output_format":"xml"}}"#, false).is_err());
    }

    #[test]
    fn test_validate_rejects_duplicates() {
        let config = parse_config(
            r#"{"health":{"services":[{"name":"a"},{"name":"a"}]}}"#,
            false,
        )
        .unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate service: a"));
    }

    #[test]
    fn test_validate_rejects_empty_tokens() {
        let config = parse_config(r#"{"auth":{"bearer_tokens":[]}}"#, false).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_https_upstream() {
        let config = parse_config(
            r#"{"health":{"services":[{"name":"a","upstream":"https://x/health"}]}}"#,
            false,
        )
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let err = load_config("/nonexistent/health.yaml").await.unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
