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

    const YAML: &str = r#"
backends:
  - url: http://10.0.0.1:8080
    weight: 5
  - url: http://10.0.0.2:8080
    weight: 1
    available: false
    failure_rate: 0.25
simulation:
  iterations: 300
  workers: 2
retry:
  max_attempts: 4
  backoff_base_ms: 2
  backoff_max_ms: 50
report:
  format: json
"#;

    #[test]
    fn test_parse_yaml_with_defaults() {
        let config = parse_config(YAML, true).unwrap();
        config.validate().unwrap();

        assert_eq!(config.backends.len(), 2);
        assert!(config.backends[0].available);
        assert_eq!(config.backends[0].failure_rate, 0.0);
        assert!(!config.backends[1].available);
        assert_eq!(config.simulation.iterations, 300);
        assert_eq!(config.simulation.seed, 42);
        assert_eq!(config.retry.max_attempts, 4);
        assert!(config.metrics.enabled);
        assert_eq!(config.report.format, ReportFormat::Json);
    }

    #[test]
    fn test_parse_json() {
        let json = r#"{"backends": [{"url": "http://a:1", "weight": 2}]}"#;
        let config = parse_config(json, false).unwrap();

        assert_eq!(config.backends[0].weight, 2);
        assert_eq!(config.simulation.iterations, 10_000);
        assert_eq!(config.report.format, ReportFormat::Table);
    }

    #[test]
    fn test_yaml_detection() {
        assert!(is_yaml(Path::new("lb.yaml")));
        assert!(is_yaml(Path::new("lb.yml")));
        assert!(!is_yaml(Path::new("lb.json")));
        assert!(!is_yaml(Path::new("lb")));
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let err = load_config("/nonexistent/balancer.yaml").await.unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
