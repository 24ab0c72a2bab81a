//! Doctor command for system diagnostics
//!
//! Checks everything a chat turn depends on: config, API key, the Gemini
//! model endpoint and the Qdrant collection.

use colored::*;
use std::time::Duration;

use crate::cli::Config;
use crate::completion::GeminiClient;
use crate::index::QdrantIndex;

/// Health check result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    Pass(String),
    Warn(String),
    Fail(String),
}

/// Individual health check
#[derive(Debug, Clone)]
pub struct HealthCheck {
    pub name: String,
    pub status: HealthStatus,
}

impl HealthCheck {
    fn new(name: &str, status: HealthStatus) -> Self {
        Self {
            name: name.to_string(),
            status,
        }
    }
}

/// Collected results of one doctor run
#[derive(Debug, Clone, Default)]
pub struct DoctorReport {
    pub checks: Vec<HealthCheck>,
}

impl DoctorReport {
    /// Healthy when nothing failed; warnings are allowed
    pub fn is_healthy(&self) -> bool {
        !self.checks.iter().any(|c| matches!(c.status, HealthStatus::Fail(_)))
    }

    /// Print the report as a table
    pub fn print(&self) {
        println!("\n{}\n", "mlchat System Diagnostics".bold().cyan());
        println!("{:<20} {}", "Check", "Status");
        println!("{}", "=".repeat(60));

        for check in &self.checks {
            let status = match &check.status {
                HealthStatus::Pass(msg) => format!("PASS {}", msg).green(),
                HealthStatus::Warn(msg) => format!("WARN {}", msg).yellow(),
                HealthStatus::Fail(msg) => format!("FAIL {}", msg).red(),
            };
            println!("{:<20} {}", check.name, status);
        }

        println!();
    }
}

/// Doctor diagnostics system
pub struct Doctor {
    config: Config,
    api_key: Option<String>,
}

impl Doctor {
    /// Create a new doctor for the effective configuration
    pub fn new(config: Config, api_key: Option<String>) -> Self {
        Self { config, api_key }
    }

    /// Run all health checks
    pub async fn run_checks(&self) -> DoctorReport {
        let mut checks = vec![self.check_config(), self.check_api_key()];

        checks.push(self.check_model_endpoint().await);
        checks.push(self.check_collection().await);

        DoctorReport { checks }
    }

    fn check_config(&self) -> HealthCheck {
        match self.config.validate() {
            Ok(()) => HealthCheck::new("Configuration", HealthStatus::Pass(String::new())),
            Err(e) => HealthCheck::new("Configuration", HealthStatus::Fail(e.to_string())),
        }
    }

    fn check_api_key(&self) -> HealthCheck {
        let present = self
            .api_key
            .as_deref()
            .map(|k| !k.trim().is_empty())
            .unwrap_or(false);

        if present {
            HealthCheck::new("API key", HealthStatus::Pass(String::new()))
        } else {
            HealthCheck::new(
                "API key",
                HealthStatus::Fail(format!("not set ({})", crate::completion::gemini::API_KEY_ENV)),
            )
        }
    }

    async fn check_model_endpoint(&self) -> HealthCheck {
        let name = "Gemini model";
        let client = match GeminiClient::with_config(
            &self.config.completion.api_base,
            &self.config.completion.model,
            self.api_key.clone(),
            Duration::from_secs(self.config.completion.timeout_secs.min(10)),
        ) {
            Ok(client) => client,
            Err(e) => return HealthCheck::new(name, HealthStatus::Fail(e.to_string())),
        };

        if !client.has_api_key() {
            return HealthCheck::new(name, HealthStatus::Warn("skipped, no API key".to_string()));
        }

        match client.health_check().await {
            Ok(true) => HealthCheck::new(name, HealthStatus::Pass(self.config.completion.model.clone())),
            Ok(false) => HealthCheck::new(
                name,
                HealthStatus::Fail(format!("{} rejected the request (check key and model)", self.config.completion.model)),
            ),
            Err(e) => HealthCheck::new(name, HealthStatus::Fail(e.to_string())),
        }
    }

    async fn check_collection(&self) -> HealthCheck {
        let name = "Vector index";
        match QdrantIndex::probe(&self.config.qdrant()).await {
            Ok(0) => HealthCheck::new(
                name,
                HealthStatus::Warn(format!("collection `{}` is empty", self.config.index.collection)),
            ),
            Ok(points) => HealthCheck::new(name, HealthStatus::Pass(format!("{} passages", points))),
            Err(e) => HealthCheck::new(name, HealthStatus::Fail(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_status_equality() {
        assert_eq!(HealthStatus::Pass(String::new()), HealthStatus::Pass(String::new()));
        assert_ne!(
            HealthStatus::Warn("test".to_string()),
            HealthStatus::Fail("test".to_string())
        );
    }

    #[test]
    fn test_report_healthy_with_warnings() {
        let report = DoctorReport {
            checks: vec![
                HealthCheck::new("A", HealthStatus::Pass(String::new())),
                HealthCheck::new("B", HealthStatus::Warn("warning".to_string())),
            ],
        };
        assert!(report.is_healthy());
    }

    #[test]
    fn test_report_unhealthy_on_failure() {
        let report = DoctorReport {
            checks: vec![
                HealthCheck::new("A", HealthStatus::Pass(String::new())),
                HealthCheck::new("B", HealthStatus::Fail("error".to_string())),
            ],
        };
        assert!(!report.is_healthy());
        report.print();
    }

    #[test]
    fn test_missing_api_key_fails() {
        let doctor = Doctor::new(Config::default(), None);
        assert!(matches!(doctor.check_api_key().status, HealthStatus::Fail(_)));

        let doctor = Doctor::new(Config::default(), Some("  ".to_string()));
        assert!(matches!(doctor.check_api_key().status, HealthStatus::Fail(_)));

        let doctor = Doctor::new(Config::default(), Some("key".to_string()));
        assert!(matches!(doctor.check_api_key().status, HealthStatus::Pass(_)));
    }

    #[test]
    fn test_invalid_config_fails() {
        let mut config = Config::default();
        config.index.top_k = 0;
        let doctor = Doctor::new(config, None);
        assert!(matches!(doctor.check_config().status, HealthStatus::Fail(_)));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_reports_transport_error() {
        // Grab a free port, then close it so connections are refused
        let addr = std::net::TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap();

        let mut config = Config::default();
        config.completion.api_base = format!("http://{}", addr);
        let doctor = Doctor::new(config, Some("key".to_string()));

        match doctor.check_model_endpoint().await.status {
            HealthStatus::Fail(msg) => {
                assert!(msg.starts_with("connection failed"), "unexpected: {}", msg);
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_model_check_skipped_without_key() {
        let doctor = Doctor::new(Config::default(), None);
        let check = doctor.check_model_endpoint().await;
        assert!(matches!(check.status, HealthStatus::Warn(_)));
    }
}
