use std::env;
use std::fmt;

/// Distinguishes runtime behavior for different stages of the auditor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the auditor and its command-line driver.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub telemetry: TelemetryConfig,
    pub audit: AuditConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("I9_AUDIT_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let log_level = env::var("I9_AUDIT_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let defaults = AuditConfig::default();
        let audit = AuditConfig {
            match_min_confidence: read_ratio(
                "I9_MATCH_MIN_CONFIDENCE",
                defaults.match_min_confidence,
            )?,
            match_low_confidence: read_ratio(
                "I9_MATCH_LOW_CONFIDENCE",
                defaults.match_low_confidence,
            )?,
            review_low_validation: read_score(
                "I9_REVIEW_LOW_VALIDATION",
                defaults.review_low_validation,
            )?,
            signature_window_days: read_days(
                "I9_SIGNATURE_WINDOW_DAYS",
                defaults.signature_window_days,
            )?,
            proximity_pages: read_days("I9_PROXIMITY_PAGES", defaults.proximity_pages)?,
        };

        Ok(Self {
            environment,
            telemetry: TelemetryConfig { log_level },
            audit,
        })
    }
}

/// Thresholds shared by the grouping, matching and review stages.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditConfig {
    /// A supporting page must score strictly above this to count as a match.
    pub match_min_confidence: f64,
    pub match_low_confidence: f64,
    pub review_low_validation: f64,
    pub signature_window_days: i64,
    pub proximity_pages: i64,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            match_min_confidence: 0.0,
            match_low_confidence: 0.7,
            review_low_validation: 60.0,
            signature_window_days: 30,
            proximity_pages: 2,
        }
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidRatio { key: &'static str, value: String },
    InvalidScore { key: &'static str, value: String },
    InvalidCount { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidRatio { key, value } => {
                write!(f, "{key} must be a number between 0 and 1 (found '{value}')")
            }
            ConfigError::InvalidScore { key, value } => {
                write!(f, "{key} must be a number between 0 and 100 (found '{value}')")
            }
            ConfigError::InvalidCount { key, value } => {
                write!(f, "{key} must be a non-negative integer (found '{value}')")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

fn read_ratio(key: &'static str, default: f64) -> Result<f64, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|value| (0.0..=1.0).contains(value))
            .ok_or(ConfigError::InvalidRatio { key, value: raw }),
        Err(_) => Ok(default),
    }
}

fn read_score(key: &'static str, default: f64) -> Result<f64, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|value| (0.0..=100.0).contains(value))
            .ok_or(ConfigError::InvalidScore { key, value: raw }),
        Err(_) => Ok(default),
    }
}

fn read_days(key: &'static str, default: i64) -> Result<i64, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<i64>()
            .ok()
            .filter(|value| *value >= 0)
            .ok_or(ConfigError::InvalidCount { key, value: raw }),
        Err(_) => Ok(default),
    }
}
