use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::eligibility::InputError;
use std::fmt;

#[derive(Debug)]
pub enum AuditError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Decode(serde_json::Error),
    Input(InputError),
}

impl fmt::Display for AuditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditError::Config(err) => write!(f, "configuration error: {}", err),
            AuditError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AuditError::Io(err) => write!(f, "io error: {}", err),
            AuditError::Decode(err) => write!(f, "page payload error: {}", err),
            AuditError::Input(err) => write!(f, "input contract violated: {}", err),
        }
    }
}

impl std::error::Error for AuditError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AuditError::Config(err) => Some(err),
            AuditError::Telemetry(err) => Some(err),
            AuditError::Io(err) => Some(err),
            AuditError::Decode(err) => Some(err),
            AuditError::Input(err) => Some(err),
        }
    }
}

impl From<ConfigError> for AuditError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AuditError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AuditError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for AuditError {
    fn from(value: serde_json::Error) -> Self {
        Self::Decode(value)
    }
}

impl From<InputError> for AuditError {
    fn from(value: InputError) -> Self {
        Self::Input(value)
    }
}
