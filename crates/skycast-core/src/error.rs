//! Centralized error types for the weather core.
//!
//! This module provides a typed error hierarchy that:
//! - Enables precise error handling throughout the codebase
//! - Provides user-friendly messages suitable for UI display
//! - Preserves full error context for debugging/logging

use thiserror::Error;

/// Top-level error type.
///
/// All errors in the weather core are convertible to this type.
/// Use `user_message()` to get a UI-appropriate message.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Location error: {0}")]
    Location(#[from] LocationError),

    #[error("Weather fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Returns a user-friendly message suitable for display in the UI.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Location(e) => e.user_message(),
            AppError::Fetch(e) => e.user_message(),
            AppError::Config(e) => e.user_message(),
            AppError::Other(_) => "An unexpected error occurred. Please try again.",
        }
    }
}

/// Errors from the platform location capability.
///
/// Denied and unavailable are distinct so the caller can render
/// different guidance.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("Location permission denied")]
    PermissionDenied,

    #[error("Location service unavailable: {0}")]
    Unavailable(String),
}

impl LocationError {
    pub fn user_message(&self) -> &'static str {
        match self {
            LocationError::PermissionDenied => {
                "Location access was denied. Enable location to see local weather."
            }
            LocationError::Unavailable(_) => {
                "Your location could not be determined. Please try again."
            }
        }
    }
}

/// Errors from the upstream weather/geocoding APIs.
///
/// The transport never retries; retry policy is user-initiated at the
/// orchestration boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Rate limited by upstream")]
    RateLimited { retry_after: Option<u64> },

    #[error("Upstream error: status {status}")]
    Upstream { status: u16 },

    #[error("Invalid response: {0}")]
    Decode(String),
}

impl FetchError {
    pub fn user_message(&self) -> &'static str {
        match self {
            FetchError::Network(_) => "Unable to connect. Check your internet connection.",
            FetchError::RateLimited { .. } => "Too many requests. Please wait and try again.",
            FetchError::Upstream { status } if *status >= 500 => {
                "The weather service is experiencing issues. Please try again later."
            }
            FetchError::Upstream { .. } => "The weather request failed. Please try again.",
            FetchError::Decode(_) => "Received an unexpected response. Please try again.",
        }
    }

    /// Whether a manual retry has a chance of succeeding.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            FetchError::Network(_)
                | FetchError::RateLimited { .. }
                | FetchError::Upstream { status: 500..=599 }
        )
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Missing required setting: {0}")]
    MissingSetting(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
            ConfigError::MissingSetting(_) => "A required setting is missing. Check your settings.",
        }
    }
}

/// Extension trait for converting reqwest errors to our error types.
pub trait ReqwestErrorExt {
    fn into_fetch_error(self) -> FetchError;
}

impl ReqwestErrorExt for reqwest::Error {
    fn into_fetch_error(self) -> FetchError {
        if self.is_timeout() {
            FetchError::Network("request timed out".to_string())
        } else if let Some(status) = self.status() {
            FetchError::Upstream {
                status: status.as_u16(),
            }
        } else {
            FetchError::Network(self.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_conversion() {
        let err: AppError = LocationError::PermissionDenied.into();
        assert!(matches!(
            err,
            AppError::Location(LocationError::PermissionDenied)
        ));
    }

    #[test]
    fn test_user_message_propagation() {
        let err = AppError::Location(LocationError::PermissionDenied);
        assert!(err.user_message().contains("denied"));

        let err = AppError::Fetch(FetchError::RateLimited { retry_after: None });
        assert!(err.user_message().contains("Too many requests"));
    }

    #[test]
    fn test_upstream_messages_distinguish_server_errors() {
        let server = FetchError::Upstream { status: 503 };
        let client = FetchError::Upstream { status: 404 };
        assert_ne!(server.user_message(), client.user_message());
    }

    #[test]
    fn test_is_retryable() {
        assert!(FetchError::Network("reset".into()).is_retryable());
        assert!(FetchError::RateLimited { retry_after: Some(30) }.is_retryable());
        assert!(FetchError::Upstream { status: 502 }.is_retryable());
        assert!(!FetchError::Upstream { status: 401 }.is_retryable());
        assert!(!FetchError::Decode("bad json".into()).is_retryable());
    }
}
