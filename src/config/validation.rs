//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (ticks > 0, limits > 0, addresses parse)
//! - Check the countdown cadence escalates (fine tick shorter than coarse tick)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RealmConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::RealmConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: invalid socket address '{value}'")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("shutdown.fine_tick_secs ({fine}) must be shorter than shutdown.coarse_tick_secs ({coarse})")]
    CadenceOrder { fine: u64, coarse: u64 },

    #[error("admin.api_key must be set when the admin API is enabled")]
    MissingApiKey,
}

/// Check a parsed configuration for semantic errors.
pub fn validate_config(config: &RealmConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_address(&mut errors, "listener.bind_address", &config.listener.bind_address);
    if config.observability.metrics_enabled {
        check_address(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    let non_zero = [
        ("listener.max_sessions", config.listener.max_sessions as u64),
        ("listener.outbound_buffer", config.listener.outbound_buffer as u64),
        ("shutdown.initial_tick_secs", config.shutdown.initial_tick_secs),
        ("shutdown.coarse_tick_secs", config.shutdown.coarse_tick_secs),
        ("shutdown.fine_tick_secs", config.shutdown.fine_tick_secs),
        ("shutdown.grace_secs", config.shutdown.grace_secs),
        ("timeouts.request_secs", config.timeouts.request_secs),
    ];
    for (field, value) in non_zero {
        if value == 0 {
            errors.push(ValidationError::Zero(field));
        }
    }

    let (fine, coarse) = (config.shutdown.fine_tick_secs, config.shutdown.coarse_tick_secs);
    if fine >= coarse {
        errors.push(ValidationError::CadenceOrder { fine, coarse });
    }

    if config.admin.enabled && config.admin.api_key.trim().is_empty() {
        errors.push(ValidationError::MissingApiKey);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_address(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}
