//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, budgets > 0)
//! - Check budgets against each other (a maximal input and its largest
//!   output must fit one request pool together)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::ServiceConfig;
use crate::pipeline::max_output_len;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: invalid socket address {value:?}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error(
        "upstream.max_bytes ({upstream}) needs pool.max_bytes of at least {required}, got {pool}"
    )]
    UpstreamExceedsPool {
        upstream: usize,
        required: usize,
        pool: usize,
    },

    #[error(
        "listener.max_body_bytes ({body}) needs pool.max_bytes of at least {required}, got {pool}"
    )]
    BodyExceedsPool {
        body: usize,
        required: usize,
        pool: usize,
    },

    #[error("observability.log_level: unknown level {0:?}")]
    InvalidLogLevel(String),
}

/// Pool bytes one request needs for `input_len` input bytes plus its output.
///
/// Input and output chains share the request pool.
pub fn pool_bytes_required(input_len: usize) -> usize {
    input_len.saturating_add(max_output_len(input_len))
}

/// Check a parsed configuration for semantic errors.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }

    let positive = [
        ("listener.max_body_bytes", config.listener.max_body_bytes as u64),
        ("listener.request_timeout_secs", config.listener.request_timeout_secs),
        ("pool.max_bytes", config.pool.max_bytes as u64),
        ("pool.max_segments", config.pool.max_segments as u64),
        ("upstream.timeout_secs", config.upstream.timeout_secs),
        ("upstream.max_bytes", config.upstream.max_bytes as u64),
    ];
    for (field, value) in positive {
        if value == 0 {
            errors.push(ValidationError::Zero { field });
        }
    }

    let required = pool_bytes_required(config.upstream.max_bytes);
    if required > config.pool.max_bytes {
        errors.push(ValidationError::UpstreamExceedsPool {
            upstream: config.upstream.max_bytes,
            required,
            pool: config.pool.max_bytes,
        });
    }
    let required = pool_bytes_required(config.listener.max_body_bytes);
    if required > config.pool.max_bytes {
        errors.push(ValidationError::BodyExceedsPool {
            body: config.listener.max_body_bytes,
            required,
            pool: config.pool.max_bytes,
        });
    }

    if config
        .observability
        .log_level
        .parse::<tracing::Level>()
        .is_err()
    {
        errors.push(ValidationError::InvalidLogLevel(
            config.observability.log_level.clone(),
        ));
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
