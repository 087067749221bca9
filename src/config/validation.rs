//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Require at least one redirect source
//! - Validate value ranges (status code, delimiter)
//! - Detect administrative paths that collide
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;

use crate::config::schema::ServerConfig;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no redirects given; pass --redirects and/or --from-to")]
    NoRedirectSources,

    #[error("status path and reload path are both {0:?}")]
    PathCollision(String),

    #[error("{name} {path:?} must begin with '/'")]
    RelativePath { name: &'static str, path: String },

    #[error("redirect code {0} is not an HTTP status code")]
    RedirectCode(u16),

    #[error("field delimiter {0:?} must be a single ASCII character")]
    FieldDelimiter(String),
}

pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if !config.redirects.has_sources() {
        errors.push(ValidationError::NoRedirectSources);
    }

    let server = &config.server;
    if !server.status_path.starts_with('/') {
        errors.push(ValidationError::RelativePath {
            name: "status path",
            path: server.status_path.clone(),
        });
    }
    if let Some(reload) = &server.reload_path {
        if !reload.starts_with('/') {
            errors.push(ValidationError::RelativePath {
                name: "reload path",
                path: reload.clone(),
            });
        }
        if *reload == server.status_path {
            errors.push(ValidationError::PathCollision(reload.clone()));
        }
    }

    if !(100..=999).contains(&server.redirect_code) {
        errors.push(ValidationError::RedirectCode(server.redirect_code));
    }

    if config.redirects.delimiter_byte().is_none() {
        errors.push(ValidationError::FieldDelimiter(
            config.redirects.field_delimiter.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
