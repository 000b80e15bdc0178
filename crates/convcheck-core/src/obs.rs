//! Structured observability hooks for validation events.
//!
//! This module provides:
//! - Validation-scoped tracing spans via the `ValidationSpan` RAII guard
//! - Emission functions for resolver discovery, validator resolution and
//!   artifact-set changes
//!
//! Events are emitted at `info!` level unless noted (configurable via the
//! `CONVCHECK_LOG` env var). For JSON output, set `CONVCHECK_LOG_FORMAT=json`.

use std::fmt::Display;

use tracing::{debug, info, warn};

use crate::mode::ExecutionMode;

/// RAII guard that enters a span for the duration of one `validate_value`.
///
/// # Example
///
/// ```ignore
/// let _span = ValidationSpan::enter("java.lang.Integer", ExecutionMode::Safe);
/// // tracing calls below carry signature and mode
/// ```
pub struct ValidationSpan {
    _span: tracing::span::EnteredSpan,
}

impl ValidationSpan {
    pub fn enter(signature: &str, mode: ExecutionMode) -> Self {
        let span = tracing::debug_span!("convcheck.validate", signature = %signature, mode = %mode);
        Self {
            _span: span.entered(),
        }
    }
}

/// Emit event: a validator was built and cached for a signature.
pub fn emit_validator_resolved(mode: ExecutionMode, signature: &str, usable: bool) {
    debug!(
        event = "validator.resolved",
        mode = %mode,
        signature = %signature,
        usable = usable,
    );
}

/// Emit event: a signature could not be parsed (warning level).
pub fn emit_signature_rejected(mode: ExecutionMode, signature: &str, error: &dyn Display) {
    warn!(event = "signature.rejected", mode = %mode, signature = %signature, error = %error);
}

/// Emit event: the preferred mode had no usable configuration, SAFE was used.
pub fn emit_safe_fallback(preferred: ExecutionMode) {
    debug!(event = "mode.safe_fallback", preferred = %preferred);
}

/// Emit event: the artifact set was replaced and supports were reset.
pub fn emit_artifact_set_updated(directories: usize, archives: usize) {
    info!(
        event = "artifacts.updated",
        directories = directories,
        archives = archives,
    );
}

/// Emit event: a configuration provider resolver was picked.
///
/// `via` is `default` for the well-known list and `service` for the
/// service listing.
pub fn emit_config_resolver_selected(resolver: &str, via: &str) {
    info!(event = "config.resolver_selected", resolver = %resolver, via = %via);
}

/// Emit event: no resolver was found in the artifacts (warning level).
pub fn emit_no_config_resolver() {
    warn!(
        event = "config.no_resolver",
        "No ConfigProviderResolver found in project classpath"
    );
}

/// Emit event: the host configuration cannot produce a converter for a type.
pub fn emit_converter_unavailable(type_name: &str, reason: &str) {
    debug!(event = "converter.unavailable", type_name = %type_name, reason = %reason);
}

/// Emit event: building the host configuration failed (warning level).
pub fn emit_config_build_failed(resolver: &str, error: &dyn Display) {
    warn!(event = "config.build_failed", resolver = %resolver, error = %error);
}
