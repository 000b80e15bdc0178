//! Observability tests for validation tracing.
//!
//! These tests verify that the structured emission helpers, spans and the
//! metrics flush run cleanly under a capturing subscriber.

use convcheck_core::metrics::METRICS;
use convcheck_core::obs::{
    emit_artifact_set_updated, emit_config_build_failed, emit_config_resolver_selected,
    emit_converter_unavailable, emit_no_config_resolver, emit_safe_fallback,
    emit_signature_rejected, emit_validator_resolved, ValidationSpan,
};
use convcheck_core::{ExecutionMode, ProjectRuntime, TypeSignatureError};
use tracing_test::traced_test;

#[traced_test]
#[test]
fn test_emit_validator_resolved() {
    emit_validator_resolved(ExecutionMode::Safe, "java.util.List<java.lang.Integer>", true);
}

#[traced_test]
#[test]
fn test_emit_signature_rejected_logs_warning() {
    let error = TypeSignatureError::Empty;
    emit_signature_rejected(ExecutionMode::Full, "", &error);
}

#[traced_test]
#[test]
fn test_emit_resolver_events() {
    emit_config_resolver_selected("io.smallrye.config.SmallRyeConfigProviderResolver", "default");
    emit_no_config_resolver();
    emit_config_build_failed("org.acme.Resolver", &"constructor threw");
    emit_converter_unavailable("org.acme.Port", "getConverter(Class) not found");
}

#[traced_test]
#[test]
fn test_emit_runtime_events() {
    emit_safe_fallback(ExecutionMode::Full);
    emit_artifact_set_updated(2, 1);
}

#[traced_test]
#[test]
fn test_validation_span_wraps_runtime_calls() {
    let span = ValidationSpan::enter("int", ExecutionMode::Safe);
    let runtime = ProjectRuntime::new(Vec::<&str>::new());
    let mut diags = Vec::new();
    runtime.validate_value("1X", "int", None, ExecutionMode::Full, &mut diags);
    drop(span);
    assert_eq!(diags.len(), 1);
}

#[traced_test]
#[test]
fn test_metrics_advance_on_validation() {
    let before = METRICS.values_validated();
    let runtime = ProjectRuntime::new(Vec::<&str>::new());
    let mut diags = Vec::new();
    runtime.validate_value("x,y", "int[]", None, ExecutionMode::Safe, &mut diags);

    // Other tests in this binary share the global counters.
    assert!(METRICS.values_validated() > before);
    assert!(METRICS.diagnostics_reported() >= 2);
    METRICS.flush();
}
