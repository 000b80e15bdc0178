//! SAFE-mode validation through the public runtime entry points.

use std::sync::Arc;

use convcheck_core::{
    CallbackCollector, Diagnostic, EnumConstantsProvider, ExecutionMode, ProjectRuntime,
    SimpleEnumConstantsProvider, DIAGNOSTIC_SOURCE, VALUE_ERROR_CODE,
};

const OVERFLOW: &str = "org.jboss.logmanager.handlers.AsyncHandler$OverflowAction";
const APP_TYPE: &str = "org.acme.ApplicationType";

fn runtime() -> ProjectRuntime {
    ProjectRuntime::new(Vec::<&str>::new())
}

fn enums() -> SimpleEnumConstantsProvider {
    SimpleEnumConstantsProvider::new()
        .with_enum(OVERFLOW, ["DISCARD", "BLOCK"])
        .with_enum(APP_TYPE, ["WEB_APP", "SERVICE"])
}

fn validate(
    runtime: &ProjectRuntime,
    value: &str,
    signature: &str,
    provider: Option<&dyn EnumConstantsProvider>,
) -> Vec<Diagnostic> {
    let mut diags = Vec::new();
    runtime.validate_value(value, signature, provider, ExecutionMode::Safe, &mut diags);
    diags
}

fn spans(diags: &[Diagnostic]) -> Vec<(usize, usize)> {
    diags.iter().map(|d| (d.start, d.end())).collect()
}

#[test]
fn test_invalid_int_reports_whole_value() {
    let diags = validate(&runtime(), "1X", "int", None);
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].message, "SRCFG00029: Expected an integer value, got \"1X\"");
    assert_eq!(diags[0].source, DIAGNOSTIC_SOURCE);
    assert_eq!(diags[0].code, VALUE_ERROR_CODE);
    assert_eq!(spans(&diags), vec![(0, 2)]);
}

#[test]
fn test_valid_values_report_nothing() {
    let runtime = runtime();
    for (value, signature) in [
        ("42", "int"),
        (" 42 ", "java.lang.Integer"),
        ("", "int"),
        ("true", "boolean"),
        ("anything", "java.lang.String"),
        ("3.5e2", "java.math.BigDecimal"),
        ("123e4567-e89b-12d3-a456-426614174000", "java.util.UUID"),
    ] {
        assert!(
            validate(&runtime, value, signature, None).is_empty(),
            "{value:?} as {signature}"
        );
    }
}

#[test]
fn test_collections_report_each_bad_element() {
    let runtime = runtime();
    for signature in [
        "int[]",
        "java.util.List<java.lang.Integer>",
        "java.util.Set<java.lang.Integer>",
    ] {
        let diags = validate(&runtime, "1,2X,3x,4", signature, None);
        assert_eq!(spans(&diags), vec![(2, 4), (5, 7)], "{signature}");
        assert_eq!(diags[0].message, "SRCFG00029: Expected an integer value, got \"2X\"");
    }
}

#[test]
fn test_wrappers_validate_inner_type() {
    let runtime = runtime();
    let cases = [
        ("java.util.Optional<java.lang.Integer>", "SRCFG00029: Expected an integer value, got \"abc\""),
        ("java.util.function.Supplier<java.lang.Long>", "SRCFG00030: Expected a long value, got \"abc\""),
        ("jakarta.inject.Provider<java.lang.Double>", "SRCFG00031: Expected a double value, got \"abc\""),
        ("java.util.Map<java.lang.String, java.lang.Integer>", "SRCFG00029: Expected an integer value, got \"abc\""),
    ];
    for (signature, message) in cases {
        let diags = validate(&runtime, "abc", signature, None);
        assert_eq!(diags.len(), 1, "{signature}");
        assert_eq!(diags[0].message, message);
        assert_eq!(spans(&diags), vec![(0, 3)]);
    }
}

#[test]
fn test_enum_from_fallback_provider() {
    let runtime = runtime();
    let provider = enums();

    assert!(validate(&runtime, "BLOCK", OVERFLOW, Some(&provider)).is_empty());
    assert!(validate(&runtime, "block", OVERFLOW, Some(&provider)).is_empty());

    let diags = validate(&runtime, "BLACK", OVERFLOW, Some(&provider));
    assert_eq!(diags.len(), 1);
    assert_eq!(
        diags[0].message,
        format!("SRCFG00049: Cannot convert BLACK to enum class {OVERFLOW}, allowed values: discard,block")
    );
    assert_eq!(spans(&diags), vec![(0, 5)]);
}

#[test]
fn test_enum_list_accepts_hyphenated_values() {
    let runtime = runtime();
    let provider = enums();
    let signature = format!("java.util.List<{APP_TYPE}>");

    assert!(validate(&runtime, "web-app,service", &signature, Some(&provider)).is_empty());
    assert!(validate(&runtime, "WEB_APP, SERVICE", &signature, Some(&provider)).is_empty());

    let diags = validate(&runtime, "web-app,bogus", &signature, Some(&provider));
    assert_eq!(spans(&diags), vec![(8, 13)]);
}

#[test]
fn test_enum_constants_refresh_between_calls() {
    let runtime = runtime();
    let before = SimpleEnumConstantsProvider::new().with_enum(APP_TYPE, ["WEB_APP"]);
    let after = SimpleEnumConstantsProvider::new().with_enum(APP_TYPE, ["WEB_APP", "BATCH"]);

    assert_eq!(validate(&runtime, "batch", APP_TYPE, Some(&before)).len(), 1);
    assert!(validate(&runtime, "batch", APP_TYPE, Some(&after)).is_empty());

    let validator = runtime
        .find_converter_validator(APP_TYPE, Some(&before), ExecutionMode::Safe)
        .unwrap();
    let again = runtime
        .find_converter_validator(APP_TYPE, Some(&after), ExecutionMode::Safe)
        .unwrap();
    assert!(Arc::ptr_eq(&validator, &again));
}

#[test]
fn test_closure_provider() {
    let runtime = runtime();
    let provider = |name: &str| (name == APP_TYPE).then(|| vec!["SERVICE".to_string()]);
    assert_eq!(validate(&runtime, "web-app", APP_TYPE, Some(&provider)).len(), 1);
}

#[test]
fn test_unknown_and_malformed_signatures_are_silent() {
    let runtime = runtime();
    for signature in ["org.acme.Unknown", "java.util.List<", "int>", "", "java.lang.Object"] {
        assert!(validate(&runtime, "x", signature, None).is_empty(), "{signature:?}");
    }
}

#[test]
fn test_callback_collector_receives_exclusive_end() {
    let mut seen = Vec::new();
    {
        let mut collector = CallbackCollector(|message: &str, source: &str, code: &str, start: usize, end: usize| {
            seen.push((message.to_string(), source.to_string(), code.to_string(), start, end));
        });
        runtime().validate_value("7,é", "char[]", None, ExecutionMode::Safe, &mut collector);
    }
    assert!(seen.is_empty());

    {
        let mut collector = CallbackCollector(|message: &str, _: &str, _: &str, start: usize, end: usize| {
            seen.push((message.to_string(), String::new(), String::new(), start, end));
        });
        runtime().validate_value("éé,1", "long[]", None, ExecutionMode::Safe, &mut collector);
    }
    assert_eq!(seen.len(), 1);
    assert_eq!((seen[0].3, seen[0].4), (0, 2));
}

#[test]
fn test_validator_is_cached_per_signature() {
    let runtime = runtime();
    let first = runtime
        .find_converter_validator("java.util.List<java.lang.Integer>", None, ExecutionMode::Safe)
        .unwrap();
    let second = runtime
        .find_converter_validator("java.util.List<java.lang.Integer>", None, ExecutionMode::Safe)
        .unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    runtime.update_artifact_set(Vec::<&str>::new());
    let rebuilt = runtime
        .find_converter_validator("java.util.List<java.lang.Integer>", None, ExecutionMode::Safe)
        .unwrap();
    assert!(!Arc::ptr_eq(&first, &rebuilt));

    let a = validate(&runtime, "1,x", "int[]", None);
    let b = validate(&runtime, "1,x", "int[]", None);
    assert_eq!(a, b);
}

#[test]
fn test_revalidation_after_artifact_reset_is_identical() {
    let runtime = runtime();
    let provider = enums();
    let overflow_list = format!("java.util.List<{OVERFLOW}>");
    let cases: [(&str, &str, Option<&dyn EnumConstantsProvider>); 5] = [
        ("1,2X,3x,4", "int[]", None),
        ("DISCARD,nope", &overflow_list, Some(&provider)),
        ("web-app", APP_TYPE, Some(&provider)),
        ("1.0.0", "java.util.Optional<java.lang.Double>", None),
        ("[a-z", "java.util.regex.Pattern", None),
    ];
    let collect = |runtime: &ProjectRuntime| -> Vec<Vec<Diagnostic>> {
        cases
            .iter()
            .map(|(value, signature, provider)| validate(runtime, value, signature, *provider))
            .collect()
    };

    let before = collect(&runtime);
    assert!(before.iter().all(|diags| !diags.is_empty()));

    runtime.update_artifact_set(Vec::<&str>::new());
    assert_eq!(collect(&runtime), before);

    runtime.update_artifact_set(Vec::<&str>::new());
    runtime.update_artifact_set(Vec::<&str>::new());
    assert_eq!(collect(&runtime), before);
}

#[test]
fn test_pattern_values_with_lookaround_and_backreferences() {
    let runtime = runtime();
    for value in ["(?=a)a", r"(a)\1", "(?<!x)y"] {
        assert!(
            validate(&runtime, value, "java.util.regex.Pattern", None).is_empty(),
            "{value}"
        );
    }
    assert_eq!(validate(&runtime, "[a-z", "java.util.regex.Pattern", None).len(), 1);
}

#[test]
fn test_deeply_nested_signature_is_silent() {
    let runtime = runtime();
    let signature = format!("{}int{}", "java.util.List<".repeat(5_000), ">".repeat(5_000));
    assert!(validate(&runtime, "x", &signature, None).is_empty());
    assert!(validate(&runtime, "x", &"a<".repeat(10_000), None).is_empty());
}

#[test]
fn test_converter_descriptions() {
    let runtime = runtime();
    let provider = enums();
    let describe = |signature: &str| {
        runtime.find_converter_description(signature, Some(&provider), ExecutionMode::Safe)
    };

    assert_eq!(describe("int").as_deref(), Some("IntegerConverter"));
    assert_eq!(describe("java.util.List<java.lang.Long>").as_deref(), Some("LongConverter"));
    assert_eq!(describe(OVERFLOW).as_deref(), Some("EnumConverter"));
    assert_eq!(describe("org.acme.Unknown"), None);
}

#[test]
fn test_concurrent_validation_shares_one_validator() {
    let runtime = Arc::new(runtime());
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let runtime = runtime.clone();
            std::thread::spawn(move || {
                let value = if i % 2 == 0 { "1,2" } else { "1,x" };
                validate(&runtime, value, "int[]", None).len()
            })
        })
        .collect();
    let counts: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(counts, vec![0, 1, 0, 1, 0, 1, 0, 1]);
}
