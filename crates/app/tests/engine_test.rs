//! End-to-end behaviour of the engine with the built-in filter library.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use pretty_assertions::assert_eq;
use stencil_application::{Engine, FilterRegistry, parse_pipeline};
use stencil_domain::{Arg, EngineSettings, Literal, TemplateError, Value, VariableMap};
use stencil_infrastructure::{SystemClock, builtin_registry, default_engine};

fn engine() -> Engine {
    default_engine(EngineSettings::default())
}

fn vars(entries: &[(&str, &str)]) -> VariableMap {
    entries
        .iter()
        .map(|(k, v)| ((*k).to_string(), Value::from(*v)))
        .collect()
}

#[test]
fn test_text_without_placeholders_is_unchanged() {
    let engine = engine();
    let scope = vars(&[("x", "unused")]);
    for template in [
        "",
        "plain text",
        "a { single } brace",
        "closing } and opening { apart",
        "multi\nline\n\ttext",
        "ünïcödé ✓",
    ] {
        assert_eq!(engine.render(template, &scope).unwrap(), template);
    }
}

#[test]
fn test_filter_chain() {
    let rendered = engine()
        .render(
            "{{ x | trim | shorten:5 | length }}",
            &vars(&[("x", " Hello, World! ")]),
        )
        .unwrap();
    assert_eq!(rendered, "5");
}

#[test]
fn test_missing_variable() {
    let err = engine().render("{{ x }}", &VariableMap::new()).unwrap_err();
    assert!(err.is_variable_not_found());
    assert_eq!(err.root_cause(), &TemplateError::variable_not_found("x"));
}

#[test]
fn test_unknown_filter() {
    let err = engine()
        .render("{{ x | nope }}", &vars(&[("x", "1")]))
        .unwrap_err();
    assert!(err.is_function_not_found());
}

#[test]
fn test_self_reference_is_cycle() {
    let err = engine()
        .resolve_variables(&vars(&[("self", "{{ self }}")]))
        .unwrap_err();
    assert!(err.is_circular_dependency());
}

#[test]
fn test_chain_resolves_in_any_input_order() {
    let entries = [
        ("base", "root"),
        ("A", "{{base}}-A"),
        ("B", "{{A}}-B"),
        ("C", "{{B}}-C"),
        ("D", "{{C}}-D"),
    ];

    let mut orders = vec![entries.to_vec()];
    let mut reversed = entries.to_vec();
    reversed.reverse();
    orders.push(reversed);
    orders.push(vec![entries[3], entries[0], entries[4], entries[2], entries[1]]);

    for order in orders {
        let resolved = engine().resolve_variables(&vars(&order)).unwrap();
        assert_eq!(resolved["D"], Value::from("root-A-B-C-D"));
        let keys: Vec<&str> = resolved.keys().map(String::as_str).collect();
        let expected: Vec<&str> = order.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, expected);
    }
}

#[test]
fn test_resolving_is_idempotent() {
    let engine = engine();
    let batch = vars(&[
        ("host", "example.com"),
        ("url", "https://{{ host }}/v1"),
        ("name", "{{ missing | default:'anon' | upper }}"),
    ]);

    let once = engine.resolve_variables(&batch).unwrap();
    let twice = engine.resolve_variables(&once).unwrap();
    assert_eq!(once, twice);
    assert_eq!(once["name"], Value::from("ANON"));
}

#[test]
fn test_quoted_arguments_are_not_split() {
    let (name, calls) = parse_pipeline(r#"x | f:'a,b', "c\"d""#);
    assert_eq!(name, "x");
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].name, "f");
    assert_eq!(
        calls[0].args,
        vec![
            Arg::Literal(Literal::String("a,b".to_string())),
            Arg::Literal(Literal::String("c\"d".to_string())),
        ]
    );
}

#[test]
fn test_literal_text_entries_skip_evaluation() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let spy = FilterRegistry::builder()
        .filter("upper", move |value: &Value, _: &[Value]| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(value.clone())
        })
        .build();

    let engine = Engine::with_filters(
        &builtin_registry(),
        &spy,
        EngineSettings::default(),
        Arc::new(SystemClock::new()),
    );

    let resolved = engine
        .resolve_variables(&vars(&[
            ("plain", "just text"),
            ("also_plain", "no {placeholders} here"),
        ]))
        .unwrap();
    assert_eq!(resolved["plain"], Value::from("just text"));
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    engine.render("{{ x | upper }}", &vars(&[("x", "y")])).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_default_covers_missing_base() {
    let engine = engine();
    let empty = VariableMap::new();

    assert_eq!(
        engine.render("{{ who | trim | default:'nobody' }}", &empty).unwrap(),
        "nobody"
    );
    assert_eq!(
        engine.render("{{ who | default:'' | default:'x' }}", &empty).unwrap(),
        "x"
    );
    assert!(engine.render("{{ who | trim }}", &empty).unwrap_err().is_variable_not_found());
}

#[test]
fn test_skipped_filter_keeps_previous_value() {
    let engine = engine();

    let mut user = VariableMap::new();
    user.insert("id".to_string(), Value::Int(7));
    let mut scope = VariableMap::new();
    scope.insert("user".to_string(), Value::Map(user));

    assert_eq!(
        engine
            .render("{{ user | key:'name' | default:'?' | json }}", &scope)
            .unwrap(),
        r#"{"id":7}"#
    );
    assert_eq!(engine.render("{{ user | key:'id' }}", &scope).unwrap(), "7");

    let err = engine.render("{{ user | key:'name' }}", &scope).unwrap_err();
    assert!(err.is_function_apply_failed());
}

#[test]
fn test_filter_arguments_can_reference_variables() {
    let rendered = engine()
        .render(
            "{{ first | concat:sep,last }}",
            &vars(&[("first", "Ada"), ("sep", " "), ("last", "Lovelace")]),
        )
        .unwrap();
    assert_eq!(rendered, "Ada Lovelace");
}

#[test]
fn test_structured_values_flow_between_variables() {
    let mut batch = vars(&[
        ("raw", r#"{"users": [{"id": 1, "name": "ada"}, {"id": 2, "name": "linus"}]}"#),
        ("data", "{{ raw | from:'json' }}"),
        ("second", "{{ data | key:'users' | find:'id','2' | key:'name' | title }}"),
        ("count", "{{ data | key:'users' | length }}"),
    ]);
    batch.insert("big".to_string(), Value::from("{{ count | gt:1 }}"));

    let resolved = engine().resolve_variables(&batch).unwrap();
    assert!(resolved["data"].as_map().is_some());
    assert_eq!(resolved["second"], Value::from("Linus"));
    assert_eq!(resolved["count"], Value::Int(2));
    assert_eq!(resolved["big"], Value::Bool(true));
}

#[test]
fn test_failed_filter_is_reported_with_its_name() {
    let err = engine()
        .render("{{ x | shorten:'many' }}", &vars(&[("x", "abc")]))
        .unwrap_err();
    assert!(err.is_function_apply_failed());
    assert!(err.to_string().contains("shorten"), "{err}");
}

#[test]
fn test_strict_mode_rejects_broken_placeholders() {
    let lenient = engine();
    assert_eq!(
        lenient.render("a {{ b", &VariableMap::new()).unwrap(),
        "a {{ b"
    );

    let strict = default_engine(EngineSettings::default().strict());
    let err = strict.render("a {{ b", &VariableMap::new()).unwrap_err();
    assert!(matches!(
        err.root_cause(),
        TemplateError::MalformedTemplate { .. }
    ));
}
