#![allow(dead_code)]

use tether_reflect::{Context, Diagnostic, Diagnostics, Type, Value};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "debug".into()),
        )
        .with_test_writer()
        .try_init();
}

pub fn ctx() -> Context {
    init_tracing();
    Context::default()
}

/// Object value of `ty` built from JSON.
pub fn object(ty: &Type, json: serde_json::Value) -> Value {
    Value::from_json(ty, &json).expect("fixture must match its type")
}

pub fn only_error(diags: &Diagnostics) -> &Diagnostic {
    let errors: Vec<_> = diags.errors().collect();
    assert_eq!(errors.len(), 1, "expected exactly one error, got:\n{diags}");
    errors[0]
}
