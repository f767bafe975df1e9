// model = "claude-opus-4-5"
// created = "2026-10-16"
// modified = "2026-10-16"
// driver = "Isaac Clayton"

//! Shared helpers for the integration tests.

#![allow(dead_code)]

use accord::{Backend, Change, PatchMode};
use serde_json::Value as Json;
use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("accord=info".parse().unwrap()))
        .with_test_writer()
        .try_init();
}

/// Apply one batch and return the patch as JSON.
pub fn apply(backend: &mut Backend, changes: &[Change], mode: PatchMode) -> Json {
    let patch = backend.apply_changes(changes, mode).unwrap();
    return serde_json::to_value(&patch).unwrap();
}

/// Parse a change from its JSON wire form.
pub fn change(json: Json) -> Change {
    return serde_json::from_value(json).unwrap();
}
