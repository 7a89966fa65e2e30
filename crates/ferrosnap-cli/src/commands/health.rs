use serde_json::{json, Value};

/// Liveness payload. Never touches configuration or the network.
pub fn run() -> Value {
    json!({ "status": "ok" })
}
