use axum::response::Json;
use serde_json::{json, Value};

pub async fn handle_home() -> Json<Value> {
    Json(json!({ "message": "Riverwood AI backend running" }))
}
