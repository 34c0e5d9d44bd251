use axum::Json;
use serde_json::{json, Value};

// GET /api/pages/about
pub async fn about() -> Json<Value> {
    Json(json!({
        "title": "About",
        "body": "A small blog where anyone can register, write posts, \
                 schedule them for later and discuss them in comments."
    }))
}

// GET /api/pages/rules
pub async fn rules() -> Json<Value> {
    Json(json!({
        "title": "Rules",
        "body": "Be kind. You may edit or delete only your own posts \
                 and comments. Scheduled posts stay private until their \
                 publication date."
    }))
}
