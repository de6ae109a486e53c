//! API documentation endpoints.
//!
//! Serves the loaded API description at `/openapi.json` plus two hosted
//! documentation UIs over it. All three paths are on the interceptor's
//! bypass list, so requests to them are never access-logged.

use axum::extract::State;
use axum::response::Html;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::Value;

use crate::state::AppState;

const SWAGGER_UI_PAGE: &str = r##"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8"/>
    <title>Registro API docs</title>
    <link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/swagger-ui-dist@5/swagger-ui.css"/>
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://cdn.jsdelivr.net/npm/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
    <script>
        SwaggerUIBundle({url: "/openapi.json", dom_id: "#swagger-ui"});
    </script>
</body>
</html>
"##;

const REDOC_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8"/>
    <title>Registro API reference</title>
</head>
<body>
    <redoc spec-url="/openapi.json"></redoc>
    <script src="https://cdn.jsdelivr.net/npm/redoc@2/bundles/redoc.standalone.js"></script>
</body>
</html>
"#;

/// Serve the raw API description document.
async fn openapi_document(State(state): State<AppState>) -> Json<Value> {
    Json(state.api_catalog().document().clone())
}

/// Swagger UI over `/openapi.json`.
async fn swagger_ui() -> Html<&'static str> {
    Html(SWAGGER_UI_PAGE)
}

/// ReDoc over `/openapi.json`.
async fn redoc_ui() -> Html<&'static str> {
    Html(REDOC_PAGE)
}

/// Create the documentation router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/openapi.json", get(openapi_document))
        .route("/docs", get(swagger_ui))
        .route("/redoc", get(redoc_ui))
}
