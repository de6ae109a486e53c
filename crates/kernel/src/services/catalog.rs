//! API description catalog.
//!
//! Loads an OpenAPI-style JSON document once at startup and answers
//! path + method lookups for access-log metadata. The raw document is kept
//! alongside the index so `/openapi.json` can serve it verbatim.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// Errors loading the API description document.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read API description from {path}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse API description")]
    Parse(#[from] serde_json::Error),
}

/// Metadata for one operation (a path + method pair).
///
/// Unknown fields in the source document (responses, parameters, ...) are
/// ignored; only what the access log records is kept.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiOperation {
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub summary: String,
}

/// Immutable API description store.
///
/// Frozen at startup: changing the description requires a restart.
#[derive(Debug)]
pub struct ApiCatalog {
    document: Value,
    operations: HashMap<String, HashMap<String, ApiOperation>>,
}

impl ApiCatalog {
    /// Load a catalog from a JSON file on disk.
    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let document: Value = serde_json::from_str(&raw)?;
        Ok(Self::from_document(document))
    }

    /// Build a catalog from an already-parsed document.
    pub fn from_document(document: Value) -> Self {
        let mut operations = HashMap::new();

        if let Some(paths) = document.get("paths").and_then(Value::as_object) {
            for (path, item) in paths {
                let Some(item) = item.as_object() else {
                    continue;
                };
                let mut by_method = HashMap::new();
                for (method, operation) in item {
                    // Path items also carry non-method keys ("parameters",
                    // "servers"); those fail to parse and are skipped.
                    match serde_json::from_value::<ApiOperation>(operation.clone()) {
                        Ok(parsed) => {
                            by_method.insert(method.to_ascii_lowercase(), parsed);
                        }
                        Err(e) => {
                            debug!(path = %path, key = %method, error = %e, "skipping non-operation entry");
                        }
                    }
                }
                operations.insert(path.clone(), by_method);
            }
        }

        Self {
            document,
            operations,
        }
    }

    /// Catalog with no description loaded. Serves an empty document and
    /// answers every lookup with empty metadata.
    pub fn empty() -> Self {
        Self::from_document(Value::Object(serde_json::Map::new()))
    }

    /// The raw description document, as served at `/openapi.json`.
    pub fn document(&self) -> &Value {
        &self.document
    }

    /// Whether a description with at least one path is loaded.
    pub fn is_loaded(&self) -> bool {
        !self.operations.is_empty()
    }

    /// Look up operation metadata for a request.
    ///
    /// Tries the literal request path first, then the matched route
    /// template (axum `{param}` routes use the same placeholder syntax as
    /// the document's path templates). Returns empty metadata on no match.
    pub fn lookup(&self, path: &str, method: &str, route_template: Option<&str>) -> ApiOperation {
        let method = method.to_ascii_lowercase();
        self.operation(path, &method)
            .or_else(|| route_template.and_then(|template| self.operation(template, &method)))
            .cloned()
            .unwrap_or_default()
    }

    fn operation(&self, path: &str, method: &str) -> Option<&ApiOperation> {
        self.operations.get(path)?.get(method)
    }
}
