//! OpenAPI document assembled from module fragments.

use bookshelf_kernel::ModuleRegistry;
use serde_json::{json, Value};
use utoipa::openapi::{InfoBuilder, OpenApiBuilder};

const API_PREFIX: &str = "/api";

/// Build the merged document served at `/docs/openapi.json`.
///
/// Module paths are prefixed with `/api`; module schemas are merged into
/// `components.schemas`, later modules overwriting earlier ones on name
/// clashes.
pub fn document(registry: &ModuleRegistry) -> Value {
    let base = OpenApiBuilder::new()
        .info(
            InfoBuilder::new()
                .title("Bookshelf API")
                .version(env!("CARGO_PKG_VERSION"))
                .description(Some("Book catalogue service"))
                .build(),
        )
        .build();

    let mut spec = serde_json::to_value(&base).unwrap_or_else(|_| json!({}));
    if !spec["paths"].is_object() {
        spec["paths"] = json!({});
    }

    spec["components"]["schemas"]["ErrorResponse"] = json!({
        "type": "object",
        "properties": {
            "message": { "type": "string" }
        },
        "required": ["message"]
    });

    spec["paths"]["/healthz"] = json!({
        "get": {
            "summary": "Health check",
            "responses": {
                "200": {
                    "description": "OK",
                    "content": { "text/plain": { "schema": { "type": "string" } } }
                }
            }
        }
    });

    for module in registry.modules() {
        if let Some(fragment) = module.openapi() {
            merge_fragment(&mut spec, &fragment);
        }
    }

    spec
}

fn merge_fragment(spec: &mut Value, fragment: &Value) {
    if let Some(paths) = fragment.get("paths").and_then(Value::as_object) {
        for (path, item) in paths {
            spec["paths"][format!("{API_PREFIX}{path}")] = item.clone();
        }
    }

    if let Some(schemas) = fragment
        .get("components")
        .and_then(|components| components.get("schemas"))
        .and_then(Value::as_object)
    {
        for (name, schema) in schemas {
            spec["components"]["schemas"][name] = schema.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookshelf_kernel::Module;
    use std::sync::Arc;

    struct ShelfModule;

    impl Module for ShelfModule {
        fn name(&self) -> &'static str {
            "shelves"
        }

        fn openapi(&self) -> Option<Value> {
            Some(json!({
                "paths": { "/shelves": { "get": { "summary": "List shelves" } } },
                "components": { "schemas": { "Shelf": { "type": "object" } } }
            }))
        }
    }

    #[test]
    fn empty_registry_still_documents_health_and_errors() {
        let spec = document(&ModuleRegistry::new());

        assert_eq!(spec["info"]["title"], "Bookshelf API");
        assert!(spec["paths"]["/healthz"]["get"].is_object());
        assert!(spec["components"]["schemas"]["ErrorResponse"].is_object());
    }

    #[test]
    fn module_fragments_are_prefixed_and_merged() {
        let mut registry = ModuleRegistry::new();
        registry.register(Arc::new(ShelfModule));

        let spec = document(&registry);

        assert_eq!(
            spec["paths"]["/api/shelves"]["get"]["summary"],
            "List shelves"
        );
        assert!(spec["paths"]["/shelves"].is_null());
        assert_eq!(spec["components"]["schemas"]["Shelf"]["type"], "object");
    }
}
