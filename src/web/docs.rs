//! Route contracts and the OpenAPI document generated from them

use serde_json::{json, Map, Value};

/// Declared contract of one route
#[derive(Debug, Clone)]
pub struct RouteDoc {
    pub method: &'static str,
    pub path: &'static str,
    pub summary: &'static str,
    pub requires_auth: bool,
    pub params: Vec<ParamDoc>,
    pub responses: Vec<ResponseDoc>,
}

/// Query parameter
#[derive(Debug, Clone)]
pub struct ParamDoc {
    pub name: &'static str,
    pub required: bool,
    pub schema_type: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone)]
pub struct ResponseDoc {
    pub status: u16,
    pub description: &'static str,
    /// `(content type, schema)` pairs
    pub content: Vec<(&'static str, Value)>,
}

impl ResponseDoc {
    fn new(status: u16, description: &'static str) -> Self {
        Self {
            status,
            description,
            content: Vec::new(),
        }
    }

    fn with(mut self, content_type: &'static str, schema: Value) -> Self {
        self.content.push((content_type, schema));
        self
    }
}

fn error_schema() -> Value {
    json!({"type": "object", "properties": {"error": {"type": "string"}}})
}

/// Contracts of every route the gateway serves
pub fn route_docs() -> Vec<RouteDoc> {
    vec![
        RouteDoc {
            method: "get",
            path: "/",
            summary: "Health check endpoint",
            requires_auth: false,
            params: vec![],
            responses: vec![ResponseDoc::new(200, "Returns Ok if the service is running")
                .with("text/plain", json!({"type": "string"}))],
        },
        RouteDoc {
            method: "get",
            path: "/search",
            summary: "Summarize search results",
            requires_auth: true,
            params: vec![
                ParamDoc {
                    name: "q",
                    required: true,
                    schema_type: "string",
                    description: "Search query",
                },
                ParamDoc {
                    name: "stream",
                    required: false,
                    schema_type: "boolean",
                    description: "Whether to stream the response",
                },
            ],
            responses: vec![
                ResponseDoc::new(200, "Returns a summary of the search results")
                    .with(
                        "application/json",
                        json!({"type": "object", "properties": {"summary": {"type": "string"}}}),
                    )
                    .with("text/plain", json!({"type": "string"})),
                ResponseDoc::new(400, "Missing search query").with("application/json", error_schema()),
                ResponseDoc::new(401, "Missing or invalid API key")
                    .with("application/json", error_schema()),
                ResponseDoc::new(403, "Invalid API key").with("application/json", error_schema()),
                ResponseDoc::new(502, "Summary generation failed")
                    .with("application/json", error_schema()),
            ],
        },
    ]
}

/// Build an OpenAPI 3 document from route contracts
pub fn openapi_document(routes: &[RouteDoc]) -> Value {
    let mut paths = Map::new();

    for route in routes {
        let parameters: Vec<Value> = route
            .params
            .iter()
            .map(|p| {
                json!({
                    "in": "query",
                    "name": p.name,
                    "required": p.required,
                    "schema": {"type": p.schema_type},
                    "description": p.description,
                })
            })
            .collect();

        let mut responses = Map::new();
        for response in &route.responses {
            let mut entry = json!({"description": response.description});
            if !response.content.is_empty() {
                let content: Map<String, Value> = response
                    .content
                    .iter()
                    .map(|(ct, schema)| (ct.to_string(), json!({"schema": schema})))
                    .collect();
                entry["content"] = Value::Object(content);
            }
            responses.insert(response.status.to_string(), entry);
        }

        let mut operation = json!({
            "summary": route.summary,
            "responses": responses,
        });
        if !parameters.is_empty() {
            operation["parameters"] = Value::Array(parameters);
        }
        operation["security"] = if route.requires_auth {
            json!([{"bearerAuth": []}])
        } else {
            json!([])
        };

        let item = paths
            .entry(route.path.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        item[route.method] = operation;
    }

    json!({
        "openapi": "3.0.0",
        "info": {
            "title": "Search Summarizer API",
            "version": crate::VERSION,
            "description": "Summarizes web search results with a language model",
        },
        "components": {
            "securitySchemes": {
                "bearerAuth": {"type": "http", "scheme": "bearer"}
            }
        },
        "paths": paths,
    })
}
