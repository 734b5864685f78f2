//! Template rendering with Tera

use anyhow::Result;
use serde_json::Value;
use tera::{Context, Tera};

/// Template renderer
pub struct Templates {
    tera: Tera,
}

impl Templates {
    /// Create a new template renderer with embedded templates
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_template("api_docs.html", include_str!("../templates/api_docs.html"))?;
        Ok(Self { tera })
    }

    /// Render a template with a Tera Context
    pub fn render_with_context(&self, template: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template, context)?)
    }

    /// Render the interactive API docs page around an OpenAPI document
    pub fn render_api_docs(&self, openapi: &Value) -> Result<String> {
        // Keep a literal "</script>" inside the document from closing the tag
        let spec = serde_json::to_string(openapi)?.replace("</", "<\\/");

        let mut ctx = Context::new();
        ctx.insert("title", "Search Summarizer API");
        ctx.insert("version", crate::VERSION);
        ctx.insert("openapi", &spec);
        self.render_with_context("api_docs.html", &ctx)
    }
}
