//! File fixtures strategy.
//!
//! # Responsibilities
//! - Derive a template name and context from the request path
//! - Render the matching `.j2` template from the templates directory
//! - Answer 404 when no fixture exists for the path
//!
//! # Naming
//! ```text
//! /api/v1/projects/1234  → api-v1-projects.j2   { projects: "1234" }
//! /api/v1/projects       → api-v1-projects.j2   { }
//! ```
//! Segments that look like identifiers become context values keyed by the
//! segment before them; every other segment is part of the name.

use std::collections::BTreeMap;
use std::path::PathBuf;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use minijinja::{path_loader, Environment, ErrorKind};
use serde_json::{json, Map, Value};

use crate::config::Settings;
use crate::observability::span::TEMPLATE_NAME;
use crate::observability::{metrics, SpanAttributes};
use crate::strategies::{Strategy, StrategyError};

/// Extension shared by all fixture templates.
pub const TEMPLATE_EXTENSION: &str = ".j2";

/// True for path segments that look like resource identifiers.
///
/// Even-length digit or lowercase hex strings, or 36 characters of hex and
/// dashes (a UUID).
pub fn looks_like_id(chunk: &str) -> bool {
    let even = chunk.len() % 2 == 0;
    let hex = |c: char| c.is_ascii_digit() || ('a'..='f').contains(&c);

    (even && !chunk.is_empty() && chunk.chars().all(hex))
        || (chunk.len() == 36 && chunk.chars().all(|c| hex(c) || c == '-'))
}

/// Template name and render context for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateArguments {
    pub name: String,
    pub context: BTreeMap<String, String>,
}

pub fn infer_template_arguments<B>(request: &Request<B>) -> TemplateArguments {
    template_arguments_for_path(request.uri().path())
}

/// Same as [`infer_template_arguments`] on a raw path.
pub fn template_arguments_for_path(path: &str) -> TemplateArguments {
    let mut name_segments: Vec<&str> = Vec::new();
    let mut context = BTreeMap::new();

    for segment in path.split('/').filter(|s| !s.is_empty()) {
        match name_segments.last() {
            Some(resource) if looks_like_id(segment) => {
                context.insert((*resource).to_string(), segment.to_string());
            }
            _ => name_segments.push(segment),
        }
    }

    TemplateArguments {
        name: format!("{}{TEMPLATE_EXTENSION}", name_segments.join("-")),
        context,
    }
}

/// Serves responses rendered from Jinja templates on disk.
pub struct FileFixturesStrategy {
    templates_dir: PathBuf,
    env: Environment<'static>,
}

impl FileFixturesStrategy {
    pub fn new(settings: &Settings) -> Result<Self, StrategyError> {
        let templates_dir = settings.filefixtures.templates_dir.clone();
        if !templates_dir.is_dir() {
            return Err(StrategyError::TemplatesDirNotFound(templates_dir));
        }

        let mut env = Environment::new();
        env.set_loader(path_loader(templates_dir.clone()));
        tracing::debug!(templates_dir = %templates_dir.display(), "File fixtures strategy ready");

        Ok(Self { templates_dir, env })
    }

    /// Render the fixture for `request`, `None` when there is no template.
    fn render<B>(
        &self,
        request: &Request<B>,
        arguments: &TemplateArguments,
    ) -> Result<Option<String>, StrategyError> {
        let template = match self.env.get_template(&arguments.name) {
            Ok(template) => template,
            Err(e) if e.kind() == ErrorKind::TemplateNotFound => return Ok(None),
            Err(e) => return Err(StrategyError::Template(e.to_string())),
        };

        template
            .render(render_context(request, arguments))
            .map(Some)
            .map_err(|e| StrategyError::Template(e.to_string()))
    }
}

/// The inferred values at top level, plus a `request` object.
fn render_context<B>(request: &Request<B>, arguments: &TemplateArguments) -> Value {
    let mut context: Map<String, Value> = arguments
        .context
        .iter()
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect();
    context.insert(
        "request".to_string(),
        json!({
            "method": request.method().as_str(),
            "path": request.uri().path(),
            "query": request.uri().query().unwrap_or_default(),
        }),
    );
    Value::Object(context)
}

fn content_type_for(body: &str) -> &'static str {
    if serde_json::from_str::<Value>(body).is_ok() {
        "application/json"
    } else {
        "text/html; charset=utf-8"
    }
}

#[async_trait]
impl Strategy for FileFixturesStrategy {
    fn name(&self) -> &'static str {
        "filefixtures"
    }

    async fn apply(
        &self,
        request: Request<Body>,
        span: Option<&dyn SpanAttributes>,
    ) -> Result<Response, StrategyError> {
        let arguments = infer_template_arguments(&request);
        if let Some(span) = span {
            span.set_attribute(TEMPLATE_NAME, &arguments.name);
        }

        match self.render(&request, &arguments)? {
            Some(body) => {
                tracing::info!(template = %arguments.name, "Rendering fixture");
                metrics::record_fixture("rendered");
                let content_type = content_type_for(&body);
                Ok((StatusCode::OK, [(CONTENT_TYPE, content_type)], body).into_response())
            }
            None => {
                tracing::warn!(
                    template = %arguments.name,
                    templates_dir = %self.templates_dir.display(),
                    path = %request.uri().path(),
                    "No fixture for request"
                );
                metrics::record_fixture("missing");
                Ok((StatusCode::NOT_FOUND, format!("No fixture {}", arguments.name)).into_response())
            }
        }
    }
}
