// Request context and response sink types

use crate::routing::normalize_path;
use std::collections::HashMap;
use tracing::warn;

/// The request as the dispatcher sees it: a normalized path and a
/// string-keyed, multi-valued parameter bag. The transport builds this.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub path: String,
    pub params: HashMap<String, Vec<String>>,
}

impl RequestContext {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            params: HashMap::new(),
        }
    }

    /// Appends one value under `name`; repeated names accumulate.
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.entry(name.into()).or_default().push(value.into());
        self
    }

    /// All values supplied for `name`, in arrival order.
    pub fn values(&self, name: &str) -> Option<&[String]> {
        self.params.get(name).map(Vec::as_slice)
    }
}

/// Write-once response sink. The first write wins; later writes are dropped
/// with a warning so each request observably produces exactly one response.
#[derive(Debug, Default)]
pub struct ResponseSink {
    body: Option<String>,
}

impl ResponseSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write(&mut self, body: impl Into<String>) {
        if self.body.is_some() {
            warn!("response already written, dropping second write");
            return;
        }
        self.body = Some(body.into());
    }

    pub fn is_written(&self) -> bool {
        self.body.is_some()
    }

    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    pub fn into_body(self) -> Option<String> {
        self.body
    }
}

/// Caller-side path normalization: strips the transport's context prefix and
/// collapses repeated separators, yielding the key the route table expects.
pub fn request_path(uri_path: &str, context_prefix: &str) -> String {
    let stripped = if !context_prefix.is_empty() {
        uri_path.strip_prefix(context_prefix).unwrap_or(uri_path)
    } else {
        uri_path
    };
    let normalized = normalize_path(stripped);
    if normalized.starts_with('/') {
        normalized
    } else {
        format!("/{normalized}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_accumulate_per_name() {
        let ctx = RequestContext::new("/demo/add.json")
            .with_param("a", "3")
            .with_param("a", "4");
        assert_eq!(ctx.values("a"), Some(&["3".to_string(), "4".to_string()][..]));
        assert_eq!(ctx.values("b"), None);
    }

    #[test]
    fn sink_keeps_first_write() {
        let mut sink = ResponseSink::new();
        assert!(!sink.is_written());
        sink.write("first");
        sink.write("second");
        assert_eq!(sink.body(), Some("first"));
        assert_eq!(sink.into_body().as_deref(), Some("first"));
    }

    #[test]
    fn request_path_strips_prefix_and_collapses() {
        assert_eq!(request_path("/app//demo///add.json", "/app"), "/demo/add.json");
        assert_eq!(request_path("//demo/add.json", ""), "/demo/add.json");
        assert_eq!(request_path("/demo/add.json", "/demo/add.json"), "/");
    }
}
