//! Request adapter for mapping HTTP requests to parser input.

use crate::query::QueryParams;

use super::{ExtractQuery, ExtractRequestId};

/// Adapter for converting framework-specific HTTP requests into parser input.
///
/// `RequestAdapter` holds simple, owned data so it does not couple to any
/// specific framework's request types. Framework-specific code should
/// implement `From<FrameworkRequest>` for `RequestAdapter`, or implement
/// [`ExtractRequestId`] and [`ExtractQuery`] on its own request type.
///
/// # Examples
///
/// ```
/// use sparse_query::web::{ExtractQuery, ExtractRequestId, RequestAdapter};
///
/// let mut adapter = RequestAdapter::new("req-12345");
/// adapter.add_query_param("filter[name_in]", "john,anne");
/// adapter.add_query_param("filter[name_in]", "paul");
///
/// assert_eq!(adapter.extract_request_id(), "req-12345");
/// assert_eq!(adapter.extract_query().get("filter[name_in]").map(<[String]>::len), Some(2));
/// ```
#[derive(Debug, Clone, Default)]
pub struct RequestAdapter {
    /// Unique request identifier
    request_id: String,
    /// Query parameters from the URL, repeated keys kept
    query: QueryParams,
}

impl RequestAdapter {
    /// Creates an adapter with the given request ID and no query parameters.
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            query: QueryParams::new(),
        }
    }

    /// Adds the pairs of a raw query string such as `sort=-title&page[size]=5`.
    pub fn with_query_string(mut self, raw: &str) -> Self {
        for (key, values) in &QueryParams::parse(raw) {
            for value in values {
                self.query.append(key, value.as_str());
            }
        }
        self
    }

    /// Appends one decoded query parameter.
    pub fn add_query_param(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.query.append(key, value);
    }

    /// Returns a reference to the request ID.
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Returns the collected query parameters.
    pub fn query(&self) -> &QueryParams {
        &self.query
    }
}

impl ExtractRequestId for RequestAdapter {
    fn extract_request_id(&self) -> String {
        self.request_id.clone()
    }
}

impl ExtractQuery for RequestAdapter {
    fn extract_query(&self) -> QueryParams {
        self.query.clone()
    }
}
